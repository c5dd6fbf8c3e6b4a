//! Storage layer for touchpoint events.
//!
//! Provides persistence for events using `rusqlite`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! A `Database` instance can be moved between threads but cannot be shared
//! across threads without external synchronization.
//!
//! # Schema
//!
//! The schema is versioned with `PRAGMA user_version`. Opening a file never
//! changes it: [`Database::migrate`] must be called explicitly (the CLI's
//! `tp migrate`), and [`Database::reset`] is the only destructive operation.
//! Data access on a database whose version does not match [`SCHEMA_VERSION`]
//! fails with [`DbError::SchemaMismatch`].
//!
//! ## Timestamp Format
//!
//! Timestamps are stored as TEXT in RFC 3339 UTC with millisecond precision
//! (e.g., `2024-01-15T10:30:00.000Z`). For years 0000 through 9999 every value
//! has the same fixed-width format, so lexicographic ordering matches
//! chronological ordering. Outside that range chrono adds a sign and extra
//! digits, which breaks the ordering; the CLI rejects such timestamps.
//!
//! ## Metadata Storage
//!
//! The `metadata` column stores the caller's JSON document verbatim. It is
//! never queried, only round-tripped.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, Row, params};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use tp_core::{CaseId, Event, EventId, EventName, EventType};

/// Schema version written by [`Database::migrate`].
pub const SCHEMA_VERSION: i64 = 1;

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// The schema has not been migrated to the version this build expects.
    #[error("database schema is at version {found}, expected {expected}; run `tp migrate`")]
    SchemaMismatch { found: i64, expected: i64 },
    /// The database was written by a newer version.
    #[error("database schema version {found} is newer than supported version {supported}")]
    UnsupportedSchema { found: i64, supported: i64 },
    /// Failed to parse a stored timestamp.
    #[error("invalid timestamp for event {event_id}: {timestamp}")]
    TimestampParse {
        event_id: String,
        timestamp: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A stored row could not be turned back into an event.
    #[error("invalid event data for {event_id}: {message}")]
    InvalidEventData { event_id: String, message: String },
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

/// An event as submitted by a caller, before the store assigns an ID.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub case_id: CaseId,
    pub event_name: EventName,
    pub event_type: EventType,
    pub metadata: Value,
    pub timestamp: DateTime<Utc>,
}

/// A raw event row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub id: String,
    pub case_id: String,
    pub event_name: String,
    pub event_type: String,
    pub metadata: String,
    pub timestamp: String,
    pub recorded_at: String,
}

/// Per-case event count and most recent timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseSummary {
    pub case_id: String,
    pub events: i64,
    pub last_event: String,
}

const EVENT_COLUMNS: &str =
    "id, case_id, event_name, event_type, metadata, timestamp, recorded_at";

impl Database {
    /// Opens a database at the given path, creating the file if necessary.
    ///
    /// The schema is left untouched; call [`Database::migrate`] on a new file.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    /// Opens an in-memory database with the schema already applied.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Returns the stored schema version (0 for a fresh file).
    pub fn schema_version(&self) -> Result<i64, DbError> {
        let version = self
            .conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))?;
        Ok(version)
    }

    /// Applies the schema if needed. Returns whether anything changed.
    ///
    /// Non-destructive and idempotent.
    pub fn migrate(&self) -> Result<bool, DbError> {
        let found = self.schema_version()?;
        if found == SCHEMA_VERSION {
            return Ok(false);
        }
        if found > SCHEMA_VERSION {
            return Err(DbError::UnsupportedSchema {
                found,
                supported: SCHEMA_VERSION,
            });
        }

        tracing::info!(from = found, to = SCHEMA_VERSION, "migrating database schema");
        self.conn.execute_batch(
            "
            -- Events table: immutable touchpoint markers
            -- timestamp / recorded_at: RFC 3339 UTC, millisecond precision
            -- metadata: caller JSON, stored verbatim
            CREATE TABLE IF NOT EXISTS events (
                id TEXT PRIMARY KEY,
                case_id TEXT NOT NULL,
                event_name TEXT NOT NULL,
                event_type TEXT NOT NULL CHECK (event_type IN ('start', 'end')),
                metadata TEXT NOT NULL DEFAULT 'null',
                timestamp TEXT NOT NULL,
                recorded_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_events_case ON events(case_id, timestamp);
            CREATE INDEX IF NOT EXISTS idx_events_timestamp ON events(timestamp);

            PRAGMA user_version = 1;
            ",
        )?;
        Ok(true)
    }

    /// Drops all stored events and re-applies the schema.
    pub fn reset(&self) -> Result<(), DbError> {
        tracing::warn!("dropping events table");
        self.conn
            .execute_batch("DROP TABLE IF EXISTS events; PRAGMA user_version = 0;")?;
        self.migrate()?;
        Ok(())
    }

    fn ensure_schema(&self) -> Result<(), DbError> {
        let found = self.schema_version()?;
        if found == SCHEMA_VERSION {
            Ok(())
        } else {
            Err(DbError::SchemaMismatch {
                found,
                expected: SCHEMA_VERSION,
            })
        }
    }

    /// Stores a single event, returning it with its assigned ID.
    pub fn insert_event(&mut self, event: &NewEvent) -> Result<Event, DbError> {
        let mut stored = self.insert_events(std::slice::from_ref(event))?;
        stored.pop().ok_or_else(|| DbError::InvalidEventData {
            event_id: String::new(),
            message: "insert returned no event".to_string(),
        })
    }

    /// Stores a batch of events in one transaction.
    pub fn insert_events(&mut self, events: &[NewEvent]) -> Result<Vec<Event>, DbError> {
        self.insert_events_at(events, Utc::now())
    }

    fn insert_events_at(
        &mut self,
        events: &[NewEvent],
        recorded_at: DateTime<Utc>,
    ) -> Result<Vec<Event>, DbError> {
        self.ensure_schema()?;
        if events.is_empty() {
            return Ok(Vec::new());
        }

        // Round-trip through the stored precision so returned events match reads.
        let recorded_at = truncate_to_millis(recorded_at);
        let recorded_at_str = format_timestamp(recorded_at);

        let tx = self.conn.transaction()?;
        let mut stored = Vec::with_capacity(events.len());
        {
            let mut stmt = tx.prepare(
                "
                INSERT INTO events
                (id, case_id, event_name, event_type, metadata, timestamp, recorded_at)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                ",
            )?;
            for event in events {
                let id = Uuid::new_v4().to_string();
                let timestamp = truncate_to_millis(event.timestamp);
                stmt.execute(params![
                    id,
                    event.case_id.as_str(),
                    event.event_name.as_str(),
                    event.event_type.as_str(),
                    event.metadata.to_string(),
                    format_timestamp(timestamp),
                    recorded_at_str,
                ])?;
                let event_id = EventId::new(id).map_err(|err| DbError::InvalidEventData {
                    event_id: String::new(),
                    message: err.to_string(),
                })?;
                stored.push(Event {
                    id: event_id,
                    case_id: event.case_id.clone(),
                    event_name: event.event_name.clone(),
                    event_type: event.event_type,
                    metadata: event.metadata.clone(),
                    timestamp,
                    recorded_at,
                });
            }
        }
        tx.commit()?;
        tracing::debug!(count = stored.len(), "inserted events");
        Ok(stored)
    }

    /// Lists all events ordered by timestamp.
    pub fn list_events(&self) -> Result<Vec<Event>, DbError> {
        self.ensure_schema()?;
        let mut stmt = self.conn.prepare(&format!(
            "
            SELECT {EVENT_COLUMNS}
            FROM events
            ORDER BY timestamp ASC, recorded_at ASC, id ASC
            "
        ))?;
        let rows = stmt.query_map([], record_from_row)?;
        let mut events = Vec::new();
        for row in rows {
            events.push(row?.into_event()?);
        }
        Ok(events)
    }

    /// Lists the events of one case ordered by timestamp.
    ///
    /// An unknown case yields an empty list, not an error.
    pub fn case_events(&self, case_id: &str) -> Result<Vec<Event>, DbError> {
        self.ensure_schema()?;
        let mut stmt = self.conn.prepare(&format!(
            "
            SELECT {EVENT_COLUMNS}
            FROM events
            WHERE case_id = ?
            ORDER BY timestamp ASC, recorded_at ASC, id ASC
            "
        ))?;
        let rows = stmt.query_map([case_id], record_from_row)?;
        let mut events = Vec::new();
        for row in rows {
            events.push(row?.into_event()?);
        }
        tracing::debug!(case_id, count = events.len(), "loaded case events");
        Ok(events)
    }

    /// Lists every case with its event count, ordered by case ID.
    pub fn list_cases(&self) -> Result<Vec<CaseSummary>, DbError> {
        self.ensure_schema()?;
        let mut stmt = self.conn.prepare(
            "
            SELECT case_id, COUNT(*) AS events, MAX(timestamp) AS last_event
            FROM events
            GROUP BY case_id
            ORDER BY case_id ASC
            ",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(CaseSummary {
                case_id: row.get(0)?,
                events: row.get(1)?,
                last_event: row.get(2)?,
            })
        })?;
        let mut cases = Vec::new();
        for row in rows {
            cases.push(row?);
        }
        Ok(cases)
    }

    /// Loads all events grouped by case, each case ordered by timestamp.
    pub fn events_by_case(&self) -> Result<BTreeMap<String, Vec<Event>>, DbError> {
        let mut cases: BTreeMap<String, Vec<Event>> = BTreeMap::new();
        for event in self.list_events()? {
            cases
                .entry(event.case_id.as_str().to_string())
                .or_default()
                .push(event);
        }
        Ok(cases)
    }
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<EventRecord> {
    Ok(EventRecord {
        id: row.get(0)?,
        case_id: row.get(1)?,
        event_name: row.get(2)?,
        event_type: row.get(3)?,
        metadata: row.get(4)?,
        timestamp: row.get(5)?,
        recorded_at: row.get(6)?,
    })
}

impl EventRecord {
    /// Validates a stored row back into an [`Event`].
    pub fn into_event(self) -> Result<Event, DbError> {
        let invalid = |message: String| DbError::InvalidEventData {
            event_id: self.id.clone(),
            message,
        };

        let case_id = CaseId::new(self.case_id.as_str()).map_err(|e| invalid(e.to_string()))?;
        let event_name =
            EventName::new(self.event_name.as_str()).map_err(|e| invalid(e.to_string()))?;
        let event_type: EventType = self
            .event_type
            .parse()
            .map_err(|e: tp_core::ValidationError| invalid(e.to_string()))?;
        let metadata: Value = serde_json::from_str(&self.metadata)
            .map_err(|e| invalid(format!("metadata is not valid JSON: {e}")))?;
        let timestamp = parse_timestamp(&self.timestamp, &self.id)?;
        let recorded_at = parse_timestamp(&self.recorded_at, &self.id)?;
        let id = EventId::new(self.id.as_str()).map_err(|e| invalid(e.to_string()))?;

        Ok(Event {
            id,
            case_id,
            event_name,
            event_type,
            metadata,
            timestamp,
            recorded_at,
        })
    }
}

fn parse_timestamp(timestamp: &str, event_id: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|source| DbError::TimestampParse {
            event_id: event_id.to_string(),
            timestamp: timestamp.to_string(),
            source,
        })
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn truncate_to_millis(timestamp: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(timestamp.timestamp_millis()).unwrap_or(timestamp)
}
