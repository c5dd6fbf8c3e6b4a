//! Touchpoint events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event_type::EventType;
use crate::types::{CaseId, EventId, EventName, ValidationError};

/// A single timestamped start or end marker for a touchpoint in a case.
///
/// Events are immutable once recorded. `timestamp` is the logical time the
/// caller supplied and is the only ordering key the reconciler uses;
/// `recorded_at` is when the store accepted the event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier assigned by the store.
    pub id: EventId,
    /// The case this event belongs to.
    pub case_id: CaseId,
    /// The touchpoint label.
    pub event_name: EventName,
    /// Start or end marker.
    pub event_type: EventType,
    /// Opaque caller payload, never interpreted here.
    #[serde(default)]
    pub metadata: serde_json::Value,
    /// When the touchpoint occurred.
    pub timestamp: DateTime<Utc>,
    /// When the event was stored.
    pub recorded_at: DateTime<Utc>,
}

/// An event the reconciliation functions can work with.
///
/// This trait allows the core to run over different event representations
/// (e.g., [`Event`] loaded from the store, or lightweight test fixtures).
pub trait TouchpointEvent {
    /// Returns the case identifier.
    fn case_id(&self) -> &str;

    /// Returns the touchpoint label.
    fn event_name(&self) -> &str;

    /// Returns whether this is a start or end marker.
    fn event_type(&self) -> EventType;

    /// Returns the logical occurrence time.
    fn timestamp(&self) -> DateTime<Utc>;
}

impl TouchpointEvent for Event {
    fn case_id(&self) -> &str {
        self.case_id.as_str()
    }

    fn event_name(&self) -> &str {
        self.event_name.as_str()
    }

    fn event_type(&self) -> EventType {
        self.event_type
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl<E: TouchpointEvent> TouchpointEvent for &E {
    fn case_id(&self) -> &str {
        (*self).case_id()
    }

    fn event_name(&self) -> &str {
        (*self).event_name()
    }

    fn event_type(&self) -> EventType {
        (*self).event_type()
    }

    fn timestamp(&self) -> DateTime<Utc> {
        (*self).timestamp()
    }
}

/// Parses an RFC 3339 timestamp into a UTC instant.
///
/// Offsets are honoured, so `2025-01-01T01:00:00+01:00` and
/// `2025-01-01T00:00:00Z` compare equal.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, ValidationError> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|_| ValidationError::InvalidTimestamp {
            value: value.to_string(),
        })
}
