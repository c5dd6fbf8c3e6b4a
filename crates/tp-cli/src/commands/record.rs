//! Record command for storing a single touchpoint event.

use std::io::Write;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, Utc};
use clap::Args;
use serde_json::Value;

use tp_core::{CaseId, EventName, EventType};
use tp_db::{Database, NewEvent};

use super::util::parse_datetime;

#[derive(Debug, Args)]
pub struct RecordArgs {
    /// The case this event belongs to.
    #[arg(long)]
    pub case: String,

    /// The touchpoint label (e.g., `document_review`).
    #[arg(long)]
    pub name: String,

    /// Either `start` or `end`.
    #[arg(long = "type")]
    pub event_type: String,

    /// When the touchpoint occurred: RFC 3339 or relative ("5 minutes ago").
    /// Defaults to now.
    #[arg(long)]
    pub at: Option<String>,

    /// Arbitrary JSON metadata to store with the event.
    #[arg(long)]
    pub metadata: Option<String>,
}

/// Validates raw fields into an event ready for storage.
///
/// Timestamps must fall in years 0000 through 9999, the range where stored
/// RFC 3339 text sorts chronologically.
pub(crate) fn build_event(
    case_id: &str,
    event_name: &str,
    event_type: &str,
    timestamp: DateTime<Utc>,
    metadata: Value,
) -> Result<NewEvent> {
    if !(0..=9999).contains(&timestamp.year()) {
        anyhow::bail!("timestamp {timestamp} is outside years 0000-9999");
    }
    Ok(NewEvent {
        case_id: CaseId::new(case_id)?,
        event_name: EventName::new(event_name)?,
        event_type: event_type.parse::<EventType>()?,
        metadata,
        timestamp,
    })
}

pub fn run<W: Write>(writer: &mut W, db: &mut Database, args: &RecordArgs) -> Result<()> {
    let started = Instant::now();

    let timestamp = match args.at.as_deref() {
        Some(at) => parse_datetime(at)?,
        None => Utc::now(),
    };
    let metadata = match args.metadata.as_deref() {
        Some(raw) => serde_json::from_str(raw).context("--metadata must be valid JSON")?,
        None => Value::Null,
    };
    let event = build_event(&args.case, &args.name, &args.event_type, timestamp, metadata)?;

    tracing::info!(
        case_id = %event.case_id,
        event_name = %event.event_name,
        event_type = %event.event_type,
        "recording event"
    );
    let stored = db.insert_event(&event).context("failed to create event")?;

    writeln!(writer, "{}", serde_json::to_string(&stored)?)?;
    tracing::info!(
        event_id = %stored.id,
        elapsed = ?started.elapsed(),
        "created event"
    );
    Ok(())
}
