//! Import command for bulk-loading events into the local `SQLite` store.
//!
//! Input is either one JSON object per line or a single JSON array of the
//! same objects (as written by the test-data generator):
//! `{"case_id": "...", "event_name": "...", "event_type": "start", "timestamp": "...", "metadata": {...}}`

use std::io::{BufRead, Read};

use anyhow::{Context, Result};
use clap::Args;
use serde::Deserialize;

use tp_db::{Database, NewEvent};

use super::record::build_event;

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Case to apply when incoming events omit `case_id`.
    #[arg(long)]
    pub case: Option<String>,
}

pub fn run<R: BufRead>(reader: R, db: &mut Database, args: &ImportArgs) -> Result<usize> {
    let events = parse_events(reader, args.case.as_deref())?;
    let stored = db.insert_events(&events).context("failed to store events")?;
    tracing::info!(count = stored.len(), "imported events");
    Ok(stored.len())
}

fn parse_events<R: BufRead>(mut reader: R, default_case: Option<&str>) -> Result<Vec<NewEvent>> {
    let mut input = String::new();
    reader
        .read_to_string(&mut input)
        .context("failed to read input")?;

    if input.trim_start().starts_with('[') {
        parse_array(&input, default_case)
    } else {
        parse_lines(&input, default_case)
    }
}

fn parse_array(input: &str, default_case: Option<&str>) -> Result<Vec<NewEvent>> {
    let parsed: Vec<ImportEvent> =
        serde_json::from_str(input).context("invalid JSON array")?;
    parsed
        .into_iter()
        .enumerate()
        .map(|(idx, event)| {
            event
                .into_new_event(default_case)
                .with_context(|| format!("invalid event at index {idx}"))
        })
        .collect()
}

fn parse_lines(input: &str, default_case: Option<&str>) -> Result<Vec<NewEvent>> {
    let mut events = Vec::new();
    for (idx, line) in input.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let parsed: ImportEvent = serde_json::from_str(trimmed)
            .with_context(|| format!("invalid JSON on line {}", idx + 1))?;
        let record = parsed
            .into_new_event(default_case)
            .with_context(|| format!("invalid event on line {}", idx + 1))?;
        events.push(record);
    }
    Ok(events)
}

#[derive(Debug, Deserialize)]
struct ImportEvent {
    #[serde(default)]
    case_id: Option<String>,
    event_name: String,
    event_type: String,
    timestamp: String,
    #[serde(default)]
    metadata: serde_json::Value,
}

impl ImportEvent {
    fn into_new_event(self, default_case: Option<&str>) -> Result<NewEvent> {
        let case_id = match self.case_id {
            Some(case_id) if !case_id.trim().is_empty() => case_id,
            _ => default_case
                .map(str::to_string)
                .filter(|val| !val.trim().is_empty())
                .ok_or_else(|| anyhow::anyhow!("missing case_id"))?,
        };
        let timestamp = tp_core::parse_timestamp(&self.timestamp)?;
        build_event(
            &case_id,
            &self.event_name,
            &self.event_type,
            timestamp,
            self.metadata,
        )
    }
}
