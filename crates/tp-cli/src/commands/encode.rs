//! Encode command for the compact unit-time fingerprint.

use std::io::Write;

use anyhow::Result;
use tp_core::{NO_EVENTS, encode, unit_labels};
use tp_db::Database;

pub fn run<W: Write>(writer: &mut W, db: &Database, case_id: &str, labels: bool) -> Result<()> {
    let events = db.case_events(case_id)?;

    let line = if labels {
        let labels = unit_labels(&events);
        if labels.is_empty() {
            NO_EVENTS.to_string()
        } else {
            format!("{case_id}:{}", labels.join(","))
        }
    } else {
        encode(&events)
    };

    tracing::debug!(case_id, encoded = %line, "encoded unit time");
    writeln!(writer, "{line}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::commands::record::build_event;
    use chrono::{TimeZone, Utc};
    use serde_json::Value;

    fn seeded_db() -> Database {
        let mut db = Database::open_in_memory().unwrap();
        let ts = |minute, second| Utc.with_ymd_and_hms(2025, 1, 1, 9, minute, second).unwrap();
        db.insert_events(&[
            build_event("case-1", "review", "start", ts(0, 0), Value::Null).unwrap(),
            build_event("case-1", "call", "start", ts(3, 59), Value::Null).unwrap(),
            build_event("case-1", "review", "end", ts(12, 30), Value::Null).unwrap(),
        ])
        .unwrap();
        db
    }

    #[test]
    fn encode_prints_last_label() {
        let db = seeded_db();
        let mut output = Vec::new();
        run(&mut output, &db, "case-1", false).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "case-1:T12\n");
    }

    #[test]
    fn encode_labels_prints_full_timeline() {
        let db = seeded_db();
        let mut output = Vec::new();
        run(&mut output, &db, "case-1", true).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "case-1:T0,T3,T12\n");
    }

    #[test]
    fn encode_unknown_case_prints_sentinel() {
        let db = seeded_db();
        let mut output = Vec::new();
        run(&mut output, &db, "other", false).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "no_events\n");
    }
}
