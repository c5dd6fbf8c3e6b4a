//! Events command for dumping stored events as JSONL.

use std::io::Write;

use anyhow::Result;
use tp_db::Database;

/// Writes events (all, or one case's) as JSONL, ordered by timestamp.
pub fn run<W: Write>(writer: &mut W, db: &Database, case: Option<&str>) -> Result<()> {
    let events = match case {
        Some(case_id) => db.case_events(case_id)?,
        None => db.list_events()?,
    };
    tracing::info!(case_id = ?case, count = events.len(), "retrieved events");

    for event in events {
        let json = serde_json::to_string(&event)?;
        writeln!(writer, "{json}")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::commands::record::build_event;
    use chrono::{TimeZone, Utc};
    use serde_json::Value;

    #[test]
    fn events_can_be_filtered_by_case() {
        let mut db = Database::open_in_memory().unwrap();
        let ts = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        db.insert_events(&[
            build_event("case-a", "review", "start", ts, Value::Null).unwrap(),
            build_event("case-b", "review", "start", ts, Value::Null).unwrap(),
        ])
        .unwrap();

        let mut all = Vec::new();
        run(&mut all, &db, None).unwrap();
        assert_eq!(String::from_utf8(all).unwrap().lines().count(), 2);

        let mut filtered = Vec::new();
        run(&mut filtered, &db, Some("case-b")).unwrap();
        let filtered = String::from_utf8(filtered).unwrap();
        assert_eq!(filtered.lines().count(), 1);
        assert!(filtered.contains(r#""case_id":"case-b""#));
    }
}
