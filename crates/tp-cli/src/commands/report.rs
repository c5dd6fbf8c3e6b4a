//! Report command summarizing every case.
//!
//! Cases are reconciled in parallel (see `tp_core::build_reports`) and shown
//! in case ID order, either human-readable or as JSON.

use std::fmt::Write as _;
use std::io::Write;
use std::time::Instant;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tp_core::{CaseReport, build_reports};
use tp_db::Database;

use super::durations::{render_durations, visible_groups};

/// Computed report data.
#[derive(Debug, Serialize)]
pub struct ReportData {
    pub generated_at: DateTime<Utc>,
    pub total_events: usize,
    pub cases: Vec<CaseReport>,
}

/// Loads every case and builds its report.
pub fn generate_report_data(
    db: &Database,
    hide_empty: bool,
    generated_at: DateTime<Utc>,
) -> Result<ReportData> {
    let by_case = db.events_by_case()?;
    let mut cases = build_reports(&by_case);
    for case in &mut cases {
        case.durations = visible_groups(std::mem::take(&mut case.durations), hide_empty);
    }
    let total_events = cases.iter().map(|c| c.metrics.total_events).sum();

    Ok(ReportData {
        generated_at,
        total_events,
        cases,
    })
}

/// Formats the human-readable report output.
pub fn format_report(data: &ReportData) -> String {
    let mut output = String::new();

    writeln!(output, "CASE REPORT").unwrap();
    writeln!(output, "───────────").unwrap();

    if data.cases.is_empty() {
        writeln!(output, "No events recorded.").unwrap();
        writeln!(output).unwrap();
        writeln!(output, "Hint: Run 'tp record' or 'tp import' to add events.").unwrap();
        return output;
    }

    for case in &data.cases {
        let metrics = &case.metrics;
        writeln!(
            output,
            "{}  {} events  {}  {}",
            metrics.case_id, metrics.total_events, metrics.duration_human, case.unit_time
        )
        .unwrap();
        for line in render_durations(&case.durations).lines() {
            writeln!(output, "  {line}").unwrap();
        }
    }

    writeln!(output).unwrap();
    writeln!(output, "SUMMARY").unwrap();
    writeln!(output, "───────").unwrap();
    writeln!(output, "Cases:  {}", data.cases.len()).unwrap();
    writeln!(output, "Events: {}", data.total_events).unwrap();

    output
}

pub fn run<W: Write>(writer: &mut W, db: &Database, json: bool, hide_empty: bool) -> Result<()> {
    let started = Instant::now();
    let data = generate_report_data(db, hide_empty, Utc::now())?;
    tracing::info!(
        cases = data.cases.len(),
        events = data.total_events,
        elapsed = ?started.elapsed(),
        "generated report"
    );

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&data)?)?;
    } else {
        write!(writer, "{}", format_report(&data))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::commands::record::build_event;
    use chrono::{Duration, TimeZone};
    use insta::assert_snapshot;
    use serde_json::Value;

    fn generated_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap()
    }

    fn seeded_db() -> Database {
        let mut db = Database::open_in_memory().unwrap();
        let base = Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap();
        let at = |minutes| base + Duration::minutes(minutes);
        db.insert_events(&[
            build_event("case-2", "call", "start", at(0), Value::Null).unwrap(),
            build_event("case-1", "review", "start", at(0), Value::Null).unwrap(),
            build_event("case-1", "review", "end", at(90), Value::Null).unwrap(),
            build_event("case-1", "signing", "start", at(30), Value::Null).unwrap(),
        ])
        .unwrap();
        db
    }

    #[test]
    fn report_lists_cases_and_durations() {
        let db = seeded_db();
        let data = generate_report_data(&db, true, generated_at()).unwrap();

        assert_snapshot!(format_report(&data), @r"
        CASE REPORT
        ───────────
        case-1  3 events  1.5 hours  case-1:T90
          review: 1 pairs, 90.00 min total, 90.00 min avg
        case-2  1 events  0 milliseconds  case-2:T0

        SUMMARY
        ───────
        Cases:  2
        Events: 4
        ");
    }

    #[test]
    fn report_json_includes_every_case() {
        let db = seeded_db();
        let mut output = Vec::new();

        run(&mut output, &db, true, false).unwrap();

        let value: Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(value["total_events"], 4);
        assert_eq!(value["cases"][0]["metrics"]["case_id"], "case-1");
        assert_eq!(value["cases"][0]["durations"]["signing"]["count"], 0);
        assert_eq!(value["cases"][1]["unit_time"], "case-2:T0");
    }

    #[test]
    fn report_handles_empty_store() {
        let db = Database::open_in_memory().unwrap();
        let data = generate_report_data(&db, true, generated_at()).unwrap();
        let output = format_report(&data);
        assert!(output.contains("No events recorded."));
    }
}
