//! Metrics command for a case's overall span.

use std::io::Write;
use std::time::Instant;

use anyhow::Result;
use tp_core::{CaseMetrics, SummaryError, summarize};
use tp_db::Database;

/// Prints the metrics of one case, failing if the case has no events.
pub fn run<W: Write>(writer: &mut W, db: &Database, case_id: &str, json: bool) -> Result<()> {
    let started = Instant::now();
    let events = db.case_events(case_id)?;

    let metrics = match summarize(&events) {
        Ok(metrics) => metrics,
        Err(SummaryError::NoEvents) => {
            tracing::warn!(case_id, "no events found for case");
            anyhow::bail!("no events found for case {case_id}");
        }
    };

    tracing::info!(
        case_id,
        events = metrics.total_events,
        duration = %metrics.duration_human,
        elapsed = ?started.elapsed(),
        "generated case metrics"
    );

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&metrics)?)?;
    } else {
        write!(writer, "{}", render_metrics(&metrics))?;
    }
    Ok(())
}

fn render_metrics(metrics: &CaseMetrics) -> String {
    format!(
        "Case:        {}\nEvents:      {}\nFirst event: {}\nLast event:  {}\nDuration:    {} ({} ms)\n",
        metrics.case_id,
        metrics.total_events,
        metrics.first_event_time.to_rfc3339(),
        metrics.last_event_time.to_rfc3339(),
        metrics.duration_human,
        metrics.total_duration_ms,
    )
}
