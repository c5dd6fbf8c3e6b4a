//! Durations command for reconciled touchpoint times.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io::Write;
use std::time::Instant;

use anyhow::Result;
use tp_core::{DurationResult, NO_EVENTS, reconcile};
use tp_db::Database;

/// Drops groups without a valid duration when `hide_empty` is set.
pub(crate) fn visible_groups(
    results: BTreeMap<String, DurationResult>,
    hide_empty: bool,
) -> BTreeMap<String, DurationResult> {
    if !hide_empty {
        return results;
    }
    results
        .into_iter()
        .filter(|(_, result)| result.has_duration())
        .collect()
}

/// One line per touchpoint, in name order.
pub(crate) fn render_durations(results: &BTreeMap<String, DurationResult>) -> String {
    let mut out = String::new();
    for (name, result) in results {
        writeln!(
            out,
            "{name}: {} pairs, {:.2} min total, {:.2} min avg",
            result.count, result.sum_minutes, result.average_minutes
        )
        .unwrap();
    }
    out
}

pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    case_id: &str,
    json: bool,
    hide_empty: bool,
) -> Result<()> {
    let started = Instant::now();
    let events = db.case_events(case_id)?;
    let results = reconcile(&events);
    let groups = results.len();
    let results = visible_groups(results, hide_empty);

    tracing::info!(
        case_id,
        events = events.len(),
        groups,
        shown = results.len(),
        elapsed = ?started.elapsed(),
        "reconciled durations"
    );

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&results)?)?;
    } else if events.is_empty() {
        writeln!(writer, "{NO_EVENTS}")?;
    } else if results.is_empty() {
        writeln!(writer, "No completed touchpoints.")?;
    } else {
        write!(writer, "{}", render_durations(&results))?;
    }
    Ok(())
}
