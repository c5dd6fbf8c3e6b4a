//! Whole-case elapsed time metrics.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::event::TouchpointEvent;

/// Errors from summarizing a case.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SummaryError {
    /// The case has no events; callers should report it as not found.
    #[error("no events found for this case")]
    NoEvents,
}

/// Span and size of a single case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseMetrics {
    pub case_id: String,
    pub total_events: usize,
    pub first_event_time: DateTime<Utc>,
    pub last_event_time: DateTime<Utc>,
    pub total_duration_ms: i64,
    pub duration_human: String,
}

/// Summarizes the wall-clock span of a case.
///
/// Events are ordered by timestamp first (a stable sort, so input that is
/// already ordered is used as-is). An empty slice is an error rather than a
/// zeroed summary.
pub fn summarize<E: TouchpointEvent>(events: &[E]) -> Result<CaseMetrics, SummaryError> {
    let mut ordered: Vec<&E> = events.iter().collect();
    ordered.sort_by_key(|event| event.timestamp());

    let (Some(first), Some(last)) = (ordered.first(), ordered.last()) else {
        return Err(SummaryError::NoEvents);
    };

    let first_event_time = first.timestamp();
    let last_event_time = last.timestamp();
    let total_duration = last_event_time - first_event_time;

    Ok(CaseMetrics {
        case_id: first.case_id().to_string(),
        total_events: events.len(),
        first_event_time,
        last_event_time,
        total_duration_ms: total_duration.num_milliseconds(),
        duration_human: format_duration(total_duration),
    })
}

/// Formats a duration using the largest unit it exceeds.
///
/// Hours, minutes and seconds are shown with one decimal place; anything up
/// to one second falls through to whole milliseconds. Exactly one hour is
/// still rendered in minutes.
#[allow(clippy::cast_precision_loss)]
pub fn format_duration(duration: Duration) -> String {
    let ms = duration.num_milliseconds();
    if duration > Duration::hours(1) {
        format!("{:.1} hours", ms as f64 / 3_600_000.0)
    } else if duration > Duration::minutes(1) {
        format!("{:.1} minutes", ms as f64 / 60_000.0)
    } else if duration > Duration::seconds(1) {
        format!("{:.1} seconds", ms as f64 / 1_000.0)
    } else {
        format!("{ms} milliseconds")
    }
}
