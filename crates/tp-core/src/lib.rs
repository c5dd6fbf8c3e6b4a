//! Core domain logic for touchpoint tracking.
//!
//! This crate contains the pure functions that turn a case's events into:
//! - Reconciliation: per-touchpoint start/end pairing and duration totals
//! - Summary: the case's overall span and a human-readable duration
//! - Unit time: a compact relative-minute fingerprint of the timeline
//!
//! Nothing here performs I/O; events are loaded by `tp-db`.

pub mod event;
pub mod event_type;
pub mod reconcile;
pub mod report;
pub mod summary;
pub mod types;
pub mod unit_time;

#[cfg(test)]
mod test_support;

pub use event::{Event, TouchpointEvent, parse_timestamp};
pub use event_type::EventType;
pub use reconcile::{DurationResult, MatchedPair, matched_pairs, reconcile};
pub use report::{CaseReport, build_reports};
pub use summary::{CaseMetrics, SummaryError, format_duration, summarize};
pub use types::{CaseId, EventId, EventName, ValidationError};
pub use unit_time::{NO_EVENTS, encode, unit_labels};
