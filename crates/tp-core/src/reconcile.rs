//! Duration reconciliation.
//!
//! Turns the unordered start/end events of one case into per-touchpoint
//! duration totals.
//!
//! # Algorithm Summary
//!
//! 1. Group events by `event_name`
//! 2. Sort each group's start times and end times independently
//! 3. Pair the i-th start with the i-th end (rank order, not nesting)
//! 4. Drop pairs whose duration is not positive, then sum and average
//!
//! Rank pairing assumes touchpoints of the same name never overlap out of
//! order. Extra starts or ends beyond the shorter side are ignored.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event::TouchpointEvent;
use crate::event_type::EventType;

/// Duration totals for a single touchpoint name.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DurationResult {
    /// Number of start/end pairs with a positive duration.
    pub count: usize,

    /// Sum of the surviving pair durations, in minutes.
    pub sum_minutes: f64,

    /// `sum_minutes / count`, or 0 when no pair survived.
    pub average_minutes: f64,
}

impl DurationResult {
    /// Whether at least one valid duration was computed for the group.
    pub const fn has_duration(&self) -> bool {
        self.count > 0
    }
}

/// One matched start/end pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchedPair {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl MatchedPair {
    /// Elapsed time in fractional minutes.
    ///
    /// Uses nanosecond precision, falling back to milliseconds for spans too
    /// long to count in nanoseconds.
    #[allow(clippy::cast_precision_loss)]
    pub fn minutes(&self) -> f64 {
        let elapsed = self.end - self.start;
        elapsed.num_nanoseconds().map_or_else(
            || elapsed.num_milliseconds() as f64 / 60_000.0,
            |nanos| nanos as f64 / 60_000_000_000.0,
        )
    }
}

/// Start and end instants for one touchpoint name.
#[derive(Debug, Default)]
struct EventGroup {
    starts: Vec<DateTime<Utc>>,
    ends: Vec<DateTime<Utc>>,
}

impl EventGroup {
    fn push(&mut self, event_type: EventType, timestamp: DateTime<Utc>) {
        match event_type {
            EventType::Start => self.starts.push(timestamp),
            EventType::End => self.ends.push(timestamp),
        }
    }

    /// Sorts both sides and zips them by rank.
    fn into_pairs(mut self) -> Vec<MatchedPair> {
        self.starts.sort_unstable();
        self.ends.sort_unstable();
        self.starts
            .into_iter()
            .zip(self.ends)
            .map(|(start, end)| MatchedPair { start, end })
            .collect()
    }
}

fn group_events<E: TouchpointEvent>(events: &[E]) -> BTreeMap<&str, EventGroup> {
    let mut groups: BTreeMap<&str, EventGroup> = BTreeMap::new();
    for event in events {
        groups
            .entry(event.event_name())
            .or_default()
            .push(event.event_type(), event.timestamp());
    }
    groups
}

/// Pairs start and end events by rank within each touchpoint name.
///
/// Pairs are returned as matched, including ones with a non-positive
/// duration; [`reconcile`] is what filters those out.
pub fn matched_pairs<E: TouchpointEvent>(events: &[E]) -> BTreeMap<String, Vec<MatchedPair>> {
    group_events(events)
        .into_iter()
        .map(|(name, group)| (name.to_string(), group.into_pairs()))
        .collect()
}

/// Computes duration totals per touchpoint name for one case.
///
/// Every name with at least one event gets an entry, even when none of its
/// pairs produced a positive duration (that entry reports zeros). An empty
/// input yields an empty map.
#[allow(clippy::cast_precision_loss)]
pub fn reconcile<E: TouchpointEvent>(events: &[E]) -> BTreeMap<String, DurationResult> {
    matched_pairs(events)
        .into_iter()
        .map(|(name, pairs)| {
            let durations: Vec<f64> = pairs
                .iter()
                .map(MatchedPair::minutes)
                .filter(|minutes| *minutes > 0.0)
                .collect();
            let count = durations.len();
            let sum_minutes: f64 = durations.iter().sum();
            let average_minutes = if count > 0 {
                sum_minutes / count as f64
            } else {
                0.0
            };
            (
                name,
                DurationResult {
                    count,
                    sum_minutes,
                    average_minutes,
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Fixture, at};

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn empty_input_yields_empty_map() {
        let events: Vec<Fixture> = Vec::new();
        assert!(reconcile(&events).is_empty());
    }

    #[test]
    fn single_pair_reports_its_duration() {
        let events = [
            Fixture::new("review", EventType::Start, at(0)),
            Fixture::new("review", EventType::End, at(5)),
        ];

        let result = reconcile(&events);

        assert_eq!(result.len(), 1);
        let review = result["review"];
        assert_eq!(review.count, 1);
        assert!(approx(review.sum_minutes, 5.0));
        assert!(approx(review.average_minutes, 5.0));
    }

    #[test]
    fn pairs_by_rank_after_sorting_each_side() {
        // Deliberately interleaved and out of order.
        let events = [
            Fixture::new("review", EventType::End, at(10)),
            Fixture::new("review", EventType::Start, at(2)),
            Fixture::new("review", EventType::End, at(3)),
            Fixture::new("review", EventType::Start, at(0)),
        ];

        let review = reconcile(&events)["review"];

        // (0, 3) and (2, 10), not nearest-neighbour or LIFO matching.
        assert_eq!(review.count, 2);
        assert!(approx(review.sum_minutes, 11.0));
        assert!(approx(review.average_minutes, 5.5));
    }

    #[test]
    fn reversed_pairs_are_dropped_but_group_is_reported() {
        let events = [
            Fixture::new("call", EventType::Start, at(10)),
            Fixture::new("call", EventType::End, at(4)),
            Fixture::new("call", EventType::Start, at(20)),
            Fixture::new("call", EventType::End, at(6)),
        ];

        let call = reconcile(&events)["call"];

        assert_eq!(call.count, 0);
        assert!(approx(call.sum_minutes, 0.0));
        assert!(approx(call.average_minutes, 0.0));
        assert!(!call.has_duration());
    }

    #[test]
    fn zero_length_pair_is_discarded() {
        let events = [
            Fixture::new("upload", EventType::Start, at(1)),
            Fixture::new("upload", EventType::End, at(1)),
            Fixture::new("upload", EventType::Start, at(2)),
            Fixture::new("upload", EventType::End, at(6)),
        ];

        let upload = reconcile(&events)["upload"];

        assert_eq!(upload.count, 1);
        assert!(approx(upload.sum_minutes, 4.0));
    }

    #[test]
    fn unmatched_extras_are_ignored() {
        let events = [
            Fixture::new("meeting", EventType::Start, at(0)),
            Fixture::new("meeting", EventType::Start, at(1)),
            Fixture::new("meeting", EventType::Start, at(2)),
            Fixture::new("meeting", EventType::End, at(30)),
        ];

        let meeting = reconcile(&events)["meeting"];

        assert_eq!(meeting.count, 1);
        assert!(approx(meeting.sum_minutes, 30.0));
        assert_eq!(matched_pairs(&events)["meeting"].len(), 1);
    }

    #[test]
    fn starts_without_ends_still_produce_an_entry() {
        let events = [Fixture::new("note_added", EventType::Start, at(0))];

        let result = reconcile(&events);

        assert_eq!(
            result["note_added"],
            DurationResult {
                count: 0,
                sum_minutes: 0.0,
                average_minutes: 0.0,
            }
        );
    }

    #[test]
    fn groups_are_reconciled_independently() {
        let events = [
            Fixture::new("review", EventType::Start, at(0)),
            Fixture::new("call", EventType::Start, at(1)),
            Fixture::new("review", EventType::End, at(3)),
            Fixture::new("call", EventType::End, at(9)),
        ];

        let result = reconcile(&events);

        assert_eq!(result.keys().collect::<Vec<_>>(), ["call", "review"]);
        assert!(approx(result["call"].sum_minutes, 8.0));
        assert!(approx(result["review"].sum_minutes, 3.0));
    }

    #[test]
    fn fractional_minutes_are_not_rounded() {
        let start = at(0);
        let end = start + chrono::Duration::seconds(90);
        let events = [
            Fixture::new("sign", EventType::Start, start),
            Fixture::new("sign", EventType::End, end),
        ];

        assert!(approx(reconcile(&events)["sign"].sum_minutes, 1.5));
    }

    #[test]
    fn sub_millisecond_pair_keeps_its_duration() {
        let events = [
            Fixture::new("signing", EventType::Start, at(0)),
            Fixture::new(
                "signing",
                EventType::End,
                at(0) + chrono::Duration::microseconds(500),
            ),
        ];

        let signing = reconcile(&events)["signing"];

        assert_eq!(signing.count, 1);
        assert!(signing.sum_minutes > 0.0);
        assert!(approx(signing.sum_minutes, 0.0005 / 60.0));
        assert!(approx(signing.average_minutes, signing.sum_minutes));
    }

    #[test]
    fn reconcile_is_idempotent() {
        let events = [
            Fixture::new("review", EventType::Start, at(0)),
            Fixture::new("review", EventType::End, at(7)),
            Fixture::new("call", EventType::End, at(2)),
        ];

        assert_eq!(reconcile(&events), reconcile(&events));
    }
}
