//! Compact relative-minute encoding of a case timeline.
//!
//! Each event is labelled `T<k>` where `k` is the number of whole minutes
//! since the case's first event. [`encode`] keeps only the final label
//! (`<case_id>:T<k>`); [`unit_labels`] returns the full sequence.

use crate::event::TouchpointEvent;

/// Returned by [`encode`] for a case without events.
pub const NO_EVENTS: &str = "no_events";

/// Labels every event with its whole-minute offset from the first event.
///
/// Offsets are truncated, so an event 119 seconds after the first is `T1`.
pub fn unit_labels<E: TouchpointEvent>(events: &[E]) -> Vec<String> {
    let mut ordered: Vec<&E> = events.iter().collect();
    ordered.sort_by_key(|event| event.timestamp());

    let Some(base) = ordered.first().map(|event| event.timestamp()) else {
        return Vec::new();
    };

    ordered
        .iter()
        .map(|event| format!("T{}", (event.timestamp() - base).num_minutes()))
        .collect()
}

/// Encodes a case as `<case_id>:<label of the last event>`.
pub fn encode<E: TouchpointEvent>(events: &[E]) -> String {
    let Some(first) = events.iter().min_by_key(|event| event.timestamp()) else {
        return NO_EVENTS.to_string();
    };
    let labels = unit_labels(events);
    let last = labels.last().map_or("T0", String::as_str);
    format!("{}:{last}", first.case_id())
}
