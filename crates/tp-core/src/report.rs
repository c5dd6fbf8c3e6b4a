//! Multi-case reports.
//!
//! Cases are independent, so each one is reconciled on the rayon pool.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::Serialize;

use crate::event::TouchpointEvent;
use crate::reconcile::{DurationResult, reconcile};
use crate::summary::{CaseMetrics, summarize};
use crate::unit_time::encode;

/// Everything derived for one case.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseReport {
    pub metrics: CaseMetrics,
    pub durations: BTreeMap<String, DurationResult>,
    pub unit_time: String,
}

/// Builds a report for every non-empty case.
///
/// Cases without events are skipped (they have no metrics to show). The
/// output is ordered by case ID.
pub fn build_reports<E>(cases: &BTreeMap<String, Vec<E>>) -> Vec<CaseReport>
where
    E: TouchpointEvent + Sync,
{
    let mut reports: Vec<CaseReport> = cases
        .par_iter()
        .filter_map(|(case_id, events)| match summarize(events) {
            Ok(metrics) => Some(CaseReport {
                metrics,
                durations: reconcile(events),
                unit_time: encode(events),
            }),
            Err(err) => {
                tracing::debug!(case_id = %case_id, error = %err, "skipping case");
                None
            }
        })
        .collect();

    reports.sort_by(|a, b| a.metrics.case_id.cmp(&b.metrics.case_id));
    reports
}
