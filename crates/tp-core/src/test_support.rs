//! Lightweight event fixtures for unit tests.

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::event::TouchpointEvent;
use crate::event_type::EventType;

#[derive(Debug, Clone)]
pub struct Fixture {
    pub case_id: String,
    pub name: String,
    pub event_type: EventType,
    pub timestamp: DateTime<Utc>,
}

impl Fixture {
    pub fn new(name: &str, event_type: EventType, timestamp: DateTime<Utc>) -> Self {
        Self {
            case_id: "case-1".to_string(),
            name: name.to_string(),
            event_type,
            timestamp,
        }
    }

    pub fn in_case(mut self, case_id: &str) -> Self {
        self.case_id = case_id.to_string();
        self
    }
}

impl TouchpointEvent for Fixture {
    fn case_id(&self) -> &str {
        &self.case_id
    }

    fn event_name(&self) -> &str {
        &self.name
    }

    fn event_type(&self) -> EventType {
        self.event_type
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// `2025-01-01T09:00:00Z` plus the given number of minutes.
pub fn at(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap() + Duration::minutes(minutes)
}
