//! Value types produced by the weekly pipeline.

use chrono::{Days, NaiveDate};
use serde::Serialize;

/// A Monday-to-Sunday calendar week, numbered from 1 in chronological order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Week {
    pub index: usize,
    pub start: NaiveDate,
}

impl Week {
    pub fn new(index: usize, start: NaiveDate) -> Self {
        Week { index, start }
    }

    /// Sunday closing the week.
    pub fn end(&self) -> NaiveDate {
        self.start + Days::new(6)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end()
    }

    /// All seven dates of the week, Monday first.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let start = self.start;
        (0..7).map(move |offset| start + Days::new(offset))
    }

    pub fn label(&self) -> String {
        format!("Week {}", self.index)
    }
}

/// Dates of a week that have no records at all.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingDateInfo {
    pub week: Week,
    pub missing_dates: Vec<NaiveDate>,
}

impl MissingDateInfo {
    pub fn is_complete(&self) -> bool {
        self.missing_dates.is_empty()
    }

    pub fn present_days(&self) -> usize {
        7 - self.missing_dates.len()
    }
}

/// Reduced metrics for one dimension key within one week.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WeeklyAggregate {
    pub total_users: u64,
    pub key_events: u64,
    pub engagement_rate: f64,
    pub key_event_rate: f64,
    pub record_count: usize,
}

/// Week-over-week comparison for one dimension key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub key: String,
    pub comparison: String,
    pub current_week: NaiveDate,
    pub previous_week: NaiveDate,

    pub current: WeeklyAggregate,
    pub previous: WeeklyAggregate,

    pub users_change: i64,
    pub users_change_pct: f64,
    pub key_events_change: i64,
    pub key_events_change_pct: f64,
    pub engagement_change: f64,
}
