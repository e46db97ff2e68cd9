//! Selection rules for the narrative summary.
//!
//! | Level                       | Rows | Current users floor |
//! |-----------------------------|------|---------------------|
//! | channel                     | 3    | none                |
//! | source / medium             | 5    | > 100               |
//! | landing page + combinations | 5    | > 50                |
//!
//! Engagement highlights need > 100 current users, key event highlights need
//! > 10 current key events. Ties rank by key so output is stable.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::analyzers::types::ComparisonRow;

pub const INSIGHT_COUNT: usize = 3;
pub const ENGAGEMENT_MIN_CURRENT_USERS: u64 = 100;
pub const KEY_EVENT_MIN_CURRENT_EVENTS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightPolicy {
    pub count: usize,
    /// Rows must have strictly more current-week users than this.
    pub min_current_users: Option<u64>,
}

impl HighlightPolicy {
    pub fn is_material(&self, row: &ComparisonRow) -> bool {
        self.min_current_users
            .is_none_or(|floor| row.current.total_users > floor)
    }
}

/// Per-key totals of the changes across every week pair.
#[derive(Debug, Clone, PartialEq)]
pub struct OverallChange {
    pub key: String,
    pub users_change: i64,
    pub key_events_change: i64,
}

fn top_by<'a, F>(
    rows: impl IntoIterator<Item = &'a ComparisonRow>,
    count: usize,
    metric: F,
) -> Vec<&'a ComparisonRow>
where
    F: Fn(&ComparisonRow) -> f64,
{
    let mut ranked: Vec<&ComparisonRow> = rows.into_iter().collect();
    ranked.sort_by(|a, b| {
        metric(*b)
            .partial_cmp(&metric(*a))
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.key.cmp(&b.key))
    });
    ranked.truncate(count);
    ranked
}

/// Largest user increases among material rows.
pub fn top_gainers<'a>(rows: &'a [ComparisonRow], policy: HighlightPolicy) -> Vec<&'a ComparisonRow> {
    top_by(
        rows.iter().filter(|r| policy.is_material(r)),
        policy.count,
        |r| r.users_change as f64,
    )
}

/// Largest user decreases among material rows.
pub fn top_decliners<'a>(rows: &'a [ComparisonRow], policy: HighlightPolicy) -> Vec<&'a ComparisonRow> {
    top_by(
        rows.iter().filter(|r| policy.is_material(r)),
        policy.count,
        |r| -(r.users_change as f64),
    )
}

pub fn engagement_improvements(rows: &[ComparisonRow]) -> Vec<&ComparisonRow> {
    top_by(
        rows.iter()
            .filter(|r| r.current.total_users > ENGAGEMENT_MIN_CURRENT_USERS),
        INSIGHT_COUNT,
        |r| r.engagement_change,
    )
}

pub fn key_event_increases(rows: &[ComparisonRow]) -> Vec<&ComparisonRow> {
    top_by(
        rows.iter()
            .filter(|r| r.current.key_events > KEY_EVENT_MIN_CURRENT_EVENTS),
        INSIGHT_COUNT,
        |r| r.key_events_change as f64,
    )
}

/// Keys with the largest user growth summed over all week pairs.
pub fn strongest_overall(rows: &[ComparisonRow]) -> Vec<OverallChange> {
    let mut totals: BTreeMap<&str, (i64, i64)> = BTreeMap::new();
    for row in rows {
        let entry = totals.entry(row.key.as_str()).or_default();
        entry.0 += row.users_change;
        entry.1 += row.key_events_change;
    }

    let mut overall: Vec<OverallChange> = totals
        .into_iter()
        .map(|(key, (users_change, key_events_change))| OverallChange {
            key: key.to_string(),
            users_change,
            key_events_change,
        })
        .collect();

    // BTreeMap order already sorts by key, so a stable sort keeps ties by key.
    overall.sort_by(|a, b| b.users_change.cmp(&a.users_change));
    overall.truncate(INSIGHT_COUNT);
    overall
}
