use std::collections::BTreeSet;

use tracing::debug;

use crate::analyzers::aggregate::{AggregateTable, WeekAggregates};
use crate::analyzers::types::{ComparisonRow, Week, WeeklyAggregate};
use crate::analyzers::utility::{change, pct_change};

/// Label used for the pair (`previous`, `current`), e.g. "Week 3 vs Week 2".
pub fn comparison_label(current: &Week, previous: &Week) -> String {
    format!("{} vs {}", current.label(), previous.label())
}

/// Compares every week with the one before it.
///
/// Keys are outer-joined per pair: a key missing on one side is compared
/// against an all-zero aggregate.
pub fn compare_weeks(table: &AggregateTable, weeks: &[Week]) -> Vec<ComparisonRow> {
    let empty = WeekAggregates::new();
    let mut rows = Vec::new();

    for pair in weeks.windows(2) {
        let (previous_week, current_week) = (&pair[0], &pair[1]);
        let previous = table.get(&previous_week.start).unwrap_or(&empty);
        let current = table.get(&current_week.start).unwrap_or(&empty);

        let pair_rows = compare_pair(current_week, current, previous_week, previous);
        debug!(
            comparison = %comparison_label(current_week, previous_week),
            rows = pair_rows.len(),
            "Week pair compared"
        );
        rows.extend(pair_rows);
    }

    rows
}

/// Outer-joins two weeks of aggregates and computes the changes per key.
pub fn compare_pair(
    current_week: &Week,
    current: &WeekAggregates,
    previous_week: &Week,
    previous: &WeekAggregates,
) -> Vec<ComparisonRow> {
    let label = comparison_label(current_week, previous_week);
    let keys: BTreeSet<&String> = current.keys().chain(previous.keys()).collect();

    keys.into_iter()
        .map(|key| {
            let cur = current.get(key).cloned().unwrap_or_default();
            let prev = previous.get(key).cloned().unwrap_or_default();
            build_row(key, &label, current_week, previous_week, cur, prev)
        })
        .collect()
}

fn build_row(
    key: &str,
    label: &str,
    current_week: &Week,
    previous_week: &Week,
    current: WeeklyAggregate,
    previous: WeeklyAggregate,
) -> ComparisonRow {
    ComparisonRow {
        key: key.to_string(),
        comparison: label.to_string(),
        current_week: current_week.start,
        previous_week: previous_week.start,
        users_change: change(current.total_users, previous.total_users),
        users_change_pct: pct_change(current.total_users, previous.total_users),
        key_events_change: change(current.key_events, previous.key_events),
        key_events_change_pct: pct_change(current.key_events, previous.key_events),
        engagement_change: current.engagement_rate - previous.engagement_rate,
        current,
        previous,
    }
}
