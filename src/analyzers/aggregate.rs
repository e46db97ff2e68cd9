use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::analyzers::dimension::Dimension;
use crate::analyzers::types::{Week, WeeklyAggregate};
use crate::analyzers::utility::mean;
use crate::analyzers::week::records_in_week;
use crate::record::DailyRecord;

/// Per-key aggregates of a single week.
pub type WeekAggregates = BTreeMap<String, WeeklyAggregate>;

/// Per-week aggregates of a whole dimension, keyed by week start.
pub type AggregateTable = BTreeMap<NaiveDate, WeekAggregates>;

#[derive(Default)]
struct Accumulator {
    total_users: u64,
    key_events: u64,
    engagement_rates: Vec<f64>,
    key_event_rates: Vec<f64>,
}

impl Accumulator {
    fn push(&mut self, record: &DailyRecord) {
        self.total_users += record.users();
        self.key_events += record.key_events();
        self.engagement_rates.push(record.engagement_rate());
        self.key_event_rates.push(record.key_event_rate());
    }

    fn finish(self) -> WeeklyAggregate {
        WeeklyAggregate {
            total_users: self.total_users,
            key_events: self.key_events,
            engagement_rate: mean(&self.engagement_rates),
            key_event_rate: mean(&self.key_event_rates),
            record_count: self.engagement_rates.len(),
        }
    }
}

/// Groups `records` by `dimension` key and reduces each group.
///
/// Users and key events are summed, the two rates are averaged over the rows
/// present. Keys with no rows do not appear in the result.
pub fn aggregate_records<'a>(
    records: impl IntoIterator<Item = &'a DailyRecord>,
    dimension: Dimension,
) -> WeekAggregates {
    let mut groups: BTreeMap<String, Accumulator> = BTreeMap::new();

    for record in records {
        groups.entry(dimension.key(record)).or_default().push(record);
    }

    groups
        .into_iter()
        .map(|(key, acc)| (key, acc.finish()))
        .collect()
}

/// Aggregates every week in `weeks` for one dimension.
pub fn aggregate_weekly(records: &[DailyRecord], weeks: &[Week], dimension: Dimension) -> AggregateTable {
    weeks
        .iter()
        .map(|week| {
            let aggregates = aggregate_records(records_in_week(records, week), dimension);
            debug!(
                dimension = %dimension,
                week = week.index,
                keys = aggregates.len(),
                "Week aggregated"
            );
            (week.start, aggregates)
        })
        .collect()
}
