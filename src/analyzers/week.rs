//! Calendar week bucketing and completeness checks.

use std::collections::{BTreeSet, HashSet};

use chrono::{Datelike, Days, NaiveDate};
use tracing::{info, warn};

use crate::analyzers::types::{MissingDateInfo, Week};
use crate::record::DailyRecord;

/// Monday on or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = date.weekday().num_days_from_monday() as u64;
    date - Days::new(offset)
}

/// Distinct weeks present in `records`, ascending and numbered from 1.
pub fn partition_weeks(records: &[DailyRecord]) -> Vec<Week> {
    let starts: BTreeSet<NaiveDate> = records.iter().map(|r| week_start(r.date)).collect();

    let weeks: Vec<Week> = starts
        .into_iter()
        .enumerate()
        .map(|(i, start)| Week::new(i + 1, start))
        .collect();

    for week in &weeks {
        info!(week = week.index, start = %week.start, end = %week.end(), "Week found");
    }

    weeks
}

/// Records whose date falls in `week`.
pub fn records_in_week<'a>(
    records: &'a [DailyRecord],
    week: &Week,
) -> impl Iterator<Item = &'a DailyRecord> + use<'a> {
    let week = *week;
    records.iter().filter(move |r| week.contains(r.date))
}

/// Missing calendar dates for every week, in week order.
///
/// Only date presence counts: a day whose rows are all zero is present.
pub fn check_missing_dates(records: &[DailyRecord], weeks: &[Week]) -> Vec<MissingDateInfo> {
    let present: HashSet<NaiveDate> = records.iter().map(|r| r.date).collect();

    weeks
        .iter()
        .map(|week| {
            let missing_dates: Vec<NaiveDate> =
                week.dates().filter(|d| !present.contains(d)).collect();

            if missing_dates.is_empty() {
                info!(week = week.index, "Week complete (all 7 days present)");
            } else {
                warn!(
                    week = week.index,
                    missing = missing_dates.len(),
                    dates = ?missing_dates,
                    "Week has missing dates"
                );
            }

            MissingDateInfo {
                week: *week,
                missing_dates,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn records_on(dates: &[NaiveDate]) -> Vec<DailyRecord> {
        dates.iter().map(|d| DailyRecord::new(*d)).collect()
    }

    #[test]
    fn test_week_start_is_monday() {
        // 2024-01-01 is a Monday.
        assert_eq!(week_start(date(2024, 1, 1)), date(2024, 1, 1));
        assert_eq!(week_start(date(2024, 1, 3)), date(2024, 1, 1));
        assert_eq!(week_start(date(2024, 1, 7)), date(2024, 1, 1));
        assert_eq!(week_start(date(2024, 1, 8)), date(2024, 1, 8));
        assert_eq!(week_start(date(2023, 12, 31)), date(2023, 12, 25));
    }

    #[test]
    fn test_partition_empty() {
        assert!(partition_weeks(&[]).is_empty());
    }

    #[test]
    fn test_partition_sorted_and_numbered() {
        let records = records_on(&[date(2024, 1, 17), date(2024, 1, 2), date(2024, 1, 9), date(2024, 1, 3)]);
        let weeks = partition_weeks(&records);

        assert_eq!(
            weeks,
            vec![
                Week::new(1, date(2024, 1, 1)),
                Week::new(2, date(2024, 1, 8)),
                Week::new(3, date(2024, 1, 15)),
            ]
        );
        assert_eq!(weeks[0].end(), date(2024, 1, 7));
    }

    #[test]
    fn test_complete_week() {
        let week = Week::new(1, date(2024, 1, 1));
        let records: Vec<_> = week.dates().map(DailyRecord::new).collect();

        let info = check_missing_dates(&records, &[week]);
        assert!(info[0].is_complete());
        assert_eq!(info[0].present_days(), 7);
    }

    #[test]
    fn test_one_missing_date() {
        let week = Week::new(1, date(2024, 1, 1));
        let records: Vec<_> = week
            .dates()
            .filter(|d| *d != date(2024, 1, 4))
            .map(DailyRecord::new)
            .collect();

        let info = check_missing_dates(&records, &[week]);
        assert_eq!(info[0].missing_dates, vec![date(2024, 1, 4)]);
    }

    #[test]
    fn test_present_and_missing_partition_the_week() {
        let weeks = vec![Week::new(1, date(2024, 1, 1)), Week::new(2, date(2024, 1, 8))];
        let records = records_on(&[date(2024, 1, 1), date(2024, 1, 5), date(2024, 1, 14)]);
        let present: HashSet<_> = records.iter().map(|r| r.date).collect();

        for info in check_missing_dates(&records, &weeks) {
            let in_week_present = info.week.dates().filter(|d| present.contains(d)).count();
            assert_eq!(in_week_present + info.missing_dates.len(), 7);
            assert!(info.missing_dates.iter().all(|d| info.week.contains(*d)));
        }
    }

    #[test]
    fn test_zero_metric_day_counts_as_present() {
        let week = Week::new(1, date(2024, 1, 1));
        let records: Vec<_> = week
            .dates()
            .map(|d| DailyRecord::new(d).with_metrics(crate::record::Metrics::users(0)))
            .collect();

        assert!(check_missing_dates(&records, &[week])[0].is_complete());
    }

    #[test]
    fn test_records_in_week() {
        let week = Week::new(1, date(2024, 1, 1));
        let records = records_on(&[date(2023, 12, 31), date(2024, 1, 1), date(2024, 1, 7), date(2024, 1, 8)]);

        assert_eq!(records_in_week(&records, &week).count(), 2);
    }
}
