use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use ga4_wow::analyzers::analyzer::{Prepared, RunConfig, RunOutcome, SUMMARY_FILE, run};
use ga4_wow::analyzers::dimension::Dimension;
use ga4_wow::analyzers::types::ComparisonRow;
use ga4_wow::config::ExportLayout;
use ga4_wow::loader::load_records;

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/ga4_export.csv");

fn by_key(rows: Vec<ComparisonRow>) -> HashMap<String, ComparisonRow> {
    rows.into_iter().map(|r| (r.key.clone(), r)).collect()
}

#[test]
fn test_fixture_loads() {
    let export = load_records(FIXTURE, &ExportLayout::default()).expect("Failed to load export");

    assert_eq!(export.records.len(), 31);
    assert_eq!(export.rejected_rows, 0);
    assert_eq!(
        export.date_range(),
        Some((
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 14).unwrap()
        ))
    );
}

#[test]
fn test_weeks_and_completeness() {
    let export = load_records(FIXTURE, &ExportLayout::default()).unwrap();
    let prepared = Prepared::new(&export.records).unwrap();

    assert_eq!(prepared.weeks.len(), 2);
    assert!(prepared.completeness[0].is_complete());
    assert_eq!(
        prepared.completeness[1].missing_dates,
        vec![NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()]
    );
}

#[test]
fn test_channel_comparison() {
    let export = load_records(FIXTURE, &ExportLayout::default()).unwrap();
    let prepared = Prepared::new(&export.records).unwrap();
    let rows = by_key(prepared.compare(&export.records, Dimension::Channel));

    assert_eq!(rows.len(), 4);

    let organic = &rows["Organic Search"];
    assert_eq!(organic.previous.total_users, 700);
    assert_eq!(organic.current.total_users, 720);
    assert_eq!(organic.users_change, 20);
    assert_eq!(organic.key_events_change, 4);
    assert!((organic.engagement_change - 0.05).abs() < 1e-9);

    let paid = &rows["Paid Search"];
    assert_eq!(paid.users_change, -60);
    assert!((paid.users_change_pct + 28.571428571428573).abs() < 1e-9);

    let email = &rows["Email"];
    assert_eq!(email.previous.total_users, 0);
    assert_eq!(email.users_change_pct, 100.0);
    assert_eq!(email.key_events_change_pct, 0.0);

    let unknown = &rows["(unknown)"];
    assert_eq!(unknown.previous.total_users, 5);
    assert_eq!(unknown.users_change_pct, -100.0);
}

#[test]
fn test_totals_match_across_dimensions() {
    let export = load_records(FIXTURE, &ExportLayout::default()).unwrap();
    let prepared = Prepared::new(&export.records).unwrap();

    let totals: Vec<(u64, u64)> = Dimension::ALL
        .iter()
        .map(|d| {
            prepared
                .compare(&export.records, *d)
                .iter()
                .fold((0, 0), |(c, p), r| {
                    (c + r.current.total_users, p + r.previous.total_users)
                })
        })
        .collect();

    assert!(totals.iter().all(|t| *t == (930, 915)));
}

#[test]
fn test_full_pipeline() {
    let export = load_records(FIXTURE, &ExportLayout::default()).unwrap();
    let output_dir: PathBuf = std::env::temp_dir().join("ga4_wow_integration_run");
    let _ = fs::remove_dir_all(&output_dir);

    let config = RunConfig {
        output_dir: output_dir.clone(),
        dimensions: Dimension::ALL.to_vec(),
    };
    let RunOutcome::Completed(summary) = run(&export.records, &config).unwrap() else {
        panic!("expected a completed run");
    };

    assert!(summary.failed.is_empty());
    assert_eq!(summary.incomplete_weeks, 1);

    let channels = fs::read_to_string(output_dir.join("channels_week_over_week.csv")).unwrap();
    assert_eq!(channels.lines().count(), 5);
    assert!(channels.contains("Email,Week 2 vs Week 1,2024-01-08,2024-01-01,60,0,60,100.0"));

    let markdown = fs::read_to_string(output_dir.join(SUMMARY_FILE)).unwrap();
    assert!(markdown.contains("- **Week 2** (Jan 08 - Jan 14): Missing data for 1 day(s) - Jan 10"));
    assert!(markdown.contains("- **Email**: +60 users (+100.0%)"));
    assert!(markdown.contains("- **google / organic**: +20 users (+2.9%) | 18 key events"));
    assert!(markdown.contains("- **newsletter / email** → `/blog`: +60 users (+100.0%) | 0 conversions"));

    fs::remove_dir_all(&output_dir).unwrap();
}
