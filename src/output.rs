//! Output formatting and persistence for comparison tables.
//!
//! Numbers are rounded here and nowhere else: percentages to 2 decimals,
//! rates to 4 decimals, half away from zero.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use csv::WriterBuilder;
use serde::Serialize;
use tracing::{debug, info};

use crate::analyzers::dimension::Dimension;
use crate::analyzers::types::ComparisonRow;
use crate::analyzers::utility::round_to;

const PCT_PLACES: i32 = 2;
const RATE_PLACES: i32 = 4;

/// Columns after the dimension key, in file order.
const COLUMNS: &[&str] = &[
    "Week_Comparison",
    "Current_Week",
    "Previous_Week",
    "Total users_current",
    "Total users_previous",
    "Users_Change",
    "Users_Change_Pct",
    "Key events_current",
    "Key events_previous",
    "Key_Events_Change",
    "Key_Events_Change_Pct",
    "Engagement rate_current",
    "Engagement rate_previous",
    "Engagement_Change",
    "User key event rate_current",
    "User key event rate_previous",
];

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    key: &'a str,
    comparison: &'a str,
    current_week: String,
    previous_week: String,
    users_current: u64,
    users_previous: u64,
    users_change: i64,
    users_change_pct: f64,
    key_events_current: u64,
    key_events_previous: u64,
    key_events_change: i64,
    key_events_change_pct: f64,
    engagement_current: f64,
    engagement_previous: f64,
    engagement_change: f64,
    key_event_rate_current: f64,
    key_event_rate_previous: f64,
}

impl<'a> From<&'a ComparisonRow> for CsvRow<'a> {
    fn from(row: &'a ComparisonRow) -> Self {
        CsvRow {
            key: &row.key,
            comparison: &row.comparison,
            current_week: row.current_week.format("%Y-%m-%d").to_string(),
            previous_week: row.previous_week.format("%Y-%m-%d").to_string(),
            users_current: row.current.total_users,
            users_previous: row.previous.total_users,
            users_change: row.users_change,
            users_change_pct: round_to(row.users_change_pct, PCT_PLACES),
            key_events_current: row.current.key_events,
            key_events_previous: row.previous.key_events,
            key_events_change: row.key_events_change,
            key_events_change_pct: round_to(row.key_events_change_pct, PCT_PLACES),
            engagement_current: round_to(row.current.engagement_rate, RATE_PLACES),
            engagement_previous: round_to(row.previous.engagement_rate, RATE_PLACES),
            engagement_change: round_to(row.engagement_change, RATE_PLACES),
            key_event_rate_current: round_to(row.current.key_event_rate, RATE_PLACES),
            key_event_rate_previous: round_to(row.previous.key_event_rate, RATE_PLACES),
        }
    }
}

/// Writes the comparison table of `dimension` as CSV, replacing any existing file.
#[tracing::instrument(skip_all, fields(path = %path.display(), dimension = %dimension, rows = rows.len()))]
pub fn write_comparison_csv(path: &Path, dimension: Dimension, rows: &[ComparisonRow]) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    let mut header = vec![dimension.column_label()];
    header.extend_from_slice(COLUMNS);
    writer.write_record(&header)?;

    for row in rows {
        writer.serialize(CsvRow::from(row))?;
    }
    writer.flush()?;

    info!("Saved comparison table");
    Ok(())
}

/// Writes a text file, creating parent directories as needed.
pub fn write_text(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    debug!(path = %path.display(), bytes = contents.len(), "Writing text file");
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
