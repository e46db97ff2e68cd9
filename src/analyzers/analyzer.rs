use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use tracing::{error, info, warn};

use crate::analyzers::aggregate::aggregate_weekly;
use crate::analyzers::compare::compare_weeks;
use crate::analyzers::dimension::Dimension;
use crate::analyzers::types::{ComparisonRow, MissingDateInfo, Week};
use crate::analyzers::week::{check_missing_dates, partition_weeks};
use crate::output::{write_comparison_csv, write_text};
use crate::record::DailyRecord;
use crate::report::{SummaryInput, build_executive_summary};

pub const SUMMARY_FILE: &str = "executive_summary.md";

/// Week layout of a record set, computed once and shared by every dimension.
#[derive(Debug, Clone)]
pub struct Prepared {
    pub weeks: Vec<Week>,
    pub completeness: Vec<MissingDateInfo>,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
}

impl Prepared {
    /// Partitions `records` into weeks and checks each week for missing dates.
    ///
    /// Returns `None` for an empty record set.
    pub fn new(records: &[DailyRecord]) -> Option<Self> {
        let first_date = records.iter().map(|r| r.date).min()?;
        let last_date = records.iter().map(|r| r.date).max()?;
        let weeks = partition_weeks(records);
        let completeness = check_missing_dates(records, &weeks);

        Some(Prepared {
            weeks,
            completeness,
            first_date,
            last_date,
        })
    }

    pub fn can_compare(&self) -> bool {
        self.weeks.len() >= 2
    }

    /// Week-over-week table for one dimension across all adjacent week pairs.
    pub fn compare(&self, records: &[DailyRecord], dimension: Dimension) -> Vec<ComparisonRow> {
        let table = aggregate_weekly(records, &self.weeks, dimension);
        compare_weeks(&table, &self.weeks)
    }

    /// Completeness entries for weeks that are missing at least one date.
    pub fn incomplete_weeks(&self) -> impl Iterator<Item = &MissingDateInfo> {
        self.completeness.iter().filter(|info| !info.is_complete())
    }
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub output_dir: PathBuf,
    pub dimensions: Vec<Dimension>,
}

#[derive(Debug)]
pub enum RunOutcome {
    /// Fewer than two weeks of data; nothing was written.
    InsufficientWeeks { found: usize },
    Completed(RunSummary),
}

#[derive(Debug)]
pub struct RunSummary {
    pub weeks: Vec<Week>,
    pub incomplete_weeks: usize,
    pub written: Vec<PathBuf>,
    pub failed: Vec<(Dimension, String)>,
}

/// Runs every configured dimension and writes the tables plus the summary.
///
/// A dimension that fails is logged and skipped; the others still run.
#[tracing::instrument(skip_all, fields(records = records.len(), output_dir = %config.output_dir.display()))]
pub fn run(records: &[DailyRecord], config: &RunConfig) -> Result<RunOutcome> {
    let prepared = match Prepared::new(records) {
        Some(prepared) if prepared.can_compare() => prepared,
        other => {
            let found = other.map_or(0, |p| p.weeks.len());
            warn!(found, "Need at least 2 weeks of data for comparison");
            return Ok(RunOutcome::InsufficientWeeks { found });
        }
    };

    fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("failed to create {}", config.output_dir.display()))?;

    let mut tables = BTreeMap::new();
    let mut written = Vec::new();
    let mut failed = Vec::new();

    for &dimension in &config.dimensions {
        let path = config.output_dir.join(dimension.file_name());
        match process_dimension(&prepared, records, dimension, &path) {
            Ok(rows) => {
                tables.insert(dimension, rows);
                written.push(path);
            }
            Err(e) => {
                error!(dimension = %dimension, error = %e, "Dimension report failed");
                failed.push((dimension, format!("{e:#}")));
            }
        }
    }

    let summary = build_executive_summary(&SummaryInput {
        first_date: prepared.first_date,
        last_date: prepared.last_date,
        generated_at: Local::now().naive_local(),
        weeks: &prepared.weeks,
        completeness: &prepared.completeness,
        tables: &tables,
    });
    let summary_path = config.output_dir.join(SUMMARY_FILE);
    write_text(&summary_path, &summary)?;
    info!(path = %summary_path.display(), "Saved executive summary");
    written.push(summary_path);

    Ok(RunOutcome::Completed(RunSummary {
        incomplete_weeks: prepared.incomplete_weeks().count(),
        weeks: prepared.weeks,
        written,
        failed,
    }))
}

#[tracing::instrument(skip_all, fields(dimension = %dimension))]
fn process_dimension(
    prepared: &Prepared,
    records: &[DailyRecord],
    dimension: Dimension,
    path: &Path,
) -> Result<Vec<ComparisonRow>> {
    info!("Generating dimension analysis");
    let rows = prepared.compare(records, dimension);
    write_comparison_csv(path, dimension, &rows)?;
    Ok(rows)
}
