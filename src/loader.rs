//! CSV loader for GA4 exploration exports.
//!
//! The export starts with a block of `#` comment lines, then the header row,
//! then a grand-total row, then one row per dimension combination and day.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::{debug, info, warn};

use crate::config::ExportLayout;
use crate::record::{DailyRecord, Metrics};

/// Clean records plus bookkeeping about what was thrown away.
#[derive(Debug, Default)]
pub struct LoadedExport {
    pub records: Vec<DailyRecord>,
    pub rejected_rows: usize,
}

impl LoadedExport {
    /// Earliest and latest record date, if any records were loaded.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.records.iter().map(|r| r.date).min()?;
        let max = self.records.iter().map(|r| r.date).max()?;
        Some((min, max))
    }
}

/// Column positions resolved against the header row.
struct ColumnIndex {
    date: usize,
    channel: Option<usize>,
    source_medium: Option<usize>,
    landing_page: Option<usize>,
    total_users: Option<usize>,
    key_events: Option<usize>,
    engagement_rate: Option<usize>,
    key_event_rate: Option<usize>,
}

impl ColumnIndex {
    fn resolve(headers: &StringRecord, layout: &ExportLayout) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name.trim());
        let columns = &layout.columns;

        let Some(date) = find(&columns.date) else {
            bail!(
                "export header has no `{}` column (found: {})",
                columns.date,
                headers.iter().collect::<Vec<_>>().join(", ")
            );
        };

        let index = ColumnIndex {
            date,
            channel: find(&columns.channel),
            source_medium: find(&columns.source_medium),
            landing_page: find(&columns.landing_page),
            total_users: find(&columns.total_users),
            key_events: find(&columns.key_events),
            engagement_rate: find(&columns.engagement_rate),
            key_event_rate: find(&columns.key_event_rate),
        };

        for (name, position) in [
            (&columns.channel, index.channel),
            (&columns.source_medium, index.source_medium),
            (&columns.landing_page, index.landing_page),
            (&columns.total_users, index.total_users),
            (&columns.key_events, index.key_events),
            (&columns.engagement_rate, index.engagement_rate),
            (&columns.key_event_rate, index.key_event_rate),
        ] {
            if position.is_none() {
                warn!(column = %name, "Export column missing, values will be treated as unknown");
            }
        }

        Ok(index)
    }
}

/// Reads a GA4 export from `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or has no usable header.
#[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_records(path: impl AsRef<Path>, layout: &ExportLayout) -> Result<LoadedExport> {
    let path = path.as_ref();
    let file =
        File::open(path).with_context(|| format!("failed to open export {}", path.display()))?;
    load_records_from_reader(file, layout)
}

/// Reads a GA4 export from any byte source.
pub fn load_records_from_reader<R: Read>(mut reader: R, layout: &ExportLayout) -> Result<LoadedExport> {
    let mut content = String::new();
    reader
        .read_to_string(&mut content)
        .context("export is not valid UTF-8 text")?;

    let content = content.strip_prefix('\u{feff}').unwrap_or(&content);
    let body = skip_lines(content, layout.comment_rows);

    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(body.as_bytes());

    let headers = rdr.headers().context("failed to read export header row")?.clone();
    if headers.is_empty() {
        bail!("export has no header row after {} comment rows", layout.comment_rows);
    }
    let index = ColumnIndex::resolve(&headers, layout)?;

    let mut export = LoadedExport::default();

    for (position, result) in rdr.records().enumerate() {
        if layout.skip_total_row && position == 0 {
            continue;
        }

        let row = match result {
            Ok(row) => row,
            Err(e) => {
                debug!(error = %e, "Unreadable export row");
                export.rejected_rows += 1;
                continue;
            }
        };

        match parse_row(&row, &index) {
            Some(record) => export.records.push(record),
            None => export.rejected_rows += 1,
        }
    }

    if export.rejected_rows > 0 {
        warn!(rejected = export.rejected_rows, "Dropped export rows with invalid dates");
    }
    info!(rows = export.records.len(), "Export loaded");

    Ok(export)
}

fn parse_row(row: &StringRecord, index: &ColumnIndex) -> Option<DailyRecord> {
    let date = parse_date(row.get(index.date)?)?;
    let text = |column: Option<usize>| {
        column
            .and_then(|c| row.get(c))
            .unwrap_or_default()
            .to_string()
    };
    let number = |column: Option<usize>| column.and_then(|c| row.get(c)).and_then(parse_number);

    Some(DailyRecord {
        date,
        channel: text(index.channel),
        source_medium: text(index.source_medium),
        landing_page: text(index.landing_page),
        metrics: Metrics {
            total_users: number(index.total_users).and_then(to_count),
            key_events: number(index.key_events).and_then(to_count),
            engagement_rate: number(index.engagement_rate),
            key_event_rate: number(index.key_event_rate),
        },
    })
}

fn skip_lines(content: &str, count: usize) -> &str {
    let mut rest = content;
    for _ in 0..count {
        match rest.find('\n') {
            Some(end) => rest = &rest[end + 1..],
            None => return "",
        }
    }
    rest
}

/// Parses `YYYYMMDD`, falling back to `YYYY-MM-DD`.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    let value = value.strip_suffix(".0").unwrap_or(value);
    NaiveDate::parse_from_str(value, "%Y%m%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y-%m-%d"))
        .ok()
}

fn parse_number(value: &str) -> Option<f64> {
    let cleaned: String = value.trim().chars().filter(|c| *c != ',').collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn to_count(value: f64) -> Option<u64> {
    (value >= 0.0).then(|| value.round() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPORT: &str = "\
# ----------------------------------------
# Weekly channels
# Account: Example
# Property: Example
# Start date: 20240101
# End date: 20240114
Session Payscale Custom Channels,Session source / medium,Page path and screen class,Date,Total users,Key events,Engagement rate,User key event rate
,,,,\"1,240\",31,0.61,0.02
Organic Search,google / organic,/pricing,20240101,120,4,0.55,0.03
Paid Search,google / cpc,/,20240102,\"1,000\",12,0.40,0.01
Email,,/blog,not-a-date,5,0,0.1,0
Direct,(direct) / (none),/,2024-01-03,,n/a,0.72,
";

    #[test]
    fn test_skips_comments_and_total_row() {
        let export = load_records_from_reader(EXPORT.as_bytes(), &ExportLayout::default()).unwrap();

        assert_eq!(export.records.len(), 3);
        assert_eq!(export.records[0].channel, "Organic Search");
        assert_eq!(export.records[0].users(), 120);
    }

    #[test]
    fn test_invalid_dates_are_rejected_and_counted() {
        let export = load_records_from_reader(EXPORT.as_bytes(), &ExportLayout::default()).unwrap();

        assert_eq!(export.rejected_rows, 1);
        assert!(export.records.iter().all(|r| r.channel != "Email"));
    }

    #[test]
    fn test_numeric_coercion() {
        let export = load_records_from_reader(EXPORT.as_bytes(), &ExportLayout::default()).unwrap();

        let paid = &export.records[1];
        assert_eq!(paid.metrics.total_users, Some(1000));
        assert_eq!(paid.metrics.engagement_rate, Some(0.40));

        let direct = &export.records[2];
        assert_eq!(direct.date, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
        assert_eq!(direct.metrics.total_users, None);
        assert_eq!(direct.metrics.key_events, None);
        assert_eq!(direct.metrics.key_event_rate, None);
    }

    #[test]
    fn test_date_range() {
        let export = load_records_from_reader(EXPORT.as_bytes(), &ExportLayout::default()).unwrap();

        assert_eq!(
            export.date_range(),
            Some((
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 3).unwrap()
            ))
        );
    }

    #[test]
    fn test_missing_date_column_fails() {
        let layout = ExportLayout {
            comment_rows: 0,
            ..Default::default()
        };
        let result = load_records_from_reader("Channel,Total users\nEmail,3\n".as_bytes(), &layout);

        assert!(result.is_err());
    }

    #[test]
    fn test_missing_dimension_column_is_tolerated() {
        let layout = ExportLayout {
            comment_rows: 0,
            skip_total_row: false,
            ..Default::default()
        };
        let csv = "Date,Total users\n20240101,7\n";
        let export = load_records_from_reader(csv.as_bytes(), &layout).unwrap();

        assert_eq!(export.records.len(), 1);
        assert_eq!(export.records[0].channel, "");
        assert_eq!(export.records[0].users(), 7);
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 2, 29);
        assert_eq!(parse_date("20240229"), expected);
        assert_eq!(parse_date("2024-02-29"), expected);
        assert_eq!(parse_date("20240229.0"), expected);
        assert_eq!(parse_date("20230229"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_negative_counts_are_unknown() {
        assert_eq!(to_count(-3.0), None);
        assert_eq!(to_count(2.6), Some(3));
    }
}
