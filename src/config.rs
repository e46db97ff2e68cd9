//! Run configuration: export layout and the dimensions to report on.
//!
//! Stored as a JSON object on disk; every field is optional:
//! ```json
//! {
//!   "layout": {
//!     "comment_rows": 6,
//!     "skip_total_row": true,
//!     "columns": { "channel": "Session default channel group" }
//!   },
//!   "dimensions": ["channel", "source_medium"]
//! }
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::analyzers::dimension::Dimension;

/// Header names of the export columns the loader reads.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub channel: String,
    pub source_medium: String,
    pub landing_page: String,
    pub date: String,
    pub total_users: String,
    pub key_events: String,
    pub engagement_rate: String,
    pub key_event_rate: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        ColumnNames {
            channel: "Session Payscale Custom Channels".into(),
            source_medium: "Session source / medium".into(),
            landing_page: "Page path and screen class".into(),
            date: "Date".into(),
            total_users: "Total users".into(),
            key_events: "Key events".into(),
            engagement_rate: "Engagement rate".into(),
            key_event_rate: "User key event rate".into(),
        }
    }
}

/// Shape of the CSV export around the data rows.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExportLayout {
    /// Comment lines before the header row.
    pub comment_rows: usize,
    /// Whether the first row after the header is a grand total.
    pub skip_total_row: bool,
    pub columns: ColumnNames,
}

impl Default for ExportLayout {
    fn default() -> Self {
        ExportLayout {
            comment_rows: 6,
            skip_total_row: true,
            columns: ColumnNames::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub layout: ExportLayout,
    pub dimensions: Vec<Dimension>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        AnalyzerConfig {
            layout: ExportLayout::default(),
            dimensions: Dimension::ALL.to_vec(),
        }
    }
}

impl AnalyzerConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {path}"))?;
        Self::from_json(&content).with_context(|| format!("invalid config file {path}"))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Loads `path` when given, otherwise falls back to the defaults.
    pub fn load_or_default(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
