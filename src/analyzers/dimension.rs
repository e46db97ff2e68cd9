//! Grouping keys for the weekly reports.
//!
//! Every report runs through the same pipeline; a [`Dimension`] only decides
//! how a record is turned into its grouping key and how the result is labelled.

use serde::Deserialize;

use crate::analyzers::highlight::HighlightPolicy;
use crate::record::DailyRecord;

/// Bucket for records whose dimension value is empty.
pub const UNKNOWN_KEY: &str = "(unknown)";

/// Joins the two halves of a composite key. Values that already contain it
/// cannot be split back apart unambiguously.
pub const COMPOSITE_SEPARATOR: &str = " | ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Channel,
    SourceMedium,
    LandingPage,
    LandingPageSourceMedium,
    LandingPageChannel,
}

impl Dimension {
    pub const ALL: [Dimension; 5] = [
        Dimension::Channel,
        Dimension::SourceMedium,
        Dimension::LandingPage,
        Dimension::LandingPageSourceMedium,
        Dimension::LandingPageChannel,
    ];

    /// Grouping key of `record` under this dimension.
    pub fn key(&self, record: &DailyRecord) -> String {
        match self {
            Dimension::Channel => atom(&record.channel),
            Dimension::SourceMedium => atom(&record.source_medium),
            Dimension::LandingPage => atom(&record.landing_page),
            Dimension::LandingPageSourceMedium => {
                composite(&record.landing_page, &record.source_medium)
            }
            Dimension::LandingPageChannel => composite(&record.landing_page, &record.channel),
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(
            self,
            Dimension::LandingPageSourceMedium | Dimension::LandingPageChannel
        )
    }

    /// Header of the key column in the CSV table.
    pub fn column_label(&self) -> &'static str {
        match self {
            Dimension::Channel => "Channel",
            Dimension::SourceMedium => "Source / Medium",
            Dimension::LandingPage => "Landing Page",
            Dimension::LandingPageSourceMedium => "Landing Page | Source / Medium",
            Dimension::LandingPageChannel => "Landing Page | Channel",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            Dimension::Channel => "channels_week_over_week.csv",
            Dimension::SourceMedium => "source_medium_week_over_week.csv",
            Dimension::LandingPage => "landing_pages_week_over_week.csv",
            Dimension::LandingPageSourceMedium => "landing_page_source_week_over_week.csv",
            Dimension::LandingPageChannel => "landing_page_channel_week_over_week.csv",
        }
    }

    pub fn heading(&self) -> &'static str {
        match self {
            Dimension::Channel => "Top Channel Changes",
            Dimension::SourceMedium => "Top Source/Medium Changes",
            Dimension::LandingPage => "Top Landing Page Changes",
            Dimension::LandingPageSourceMedium => "Top Landing Page + Source/Medium Combinations",
            Dimension::LandingPageChannel => "Top Landing Page + Channel Combinations",
        }
    }

    /// How many rows to highlight and the minimum current-week users a row needs.
    pub fn highlight_policy(&self) -> HighlightPolicy {
        match self {
            Dimension::Channel => HighlightPolicy {
                count: 3,
                min_current_users: None,
            },
            Dimension::SourceMedium => HighlightPolicy {
                count: 5,
                min_current_users: Some(100),
            },
            Dimension::LandingPage
            | Dimension::LandingPageSourceMedium
            | Dimension::LandingPageChannel => HighlightPolicy {
                count: 5,
                min_current_users: Some(50),
            },
        }
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Dimension::Channel => "channel",
            Dimension::SourceMedium => "source_medium",
            Dimension::LandingPage => "landing_page",
            Dimension::LandingPageSourceMedium => "landing_page_source_medium",
            Dimension::LandingPageChannel => "landing_page_channel",
        };
        f.write_str(name)
    }
}

fn atom(value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        UNKNOWN_KEY.to_string()
    } else {
        value.to_string()
    }
}

fn composite(first: &str, second: &str) -> String {
    format!("{}{}{}", atom(first), COMPOSITE_SEPARATOR, atom(second))
}

/// Splits a composite key back into its two parts.
pub fn split_composite(key: &str) -> Option<(&str, &str)> {
    key.rsplit_once(COMPOSITE_SEPARATOR)
}
