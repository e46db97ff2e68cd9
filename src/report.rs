//! Markdown executive summary.

use std::collections::BTreeMap;
use std::fmt::Write;

use chrono::{NaiveDate, NaiveDateTime};

use crate::analyzers::compare::comparison_label;
use crate::analyzers::dimension::{Dimension, split_composite};
use crate::analyzers::highlight::{
    engagement_improvements, key_event_increases, strongest_overall, top_decliners, top_gainers,
};
use crate::analyzers::types::{ComparisonRow, MissingDateInfo, Week};

/// Everything the summary is rendered from.
pub struct SummaryInput<'a> {
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub generated_at: NaiveDateTime,
    pub weeks: &'a [Week],
    pub completeness: &'a [MissingDateInfo],
    pub tables: &'a BTreeMap<Dimension, Vec<ComparisonRow>>,
}

pub fn build_executive_summary(input: &SummaryInput) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# GA4 Week-over-Week Executive Summary");
    let _ = writeln!(output);
    let _ = writeln!(
        output,
        "**Analysis Period:** {} - {}",
        input.first_date.format("%B %d, %Y"),
        input.last_date.format("%B %d, %Y")
    );
    let _ = writeln!(output);
    let _ = writeln!(
        output,
        "**Report Generated:** {}",
        input.generated_at.format("%Y-%m-%d %H:%M:%S")
    );

    write_completeness_notice(&mut output, input.completeness);

    let _ = writeln!(output);
    let _ = writeln!(output, "---");
    let _ = writeln!(output);
    let _ = writeln!(output, "## Overall Performance");

    for pair in input.weeks.windows(2) {
        write_week_pair(&mut output, input, &pair[0], &pair[1]);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Key Insights");
    write_key_insights(&mut output, input.tables);

    output
}

fn is_incomplete(completeness: &[MissingDateInfo], week: &Week) -> bool {
    completeness
        .iter()
        .any(|info| info.week.index == week.index && !info.is_complete())
}

fn write_completeness_notice(output: &mut String, completeness: &[MissingDateInfo]) {
    let incomplete: Vec<_> = completeness.iter().filter(|i| !i.is_complete()).collect();
    if incomplete.is_empty() {
        return;
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "⚠️ **Data Completeness Notice:**");
    let _ = writeln!(output);
    for info in incomplete {
        let dates: Vec<String> = info
            .missing_dates
            .iter()
            .map(|d| d.format("%b %d").to_string())
            .collect();
        let _ = writeln!(
            output,
            "- **{}** ({} - {}): Missing data for {} day(s) - {}",
            info.week.label(),
            info.week.start.format("%b %d"),
            info.week.end().format("%b %d"),
            info.missing_dates.len(),
            dates.join(", ")
        );
    }
    let _ = writeln!(output);
    let _ = writeln!(
        output,
        "*Note: Comparisons involving incomplete weeks should be interpreted with caution.*"
    );
}

fn write_week_pair(output: &mut String, input: &SummaryInput, previous: &Week, current: &Week) {
    let label = comparison_label(current, previous);

    let _ = writeln!(output);
    let _ = writeln!(output, "### {label}");
    let _ = writeln!(output);
    let _ = writeln!(
        output,
        "**Period:** {} - {} vs {} - {}",
        current.start.format("%b %d"),
        current.end().format("%b %d"),
        previous.start.format("%b %d"),
        previous.end().format("%b %d")
    );

    if is_incomplete(input.completeness, previous) || is_incomplete(input.completeness, current) {
        let _ = writeln!(output);
        let _ = writeln!(
            output,
            "⚠️ *This comparison includes incomplete week(s) - see Data Completeness Notice above.*"
        );
    }

    for (dimension, rows) in input.tables {
        let pair_rows: Vec<ComparisonRow> = rows
            .iter()
            .filter(|r| r.comparison == label)
            .cloned()
            .collect();
        if pair_rows.is_empty() {
            continue;
        }

        let _ = writeln!(output);
        let _ = writeln!(output, "#### {}", dimension.heading());
        let _ = writeln!(output);
        write_movers(output, *dimension, &pair_rows);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "---");
}

fn write_movers(output: &mut String, dimension: Dimension, rows: &[ComparisonRow]) {
    let policy = dimension.highlight_policy();
    let gainers = top_gainers(rows, policy);

    if gainers.is_empty() {
        let _ = writeln!(output, "_No rows above the traffic threshold this week._");
        return;
    }

    let title = match dimension {
        Dimension::Channel => "Biggest User Increases",
        Dimension::SourceMedium => "Biggest Traffic Increases",
        Dimension::LandingPage => "Highest Traffic Growth Pages",
        Dimension::LandingPageSourceMedium => "Highest Growth Combinations",
        Dimension::LandingPageChannel => "Highest Growth Channel Combinations",
    };
    let _ = writeln!(output, "**{title}:**");
    for row in gainers {
        let _ = writeln!(output, "- {}", mover_line(dimension, row));
    }

    if dimension == Dimension::Channel {
        let _ = writeln!(output);
        let _ = writeln!(output, "**Biggest User Decreases:**");
        for row in top_decliners(rows, policy) {
            let _ = writeln!(output, "- {}", mover_line(dimension, row));
        }
    }
}

fn mover_line(dimension: Dimension, row: &ComparisonRow) -> String {
    let change = format!(
        "{} users ({:+.1}%)",
        signed_thousands(row.users_change),
        row.users_change_pct
    );

    match dimension {
        Dimension::Channel => format!("**{}**: {change}", row.key),
        Dimension::SourceMedium => format!(
            "**{}**: {change} | {} key events",
            row.key, row.current.key_events
        ),
        Dimension::LandingPage => format!("`{}`: {change}", row.key),
        Dimension::LandingPageSourceMedium | Dimension::LandingPageChannel => {
            let (page, other) = split_composite(&row.key).unwrap_or((row.key.as_str(), ""));
            let mut line = format!("**{other}** → `{page}`: {change}");
            if dimension == Dimension::LandingPageSourceMedium {
                let _ = write!(line, " | {} conversions", row.current.key_events);
            }
            line
        }
    }
}

fn write_key_insights(output: &mut String, tables: &BTreeMap<Dimension, Vec<ComparisonRow>>) {
    if let Some(channels) = tables.get(&Dimension::Channel) {
        let _ = writeln!(output);
        let _ = writeln!(output, "### Traffic Trends");
        let _ = writeln!(output);
        let _ = writeln!(output, "**Strongest Performing Channels (Overall):**");
        for overall in strongest_overall(channels) {
            let _ = writeln!(
                output,
                "- {}: {} users, {:+} key events",
                overall.key,
                signed_thousands(overall.users_change),
                overall.key_events_change
            );
        }
    }

    let Some(sources) = tables.get(&Dimension::SourceMedium) else {
        return;
    };

    let _ = writeln!(output);
    let _ = writeln!(output, "### Engagement Patterns");
    let improvements = engagement_improvements(sources);
    if !improvements.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "**Biggest Engagement Rate Improvements:**");
        for row in improvements {
            let _ = writeln!(
                output,
                "- {}: {:+.2}% change in engagement",
                row.key,
                row.engagement_change * 100.0
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "### Conversion Highlights");
    let increases = key_event_increases(sources);
    if !increases.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "**Top Key Event Increases:**");
        for row in increases {
            let _ = writeln!(
                output,
                "- {}: {:+} key events ({:+.1}%)",
                row.key, row.key_events_change, row.key_events_change_pct
            );
        }
    }
}

/// `+1,234` / `-56` style integer.
fn signed_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let sign = if value < 0 { '-' } else { '+' };
    format!("{sign}{grouped}")
}
