use chrono::NaiveDate;
use serde::Serialize;

/// Metric values for a single export row. `None` means the export cell was
/// empty or not a number.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Metrics {
    pub total_users: Option<u64>,
    pub key_events: Option<u64>,
    pub engagement_rate: Option<f64>,
    pub key_event_rate: Option<f64>,
}

/// One row of the export: a day and the dimension values it was reported under.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub channel: String,
    pub source_medium: String,
    pub landing_page: String,
    pub metrics: Metrics,
}

impl DailyRecord {
    pub fn new(date: NaiveDate) -> Self {
        DailyRecord {
            date,
            ..Default::default()
        }
    }

    pub fn with_channel(mut self, channel: &str) -> Self {
        self.channel = channel.to_string();
        self
    }

    pub fn with_source_medium(mut self, source_medium: &str) -> Self {
        self.source_medium = source_medium.to_string();
        self
    }

    pub fn with_landing_page(mut self, landing_page: &str) -> Self {
        self.landing_page = landing_page.to_string();
        self
    }

    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn users(&self) -> u64 {
        self.metrics.total_users.unwrap_or(0)
    }

    pub fn key_events(&self) -> u64 {
        self.metrics.key_events.unwrap_or(0)
    }

    pub fn engagement_rate(&self) -> f64 {
        self.metrics.engagement_rate.unwrap_or(0.0)
    }

    pub fn key_event_rate(&self) -> f64 {
        self.metrics.key_event_rate.unwrap_or(0.0)
    }
}

impl Metrics {
    pub fn new(total_users: u64, key_events: u64, engagement_rate: f64, key_event_rate: f64) -> Self {
        Metrics {
            total_users: Some(total_users),
            key_events: Some(key_events),
            engagement_rate: Some(engagement_rate),
            key_event_rate: Some(key_event_rate),
        }
    }

    pub fn users(total_users: u64) -> Self {
        Metrics {
            total_users: Some(total_users),
            ..Default::default()
        }
    }
}
