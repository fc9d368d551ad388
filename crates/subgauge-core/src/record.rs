//! Subscription records.
//!
//! `ExtractedRecord` is what a page yields; `MetricsRecord` is what gets
//! published. A `Down` record has no usage fields at all, so the exporter
//! cannot accidentally render them as real zeros.

use std::collections::BTreeMap;

/// Usage data read from one subscription page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedRecord {
    /// Subscription id (`data-sid`), never empty.
    pub sid: String,
    /// Downloaded bytes, >= 0.
    pub downloaded: i64,
    /// Uploaded bytes, >= 0.
    pub uploaded: i64,
    /// Total quota in bytes.
    pub quota: i64,
    /// Expiry as Unix epoch seconds.
    pub expiry: i64,
}

/// When a record was finalized, and how far into its cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefreshStamp {
    pub last_refresh_timestamp_seconds: f64,
    pub refresh_duration_seconds: f64,
}

/// Full metrics for a subscription that scraped and validated cleanly.
#[derive(Debug, Clone, PartialEq)]
pub struct UpMetrics {
    pub sid: String,

    pub download_bytes: i64,
    pub upload_bytes: i64,
    pub quota_bytes: i64,
    pub expire_timestamp_seconds: i64,

    pub used_bytes: i64,
    /// quota - used; negative when over quota.
    pub remaining_bytes: i64,
    pub used_ratio: f64,
    pub remaining_ratio: f64,
    pub seconds_until_expire: i64,
    pub days_until_expire: f64,
    /// 1 when expired, else 0.
    pub expired: i64,
    pub daily_budget_bytes: f64,

    pub refresh: RefreshStamp,
}

/// A known subscription that failed validation this cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct DownMetrics {
    pub sid: String,
    pub refresh: RefreshStamp,
}

/// Published unit of state, keyed by sid.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricsRecord {
    Up(UpMetrics),
    Down(DownMetrics),
}

impl MetricsRecord {
    pub fn sid(&self) -> &str {
        match self {
            MetricsRecord::Up(m) => &m.sid,
            MetricsRecord::Down(m) => &m.sid,
        }
    }

    pub fn is_up(&self) -> bool {
        matches!(self, MetricsRecord::Up(_))
    }

    pub fn refresh(&self) -> RefreshStamp {
        match self {
            MetricsRecord::Up(m) => m.refresh,
            MetricsRecord::Down(m) => m.refresh,
        }
    }

    /// Usage metrics, present only for `Up` records.
    pub fn up(&self) -> Option<&UpMetrics> {
        match self {
            MetricsRecord::Up(m) => Some(m),
            MetricsRecord::Down(_) => None,
        }
    }
}

/// One cycle's records, at most one per sid. Ordered so exposition is stable.
pub type ResultSet = BTreeMap<String, MetricsRecord>;
