//! Metric derivation.
//!
//! Both functions are infallible. Guarding (quota > 0) happens before a
//! record reaches `derive`; a rejected quota goes to `derive_failed`.

use std::time::Instant;

use chrono::{DateTime, Utc};

use crate::record::{DownMetrics, ExtractedRecord, MetricsRecord, RefreshStamp, UpMetrics};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Derive the full `Up` record for `record` as of `now`.
///
/// The refresh duration is read from the monotonic clock against
/// `cycle_start`, so two calls with the same inputs differ only there.
pub fn derive(now: DateTime<Utc>, record: &ExtractedRecord, cycle_start: Instant) -> MetricsRecord {
    let now_secs = now.timestamp();

    // Saturating: a lax extractor may hand over sums that do not fit.
    let used_bytes = record.downloaded.saturating_add(record.uploaded);
    let remaining_bytes = record.quota.saturating_sub(used_bytes);

    let (used_ratio, remaining_ratio) = if record.quota > 0 {
        let quota = record.quota as f64;
        (used_bytes as f64 / quota, remaining_bytes as f64 / quota)
    } else {
        (0.0, 0.0)
    };

    let seconds_until_expire = record.expiry.saturating_sub(now_secs);
    let days_until_expire = seconds_until_expire as f64 / SECONDS_PER_DAY;
    let expired = i64::from(seconds_until_expire <= 0);

    // Zero, never negative or infinite, for expired or exhausted subscriptions.
    let daily_budget_bytes = if days_until_expire > 0.0 && remaining_bytes > 0 {
        remaining_bytes as f64 / days_until_expire
    } else {
        0.0
    };

    MetricsRecord::Up(UpMetrics {
        sid: record.sid.clone(),
        download_bytes: record.downloaded,
        upload_bytes: record.uploaded,
        quota_bytes: record.quota,
        expire_timestamp_seconds: record.expiry,
        used_bytes,
        remaining_bytes,
        used_ratio,
        remaining_ratio,
        seconds_until_expire,
        days_until_expire,
        expired,
        daily_budget_bytes,
        refresh: RefreshStamp {
            last_refresh_timestamp_seconds: now_secs as f64,
            refresh_duration_seconds: cycle_start.elapsed().as_secs_f64(),
        },
    })
}

/// `Down` record for a sid whose page was found but rejected.
pub fn derive_failed(sid: &str, cycle_start: Instant) -> MetricsRecord {
    MetricsRecord::Down(DownMetrics {
        sid: sid.to_owned(),
        refresh: RefreshStamp {
            last_refresh_timestamp_seconds: Utc::now().timestamp() as f64,
            refresh_duration_seconds: cycle_start.elapsed().as_secs_f64(),
        },
    })
}
