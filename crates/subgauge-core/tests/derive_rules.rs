//! Metric derivation rules.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::time::{Duration, Instant};

use chrono::{DateTime, TimeZone, Utc};

use subgauge_core::derive::{derive, derive_failed};
use subgauge_core::{ExtractedRecord, MetricsRecord, UpMetrics};

const GIB: i64 = 1024 * 1024 * 1024;
const DAY: i64 = 86_400;

fn new_year() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
}

fn record(downloaded: i64, uploaded: i64, quota: i64, expiry: i64) -> ExtractedRecord {
    ExtractedRecord {
        sid: "test123".into(),
        downloaded,
        uploaded,
        quota,
        expiry,
    }
}

fn up(rec: MetricsRecord) -> UpMetrics {
    match rec {
        MetricsRecord::Up(m) => m,
        MetricsRecord::Down(d) => panic!("expected up record, got down for {}", d.sid),
    }
}

#[test]
fn healthy_subscription_thirty_days_out() {
    let now = new_year();
    let start = Instant::now() - Duration::from_secs(5);
    let rec = record(100 * GIB, 20 * GIB, 500 * GIB, now.timestamp() + 30 * DAY);

    let m = up(derive(now, &rec, start));

    assert_eq!(m.sid, "test123");
    assert_eq!(m.used_bytes, 120 * GIB);
    assert_eq!(m.remaining_bytes, 380 * GIB);
    assert_eq!(m.used_ratio, 0.24);
    assert_eq!(m.remaining_ratio, 0.76);
    assert_eq!(m.seconds_until_expire, 30 * DAY);
    assert_eq!(m.days_until_expire, 30.0);
    assert_eq!(m.expired, 0);
    assert_eq!(m.daily_budget_bytes, (380 * GIB) as f64 / 30.0);

    assert_eq!(m.download_bytes, 100 * GIB);
    assert_eq!(m.upload_bytes, 20 * GIB);
    assert_eq!(m.quota_bytes, 500 * GIB);
    assert_eq!(m.expire_timestamp_seconds, now.timestamp() + 30 * DAY);

    assert_eq!(m.refresh.last_refresh_timestamp_seconds, now.timestamp() as f64);
    assert!(m.refresh.refresh_duration_seconds >= 5.0);
}

#[test]
fn over_quota_has_negative_remaining_and_no_budget() {
    let now = new_year();
    let rec = record(600 * GIB, 0, 500 * GIB, now.timestamp() + 10 * DAY);

    let m = up(derive(now, &rec, Instant::now()));

    assert_eq!(m.remaining_bytes, -100 * GIB);
    assert!(m.remaining_ratio < 0.0);
    assert_eq!(m.daily_budget_bytes, 0.0);
}

#[test]
fn expired_subscription() {
    let now = new_year();
    let rec = record(100 * GIB, 20 * GIB, 500 * GIB, now.timestamp() - DAY);

    let m = up(derive(now, &rec, Instant::now()));

    assert_eq!(m.expired, 1);
    assert_eq!(m.seconds_until_expire, -DAY);
    assert_eq!(m.days_until_expire, -1.0);
    assert_eq!(m.daily_budget_bytes, 0.0);
}

#[test]
fn budget_boundaries_are_exactly_zero() {
    let now = new_year();

    // remaining == 0
    let m = up(derive(now, &record(100 * GIB, 0, 100 * GIB, now.timestamp() + 10 * DAY), Instant::now()));
    assert_eq!(m.remaining_bytes, 0);
    assert_eq!(m.daily_budget_bytes, 0.0);

    // expiring this very second
    let m = up(derive(now, &record(GIB, 0, 100 * GIB, now.timestamp()), Instant::now()));
    assert_eq!(m.seconds_until_expire, 0);
    assert_eq!(m.days_until_expire, 0.0);
    assert_eq!(m.expired, 1);
    assert_eq!(m.daily_budget_bytes, 0.0);
}

#[test]
fn formulas_hold_across_a_grid() {
    let now = new_year();
    let t = now.timestamp();
    let usage = [0, 1, GIB, 250 * GIB, 999 * GIB];
    let quotas = [1, GIB, 500 * GIB];
    let offsets = [-30 * DAY, -1, 0, 1, DAY, 90 * DAY];

    for &down in &usage {
        for &upl in &usage {
            for &quota in &quotas {
                for &off in &offsets {
                    let m = up(derive(now, &record(down, upl, quota, t + off), Instant::now()));

                    let used = down + upl;
                    let remaining = quota - used;
                    assert_eq!(m.used_bytes, used);
                    assert_eq!(m.remaining_bytes, remaining);
                    assert_eq!(m.used_ratio, used as f64 / quota as f64);
                    assert_eq!(m.remaining_ratio, remaining as f64 / quota as f64);
                    assert_eq!(m.expired, i64::from(off <= 0));

                    let days = off as f64 / 86_400.0;
                    if remaining > 0 && days > 0.0 {
                        assert_eq!(m.daily_budget_bytes, remaining as f64 / days);
                    } else {
                        assert_eq!(m.daily_budget_bytes, 0.0);
                    }
                }
            }
        }
    }
}

#[test]
fn non_positive_quota_yields_zero_ratios() {
    let now = new_year();
    let m = up(derive(now, &record(10, 10, 0, now.timestamp() + DAY), Instant::now()));
    assert_eq!(m.used_ratio, 0.0);
    assert_eq!(m.remaining_ratio, 0.0);
}

#[test]
fn derive_is_repeatable_except_duration() {
    let now = new_year();
    let start = Instant::now();
    let rec = record(3 * GIB, GIB, 50 * GIB, now.timestamp() + 7 * DAY);

    let a = up(derive(now, &rec, start));
    std::thread::sleep(Duration::from_millis(2));
    let b = up(derive(now, &rec, start));

    assert!(b.refresh.refresh_duration_seconds >= a.refresh.refresh_duration_seconds);

    let mut b_aligned = b.clone();
    b_aligned.refresh.refresh_duration_seconds = a.refresh.refresh_duration_seconds;
    assert_eq!(a, b_aligned);
}

#[test]
fn out_of_range_inputs_saturate() {
    let now = new_year();

    let m = up(derive(now, &record(i64::MAX, 1, 10, now.timestamp() + DAY), Instant::now()));
    assert_eq!(m.used_bytes, i64::MAX);
    assert_eq!(m.remaining_bytes, 10 - i64::MAX);
    assert_eq!(m.daily_budget_bytes, 0.0);

    let m = up(derive(now, &record(1, 1, 10, i64::MIN), Instant::now()));
    assert_eq!(m.seconds_until_expire, i64::MIN);
    assert_eq!(m.expired, 1);
}

#[test]
fn failed_record_carries_only_sid_and_stamp() {
    let start = Instant::now() - Duration::from_secs(3);

    let rec = derive_failed("failed123", start);

    assert_eq!(rec.sid(), "failed123");
    assert!(!rec.is_up());
    assert!(rec.up().is_none());
    assert!(rec.refresh().last_refresh_timestamp_seconds > 0.0);
    assert!(rec.refresh().refresh_duration_seconds >= 3.0);
}
