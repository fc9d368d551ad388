//! Subscription gauges rendered from the current snapshot.
//!
//! One snapshot is read per scrape. `up` is always emitted; the refresh
//! stamp only when positive; everything else only for `Up` records, since a
//! `Down` record has no usage fields to report.

use std::fmt::Write;
use std::sync::Arc;

use subgauge_core::{MetricsRecord, ResultSet, SnapshotStore, UpMetrics};

use super::metrics::escape_label;

type Sample = fn(&MetricsRecord) -> Option<f64>;

struct Family {
    name: &'static str,
    help: &'static str,
    sample: Sample,
}

fn positive(v: f64) -> Option<f64> {
    (v > 0.0).then_some(v)
}

fn up_only(r: &MetricsRecord, f: impl Fn(&UpMetrics) -> f64) -> Option<f64> {
    r.up().map(f)
}

fn families() -> [Family; 15] {
    [
        Family {
            name: "xui_subscription_up",
            help: "Whether the subscription was successfully scraped and parsed (1=success, 0=failure)",
            sample: |r| Some(if r.is_up() { 1.0 } else { 0.0 }),
        },
        Family {
            name: "xui_subscription_last_refresh_timestamp_seconds",
            help: "Timestamp of the last refresh attempt completion",
            sample: |r| positive(r.refresh().last_refresh_timestamp_seconds),
        },
        Family {
            name: "xui_subscription_refresh_duration_seconds",
            help: "Duration of the last refresh attempt in seconds",
            sample: |r| positive(r.refresh().refresh_duration_seconds),
        },
        Family {
            name: "xui_subscription_download_bytes",
            help: "Downloaded bytes for the subscription",
            sample: |r| up_only(r, |m| m.download_bytes as f64),
        },
        Family {
            name: "xui_subscription_upload_bytes",
            help: "Uploaded bytes for the subscription",
            sample: |r| up_only(r, |m| m.upload_bytes as f64),
        },
        Family {
            name: "xui_subscription_quota_bytes",
            help: "Total quota bytes for the subscription",
            sample: |r| up_only(r, |m| m.quota_bytes as f64),
        },
        Family {
            name: "xui_subscription_expire_timestamp_seconds",
            help: "Expiration timestamp in Unix epoch seconds",
            sample: |r| up_only(r, |m| m.expire_timestamp_seconds as f64),
        },
        Family {
            name: "xui_subscription_used_bytes",
            help: "Total used bytes (download + upload)",
            sample: |r| up_only(r, |m| m.used_bytes as f64),
        },
        Family {
            name: "xui_subscription_remaining_bytes",
            help: "Remaining bytes (quota - used, can be negative)",
            sample: |r| up_only(r, |m| m.remaining_bytes as f64),
        },
        Family {
            name: "xui_subscription_used_ratio",
            help: "Used bytes ratio (used / quota)",
            sample: |r| up_only(r, |m| m.used_ratio),
        },
        Family {
            name: "xui_subscription_remaining_ratio",
            help: "Remaining bytes ratio (remaining / quota)",
            sample: |r| up_only(r, |m| m.remaining_ratio),
        },
        Family {
            name: "xui_subscription_seconds_until_expire",
            help: "Seconds until expiration (can be negative if expired)",
            sample: |r| up_only(r, |m| m.seconds_until_expire as f64),
        },
        Family {
            name: "xui_subscription_days_until_expire",
            help: "Days until expiration (seconds_until_expire / 86400)",
            sample: |r| up_only(r, |m| m.days_until_expire),
        },
        Family {
            name: "xui_subscription_expired",
            help: "Whether the subscription has expired (1=expired, 0=active)",
            sample: |r| up_only(r, |m| m.expired as f64),
        },
        Family {
            name: "xui_subscription_daily_budget_bytes",
            help: "Average daily budget bytes from now until expiration (remaining / days_until_expire)",
            sample: |r| up_only(r, |m| m.daily_budget_bytes),
        },
    ]
}

/// Reads the snapshot store on demand and renders it.
#[derive(Clone)]
pub struct SubscriptionCollector {
    store: Arc<SnapshotStore>,
}

impl SubscriptionCollector {
    pub fn new(store: Arc<SnapshotStore>) -> Self {
        Self { store }
    }

    /// Render the current snapshot in Prometheus text exposition format.
    pub fn render(&self, out: &mut String) {
        let snapshot = self.store.read();
        render_set(&snapshot, out);
    }
}

/// Render `set`; families without any sample are omitted.
pub fn render_set(set: &ResultSet, out: &mut String) {
    for family in families() {
        let mut header = false;
        for (sid, record) in set {
            let Some(v) = (family.sample)(record) else { continue; };
            if !header {
                let _ = writeln!(out, "# HELP {} {}", family.name, family.help);
                let _ = writeln!(out, "# TYPE {} gauge", family.name);
                header = true;
            }
            let _ = writeln!(out, "{}{{sid=\"{}\"}} {}", family.name, escape_label(sid), v);
        }
    }
}
