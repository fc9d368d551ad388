//! Exporter self-metrics.
//!
//! Counter/gauge types with dynamic labels backed by `DashMap`. Labels are
//! flattened into sorted key vectors to keep deterministic ordering.

use dashmap::DashMap;
use std::fmt::Write;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use subgauge_core::FailureKind;

/// Escape a label value for the text exposition format.
pub(crate) fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

type LabelKey = Vec<(String, String)>;

fn label_key(labels: &[(&str, &str)]) -> LabelKey {
    let mut key: LabelKey = labels
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    key.sort();
    key
}

fn label_str(key: &LabelKey) -> String {
    if key.is_empty() {
        return String::new();
    }
    let inner = key
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
        .collect::<Vec<_>>()
        .join(",");
    format!("{{{inner}}}")
}

fn sorted<V>(map: &DashMap<LabelKey, V>, read: impl Fn(&V) -> String) -> Vec<(LabelKey, String)> {
    let mut rows: Vec<_> = map.iter().map(|r| (r.key().clone(), read(r.value()))).collect();
    rows.sort_by(|a, b| a.0.cmp(&b.0));
    rows
}

#[derive(Default)]
pub struct CounterVec {
    map: DashMap<LabelKey, AtomicU64>,
}

impl CounterVec {
    /// Increment by 1.
    pub fn inc(&self, labels: &[(&str, &str)]) {
        self.add(labels, 1);
    }

    /// Increment by an arbitrary value.
    pub fn add(&self, labels: &[(&str, &str)], v: u64) {
        let counter = self
            .map
            .entry(label_key(labels))
            .or_insert_with(|| AtomicU64::new(0));
        counter.fetch_add(v, Ordering::Relaxed);
    }

    /// Current value for one label set (0 if never touched).
    pub fn get(&self, labels: &[(&str, &str)]) -> u64 {
        self.map
            .get(&label_key(labels))
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    fn render(&self, name: &str, help: &str, out: &mut String) {
        let _ = writeln!(out, "# HELP {name} {help}");
        let _ = writeln!(out, "# TYPE {name} counter");
        for (key, val) in sorted(&self.map, |c| c.load(Ordering::Relaxed).to_string()) {
            let _ = writeln!(out, "{}{} {}", name, label_str(&key), val);
        }
    }
}

/// Float gauge (stored as `f64` bits).
#[derive(Default)]
pub struct GaugeVec {
    map: DashMap<LabelKey, AtomicU64>,
}

impl GaugeVec {
    pub fn set(&self, labels: &[(&str, &str)], v: f64) {
        let gauge = self
            .map
            .entry(label_key(labels))
            .or_insert_with(|| AtomicU64::new(0));
        gauge.store(v.to_bits(), Ordering::Relaxed);
    }

    pub fn get(&self, labels: &[(&str, &str)]) -> Option<f64> {
        self.map
            .get(&label_key(labels))
            .map(|g| f64::from_bits(g.load(Ordering::Relaxed)))
    }

    fn render(&self, name: &str, help: &str, out: &mut String) {
        let _ = writeln!(out, "# HELP {name} {help}");
        let _ = writeln!(out, "# TYPE {name} gauge");
        for (key, val) in sorted(&self.map, |g| f64::from_bits(g.load(Ordering::Relaxed)).to_string()) {
            let _ = writeln!(out, "{}{} {}", name, label_str(&key), val);
        }
    }
}

#[derive(Default)]
pub struct ExporterMetrics {
    pub refresh_cycles: CounterVec,
    pub target_failures: CounterVec,
    pub sid_collisions: CounterVec,
    pub subscriptions: GaugeVec,
    pub last_cycle_seconds: GaugeVec,
    draining: AtomicBool,
}

impl ExporterMetrics {
    /// Mark draining state.
    pub fn set_draining(&self) {
        self.draining.store(true, Ordering::Relaxed);
    }
    /// Return whether draining is active.
    pub fn is_draining(&self) -> bool {
        self.draining.load(Ordering::Relaxed)
    }

    pub fn record_failure(&self, kind: FailureKind) {
        self.target_failures.inc(&[("kind", kind.as_str())]);
    }

    pub fn failures(&self, kind: FailureKind) -> u64 {
        self.target_failures.get(&[("kind", kind.as_str())])
    }

    pub fn record_cycle(&self, elapsed: Duration, subscriptions: usize) {
        self.refresh_cycles.inc(&[]);
        self.last_cycle_seconds.set(&[], elapsed.as_secs_f64());
        self.subscriptions.set(&[], subscriptions as f64);
    }

    /// Append all self-metrics to `out`.
    pub fn render(&self, out: &mut String) {
        self.refresh_cycles.render(
            "xui_exporter_refresh_cycles_total",
            "Completed refresh cycles",
            out,
        );
        self.target_failures.render(
            "xui_exporter_target_failures_total",
            "Targets that produced no up record, by failure kind",
            out,
        );
        self.sid_collisions.render(
            "xui_exporter_sid_collisions_total",
            "Records overwritten because two targets reported the same sid",
            out,
        );
        self.subscriptions.render(
            "xui_exporter_subscriptions",
            "Subscriptions in the last published snapshot",
            out,
        );
        self.last_cycle_seconds.render(
            "xui_exporter_last_refresh_cycle_seconds",
            "Wall time of the last refresh cycle",
            out,
        );

        let _ = writeln!(
            out,
            "# HELP xui_exporter_draining Whether the exporter is shutting down\n# TYPE xui_exporter_draining gauge\nxui_exporter_draining {}",
            u8::from(self.is_draining())
        );
    }
}
