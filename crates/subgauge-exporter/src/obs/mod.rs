//! Prometheus text exposition.
//!
//! `collector` renders subscription gauges from the snapshot store;
//! `metrics` holds the exporter's own counters. Both write into one buffer
//! served by the metrics handler.

pub mod collector;
pub mod metrics;

pub use collector::SubscriptionCollector;
pub use metrics::ExporterMetrics;
