//! subgauge exporter library entry.
//!
//! Wires config, fetching, the refresh orchestrator, and Prometheus
//! exposition into one HTTP service. Consumed by the binary (`main.rs`) and
//! by integration tests.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod app_state;
pub mod config;
pub mod fetch;
pub mod obs;
pub mod ops;
pub mod refresh;
pub mod router;
