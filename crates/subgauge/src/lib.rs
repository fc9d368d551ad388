//! subgauge: x-ui subscription usage as Prometheus gauges.
//!
//! `core` holds the page extractor, metric derivation, and snapshot store;
//! `exporter` adds the HTTP fetcher, refresh orchestrator, and `/metrics`
//! service.

pub mod core {
    pub use subgauge_core::*;
}

pub mod exporter {
    pub use subgauge_exporter::*;
}
