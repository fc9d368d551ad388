//! subgauge core: subscription records, metric derivation, page extraction,
//! and the snapshot store shared between the refresher and the exporter.
//!
//! This crate carries no async runtime or HTTP dependencies. The exporter
//! crate supplies fetching, scheduling, and exposition on top of it.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! A malformed subscription page must surface as `ExtractError`, never as a
//! crashed refresh task.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod derive;
pub mod error;
pub mod extract;
pub mod record;
pub mod snapshot;

/// Shared result type.
pub use error::{FailureKind, Result, SubgaugeError};
pub use extract::{ExtractError, Extractor, TemplateExtractor};
pub use record::{DownMetrics, ExtractedRecord, MetricsRecord, RefreshStamp, ResultSet, UpMetrics};
pub use snapshot::SnapshotStore;
