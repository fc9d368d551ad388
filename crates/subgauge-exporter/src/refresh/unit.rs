//! Work for a single target within a cycle.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;

use subgauge_core::derive::{derive, derive_failed};
use subgauge_core::extract::body_preview;
use subgauge_core::{Extractor, FailureKind};

use super::Accumulator;
use crate::fetch::Fetcher;
use crate::obs::ExporterMetrics;

pub(super) struct Unit {
    pub url: String,
    pub fetcher: Arc<dyn Fetcher>,
    pub extractor: Arc<dyn Extractor>,
    pub metrics: Arc<ExporterMetrics>,
    pub acc: Arc<Accumulator>,
    pub deadline: Duration,
    pub cycle_start: Instant,
}

impl Unit {
    pub(super) async fn run(self) {
        let url = self.url.as_str();

        let body = match self.fetcher.fetch(url, self.deadline).await {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(url = %url, kind = e.kind().as_str(), status = ?e.status(), error = %e, "fetch failed");
                self.metrics.record_failure(e.kind());
                return;
            }
        };

        let record = match self.extractor.extract(&body) {
            Ok(rec) if rec.quota <= 0 => {
                tracing::warn!(url = %url, sid = %rec.sid, quota = rec.quota, "validation failed: quota must be positive");
                self.metrics.record_failure(FailureKind::Validation);
                derive_failed(&rec.sid, self.cycle_start)
            }
            Ok(rec) => derive(Utc::now(), &rec, self.cycle_start),
            Err(e) => match e.rejected_sid() {
                Some(sid) => {
                    tracing::warn!(url = %url, sid = %sid, error = %e, "validation failed");
                    self.metrics.record_failure(e.kind());
                    derive_failed(sid, self.cycle_start)
                }
                None => {
                    tracing::warn!(
                        url = %url,
                        kind = e.kind().as_str(),
                        error = %e,
                        preview = %body_preview(&body),
                        "failed to extract subscription data"
                    );
                    self.metrics.record_failure(e.kind());
                    return;
                }
            },
        };

        let sid = record.sid().to_owned();
        let up = record.is_up();
        if self.acc.insert(record) {
            tracing::warn!(url = %url, sid = %sid, "sid appears in multiple targets, last write wins");
            self.metrics.sid_collisions.inc(&[]);
        }
        if up {
            tracing::debug!(url = %url, sid = %sid, "target refreshed");
        }
    }
}
