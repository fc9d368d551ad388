//! Refresh orchestrator.
//!
//! One cycle fans out a task per target, gated by a semaphore of
//! `concurrency` permits, and fans back in to a mutex-guarded accumulator.
//! The snapshot store is replaced only after every task has finished, so a
//! reader never sees a half-refreshed set.
//!
//! Insert order across tasks is unspecified. When two targets report the
//! same sid, whichever task takes the accumulator lock last wins; the
//! collision is logged and counted, not treated as an error.

mod schedule;
mod unit;

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use futures_util::stream::FuturesUnordered;
use futures_util::StreamExt;
use tokio::sync::Semaphore;

use subgauge_core::{Extractor, FailureKind, MetricsRecord, ResultSet, SnapshotStore};

use crate::fetch::Fetcher;
use crate::obs::ExporterMetrics;

pub use schedule::run_schedule;

pub const DEFAULT_FETCH_CONCURRENCY: usize = 4;
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Records written during one cycle. One lock per insert.
#[derive(Default)]
pub(crate) struct Accumulator {
    records: Mutex<ResultSet>,
}

impl Accumulator {
    /// Insert `record`; returns true if it replaced an entry with the same sid.
    pub(crate) fn insert(&self, record: MetricsRecord) -> bool {
        let mut g = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        g.insert(record.sid().to_owned(), record).is_some()
    }

    fn take(&self) -> ResultSet {
        let mut g = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *g)
    }
}

/// Drives refresh cycles and publishes into a `SnapshotStore`.
pub struct Refresher {
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn Extractor>,
    store: Arc<SnapshotStore>,
    metrics: Arc<ExporterMetrics>,
    concurrency: usize,
    fetch_timeout: Duration,
}

impl Refresher {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        extractor: Arc<dyn Extractor>,
        store: Arc<SnapshotStore>,
        metrics: Arc<ExporterMetrics>,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            store,
            metrics,
            concurrency: DEFAULT_FETCH_CONCURRENCY,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    /// Maximum fetches in flight at once (at least 1).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn store(&self) -> Arc<SnapshotStore> {
        Arc::clone(&self.store)
    }

    /// Attempt every target exactly once, then publish the result.
    ///
    /// Never fails: per-target errors leave no entry (or a `Down` entry for
    /// a rejected quota with a known sid).
    pub async fn run_cycle(&self, targets: &[String]) -> Arc<ResultSet> {
        let cycle_start = Instant::now();
        tracing::info!(targets = targets.len(), "starting refresh cycle");

        let acc = Arc::new(Accumulator::default());
        let gate = Arc::new(Semaphore::new(self.concurrency));

        let mut units: FuturesUnordered<_> = targets
            .iter()
            .map(|url| {
                let work = unit::Unit {
                    url: url.clone(),
                    fetcher: Arc::clone(&self.fetcher),
                    extractor: Arc::clone(&self.extractor),
                    metrics: Arc::clone(&self.metrics),
                    acc: Arc::clone(&acc),
                    deadline: self.fetch_timeout,
                    cycle_start,
                };
                let gate = Arc::clone(&gate);
                let handle = tokio::spawn(async move {
                    // The gate is never closed; a failed acquire would mean no slot ever frees.
                    let Ok(_permit) = gate.acquire_owned().await else { return; };
                    work.run().await;
                });
                let url = url.clone();
                async move { (url, handle.await) }
            })
            .collect();

        while let Some((url, joined)) = units.next().await {
            if let Err(e) = joined {
                tracing::error!(url = %url, error = %e, "refresh task aborted");
                self.metrics.record_failure(FailureKind::Panic);
            }
        }

        let published = self.store.replace(acc.take());
        let elapsed = cycle_start.elapsed();
        self.metrics.record_cycle(elapsed, published.len());

        tracing::info!(
            elapsed_ms = elapsed.as_millis() as u64,
            subscriptions = published.len(),
            "refresh cycle completed"
        );
        published
    }
}
