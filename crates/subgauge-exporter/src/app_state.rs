//! Shared application state for the exporter.
//!
//! Owns the snapshot store and wires it to both sides: the refresher that
//! publishes into it and the collector that renders it for scrapes.

use std::sync::Arc;

use subgauge_core::error::Result;
use subgauge_core::{SnapshotStore, TemplateExtractor};

use crate::config::ExporterConfig;
use crate::fetch::{Fetcher, HttpFetcher};
use crate::obs::{ExporterMetrics, SubscriptionCollector};
use crate::refresh::Refresher;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    refresher: Arc<Refresher>,
}

struct AppStateInner {
    cfg: ExporterConfig,
    targets: Arc<[String]>,
    store: Arc<SnapshotStore>,
    metrics: Arc<ExporterMetrics>,
    collector: SubscriptionCollector,
}

impl AppState {
    /// Build application state with the HTTP fetcher.
    /// Returns Result so main can handle errors gracefully (no panic).
    pub fn new(cfg: ExporterConfig) -> Result<Self> {
        let fetcher = HttpFetcher::new()?;
        Ok(Self::with_fetcher(cfg, Arc::new(fetcher)))
    }

    /// Build application state around any `Fetcher`.
    pub fn with_fetcher(cfg: ExporterConfig, fetcher: Arc<dyn Fetcher>) -> Self {
        let store = Arc::new(SnapshotStore::new());
        let metrics = Arc::new(ExporterMetrics::default());
        let collector = SubscriptionCollector::new(Arc::clone(&store));

        let refresher = Refresher::new(
            fetcher,
            Arc::new(TemplateExtractor::new()),
            Arc::clone(&store),
            Arc::clone(&metrics),
        )
        .with_concurrency(cfg.exporter.fetch_concurrency)
        .with_fetch_timeout(cfg.exporter.fetch_timeout());

        let targets: Arc<[String]> = cfg.targets.clone().into();

        Self {
            inner: Arc::new(AppStateInner {
                cfg,
                targets,
                store,
                metrics,
                collector,
            }),
            refresher: Arc::new(refresher),
        }
    }

    pub fn cfg(&self) -> &ExporterConfig {
        &self.inner.cfg
    }

    pub fn targets(&self) -> Arc<[String]> {
        Arc::clone(&self.inner.targets)
    }

    pub fn refresher(&self) -> Arc<Refresher> {
        Arc::clone(&self.refresher)
    }

    pub fn store(&self) -> Arc<SnapshotStore> {
        Arc::clone(&self.inner.store)
    }

    pub fn metrics(&self) -> Arc<ExporterMetrics> {
        Arc::clone(&self.inner.metrics)
    }

    pub fn is_draining(&self) -> bool {
        self.inner.metrics.is_draining()
    }

    pub fn set_draining(&self) {
        self.inner.metrics.set_draining();
    }

    /// Ready once a snapshot has been published and until draining starts.
    pub fn is_ready(&self) -> bool {
        !self.is_draining() && self.inner.store.generation() > 0
    }

    /// Full metrics page: subscription gauges, then exporter self-metrics.
    pub fn render_metrics(&self) -> String {
        let mut out = String::new();
        self.inner.collector.render(&mut out);
        self.inner.metrics.render(&mut out);
        out
    }
}
