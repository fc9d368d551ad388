//! In-memory targets shared by refresh and exposition tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use subgauge_core::{SnapshotStore, TemplateExtractor};
use subgauge_exporter::fetch::{FetchError, Fetcher};
use subgauge_exporter::obs::ExporterMetrics;
use subgauge_exporter::refresh::Refresher;

pub const GIB: i64 = 1024 * 1024 * 1024;
/// 2100-01-01T00:00:00Z
pub const FAR_FUTURE: i64 = 4_102_444_800;

pub fn page(sid: &str, down: i64, up: i64, total: i64, expire: i64) -> String {
    format!(
        r#"<html><body><template id="subscription-data" data-sid="{sid}" data-downloadbyte="{down}" data-uploadbyte="{up}" data-totalbyte="{total}" data-expire="{expire}"></template></body></html>"#
    )
}

pub enum Reply {
    Page(String),
    Fail(FetchError),
    Slow(Duration, String),
    Panic,
}

/// Serves canned replies and tracks how many fetches overlap.
pub struct FakeFetcher {
    replies: HashMap<String, Reply>,
    delay: Duration,
    in_flight: AtomicUsize,
    pub peak: AtomicUsize,
    pub calls: AtomicUsize,
}

impl FakeFetcher {
    pub fn new(delay: Duration) -> Self {
        Self {
            replies: HashMap::new(),
            delay,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with(mut self, url: &str, reply: Reply) -> Self {
        self.replies.insert(url.to_string(), reply);
        self
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Fetcher for FakeFetcher {
    async fn fetch(&self, url: &str, _deadline: Duration) -> Result<Bytes, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = InFlight(&self.in_flight);
        self.peak.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match self.replies.get(url) {
            Some(Reply::Page(body)) => Ok(Bytes::from(body.clone())),
            Some(Reply::Fail(e)) => Err(e.clone()),
            Some(Reply::Slow(d, body)) => {
                tokio::time::sleep(*d).await;
                Ok(Bytes::from(body.clone()))
            }
            Some(Reply::Panic) => panic!("fake fetcher asked to panic for {url}"),
            None => Err(FetchError::Status(404)),
        }
    }
}

pub struct Harness {
    pub fetcher: Arc<FakeFetcher>,
    pub store: Arc<SnapshotStore>,
    pub metrics: Arc<ExporterMetrics>,
    pub refresher: Arc<Refresher>,
}

pub fn harness(fetcher: FakeFetcher, concurrency: usize) -> Harness {
    let fetcher = Arc::new(fetcher);
    let store = Arc::new(SnapshotStore::new());
    let metrics = Arc::new(ExporterMetrics::default());
    let refresher = Refresher::new(
        fetcher.clone(),
        Arc::new(TemplateExtractor::new()),
        Arc::clone(&store),
        Arc::clone(&metrics),
    )
    .with_concurrency(concurrency);

    Harness {
        fetcher,
        store,
        metrics,
        refresher: Arc::new(refresher),
    }
}

pub fn urls(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}
