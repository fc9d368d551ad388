//! Snapshot store: the last published `ResultSet`.
//!
//! Readers clone an `Arc` under a read lock and drop the lock immediately, so
//! a scrape never holds up the next publication. `replace` swaps the whole
//! set at once; a reader sees either the old set or the new one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};

use crate::record::ResultSet;

struct Published {
    records: Arc<ResultSet>,
    at: Option<DateTime<Utc>>,
}

pub struct SnapshotStore {
    current: RwLock<Published>,
    generation: AtomicU64,
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotStore {
    /// Empty store; nothing published yet.
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Published {
                records: Arc::new(ResultSet::new()),
                at: None,
            }),
            generation: AtomicU64::new(0),
        }
    }

    /// Immutable view of the current set.
    pub fn read(&self) -> Arc<ResultSet> {
        // A poisoned lock still holds a complete set; keep serving it.
        let g = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&g.records)
    }

    /// Publish `next`, fully replacing the previous set.
    pub fn replace(&self, next: ResultSet) -> Arc<ResultSet> {
        let next = Arc::new(next);
        let mut g = self.current.write().unwrap_or_else(PoisonError::into_inner);
        g.records = Arc::clone(&next);
        g.at = Some(Utc::now());
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        drop(g);

        tracing::debug!(generation, subscriptions = next.len(), "snapshot published");
        next
    }

    /// Number of publications so far (0 before the first cycle completes).
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Wall time of the last publication.
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .at
    }
}
