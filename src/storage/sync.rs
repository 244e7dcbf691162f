//! Batched durable synchronization of accumulators into their stores.

use std::path::PathBuf;

use tracing::{debug, warn};

use crate::error::IndexResult;
use crate::storage::{AccumulatorSet, CrossRefStore, SharedAccumulator, SyncStats};
use crate::types::StoreKind;

/// Drains the shared accumulators into their backing stores.
///
/// Each store kind syncs independently: a failure on one store does not
/// affect the others. When the backing database cannot be opened the
/// accumulator is left untouched so the data is retried on the next round.
#[derive(Debug)]
pub struct Synchronizer {
    root: PathBuf,
}

impl Synchronizer {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Sync a single store kind.
    ///
    /// The accumulator mutex is held for the whole round, so the drained
    /// snapshot is atomic with respect to concurrent job merges.
    pub fn sync_store(
        &self,
        kind: StoreKind,
        accumulator: &SharedAccumulator,
    ) -> IndexResult<SyncStats> {
        let store = CrossRefStore::open(&self.root, kind)?;

        let mut guard = accumulator.lock();
        if guard.is_empty() {
            return Ok(SyncStats::default());
        }
        let entries = guard.drain();
        let stats = store.merge(&entries)?;
        drop(guard);

        Ok(stats)
    }

    /// Sync all four stores, logging per-store outcomes.
    pub fn sync_all(&self, accumulators: &AccumulatorSet) {
        debug!("syncing stores under {}", self.root.display());
        for kind in StoreKind::ALL {
            match self.sync_store(kind, accumulators.for_kind(kind)) {
                Ok(stats) => debug!(
                    "synced {kind}: {} keys, {} puts, {} skipped",
                    stats.keys, stats.puts, stats.skipped
                ),
                Err(e) => warn!("sync of {kind} failed: {e}"),
            }
        }
    }
}
