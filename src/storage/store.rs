//! Key/value store for one cross-reference kind.
//!
//! Values are sets of byte strings encoded as newline-delimited lists, one
//! trailing newline per item. Writes go through [`CrossRefStore::merge`],
//! which unions new values with whatever the store already holds, so
//! re-indexing never loses previously stored entries.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;

use redb::{Database, ReadableTable, TableDefinition};

use crate::error::{IndexError, IndexResult};
use crate::types::StoreKind;

const XREFS: TableDefinition<&[u8], &[u8]> = TableDefinition::new("xrefs");

/// Per-store outcome of one synchronization round.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncStats {
    /// Keys drained from the accumulator.
    pub keys: usize,
    /// Keys actually written.
    pub puts: usize,
    /// Keys skipped because the store already held every new value.
    pub skipped: usize,
}

/// One backing database, keyed by store kind under the engine root.
pub struct CrossRefStore {
    db: Database,
    kind: StoreKind,
}

impl CrossRefStore {
    /// Open the backing database for `kind` under `root`, creating it if
    /// missing.
    pub fn open(root: &Path, kind: StoreKind) -> IndexResult<Self> {
        let path = root.join(kind.file_name());
        let db = Database::create(&path)
            .map_err(|source| IndexError::StoreOpen { kind, path, source })?;
        Ok(Self { db, kind })
    }

    /// Read the value set stored under `key`.
    ///
    /// Missing keys (and a store that has never been written) read as the
    /// empty set. Empty items in the stored list are discarded.
    pub fn read_values(&self, key: &[u8]) -> IndexResult<HashSet<Vec<u8>>> {
        let txn = self.db.begin_read().map_err(|e| self.sync_err(e.into()))?;
        let table = match txn.open_table(XREFS) {
            Ok(table) => table,
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(HashSet::new()),
            Err(e) => return Err(self.sync_err(e.into())),
        };
        let Some(guard) = table.get(key).map_err(|e| self.sync_err(e.into()))? else {
            return Ok(HashSet::new());
        };
        Ok(decode_values(guard.value()))
    }

    /// Merge `entries` into the store inside a single write transaction.
    ///
    /// For each key the existing value set is read back and unioned with the
    /// new values; keys whose new values are all present already are skipped
    /// without a write. The commit is atomic.
    pub fn merge(
        &self,
        entries: &HashMap<Vec<u8>, HashSet<Vec<u8>>>,
    ) -> IndexResult<SyncStats> {
        let mut stats = SyncStats::default();
        let txn = self.db.begin_write().map_err(|e| self.sync_err(e.into()))?;
        {
            let mut table = txn.open_table(XREFS).map_err(|e| self.sync_err(e.into()))?;
            for (key, values) in entries {
                stats.keys += 1;

                let existing = match table
                    .get(key.as_slice())
                    .map_err(|e| self.sync_err(e.into()))?
                {
                    Some(guard) => decode_values(guard.value()),
                    None => HashSet::new(),
                };
                if values.is_subset(&existing) {
                    stats.skipped += 1;
                    continue;
                }

                let merged: BTreeSet<&[u8]> = existing
                    .iter()
                    .chain(values.iter())
                    .map(|v| v.as_slice())
                    .collect();
                let encoded = encode_values(&merged);
                table
                    .insert(key.as_slice(), encoded.as_slice())
                    .map_err(|e| self.sync_err(e.into()))?;
                stats.puts += 1;
            }
        }
        txn.commit().map_err(|e| self.sync_err(e.into()))?;
        Ok(stats)
    }

    fn sync_err(&self, source: redb::Error) -> IndexError {
        IndexError::StoreSync {
            kind: self.kind,
            source,
        }
    }
}

fn encode_values(values: &BTreeSet<&[u8]>) -> Vec<u8> {
    let mut out = Vec::new();
    for value in values {
        out.extend_from_slice(value);
        out.push(b'\n');
    }
    out
}

fn decode_values(bytes: &[u8]) -> HashSet<Vec<u8>> {
    bytes
        .split(|&b| b == b'\n')
        .filter(|item| !item.is_empty())
        .map(|item| item.to_vec())
        .collect()
}
