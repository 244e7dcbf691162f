//! In-memory accumulation of multi-valued associations.
//!
//! An [`Accumulator`] maps a byte-string key to an unordered set of
//! byte-string values. Jobs build job-local accumulators while traversing a
//! translation unit and merge them into the engine's shared ones; the
//! synchronizer drains the shared ones into the backing stores.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use crate::types::StoreKind;

/// Multi-valued map: key -> set of values.
///
/// Insertion is additive and values are never removed except by draining
/// the whole accumulator. Empty values are rejected on insert.
#[derive(Debug, Default)]
pub struct Accumulator {
    entries: HashMap<Vec<u8>, HashSet<Vec<u8>>>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `value` to the set stored under `key`.
    ///
    /// Returns whether the value was newly added. Empty values are rejected.
    pub fn insert(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> bool {
        let value = value.into();
        if value.is_empty() {
            return false;
        }
        self.entries.entry(key.into()).or_default().insert(value)
    }

    /// Union every entry of `other` into `self`, draining `other`.
    pub fn merge_from(&mut self, other: &mut Accumulator) {
        for (key, values) in other.entries.drain() {
            self.entries.entry(key).or_default().extend(values);
        }
    }

    /// Take a snapshot of all entries, leaving the accumulator empty.
    pub fn drain(&mut self) -> HashMap<Vec<u8>, HashSet<Vec<u8>>> {
        std::mem::take(&mut self.entries)
    }

    pub fn get(&self, key: &[u8]) -> Option<&HashSet<Vec<u8>>> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Vec<u8>, &HashSet<Vec<u8>>)> {
        self.entries.iter()
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// An accumulator behind its own mutex.
///
/// Each store kind has exactly one of these; no cross-accumulator invariants
/// exist, so holders never take two locks at once.
#[derive(Debug, Default)]
pub struct SharedAccumulator {
    inner: Mutex<Accumulator>,
}

impl SharedAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a single association, holding the lock for just this insert.
    pub fn insert(&self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> bool {
        self.lock().insert(key, value)
    }

    /// Merge a job-local accumulator in, draining it.
    pub fn merge_from(&self, other: &mut Accumulator) {
        self.lock().merge_from(other);
    }

    pub fn lock(&self) -> MutexGuard<'_, Accumulator> {
        self.inner.lock().unwrap()
    }
}

/// The four shared accumulators, one per store kind.
#[derive(Debug, Default)]
pub struct AccumulatorSet {
    pub includes: SharedAccumulator,
    pub definitions: SharedAccumulator,
    pub references: SharedAccumulator,
    pub symbols: SharedAccumulator,
}

impl AccumulatorSet {
    pub fn for_kind(&self, kind: StoreKind) -> &SharedAccumulator {
        match kind {
            StoreKind::Include => &self.includes,
            StoreKind::Definition => &self.definitions,
            StoreKind::Reference => &self.references,
            StoreKind::Symbol => &self.symbols,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_is_additive() {
        let mut acc = Accumulator::new();
        assert!(acc.insert(b"k".as_slice(), b"v1".as_slice()));
        assert!(acc.insert(b"k".as_slice(), b"v2".as_slice()));
        // Re-inserting an existing value is a no-op
        assert!(!acc.insert(b"k".as_slice(), b"v1".as_slice()));

        let values = acc.get(b"k").unwrap();
        assert_eq!(values.len(), 2);
        assert!(values.contains(b"v1".as_slice()));
        assert!(values.contains(b"v2".as_slice()));
    }

    #[test]
    fn empty_values_are_rejected() {
        let mut acc = Accumulator::new();
        assert!(!acc.insert(b"k".as_slice(), b"".as_slice()));
        assert!(acc.is_empty());
    }

    #[test]
    fn merge_from_unions_and_drains() {
        let mut dst = Accumulator::new();
        dst.insert(b"k".as_slice(), b"v1".as_slice());

        let mut src = Accumulator::new();
        src.insert(b"k".as_slice(), b"v2".as_slice());
        src.insert(b"other".as_slice(), b"v3".as_slice());

        dst.merge_from(&mut src);

        assert!(src.is_empty(), "merge should drain the source");
        assert_eq!(dst.get(b"k").unwrap().len(), 2);
        assert_eq!(dst.get(b"other").unwrap().len(), 1);
    }

    #[test]
    fn merge_union_is_order_independent() {
        let build = |pairs: &[(&[u8], &[u8])]| {
            let mut acc = Accumulator::new();
            for (key, value) in pairs {
                acc.insert(*key, *value);
            }
            acc
        };
        let left: &[(&[u8], &[u8])] = &[(b"k", b"v1"), (b"shared", b"a")];
        let right: &[(&[u8], &[u8])] = &[(b"k", b"v2"), (b"shared", b"a"), (b"only", b"b")];

        let mut forward = build(left);
        let mut forward_src = build(right);
        forward.merge_from(&mut forward_src);

        let mut reverse = build(right);
        let mut reverse_src = build(left);
        reverse.merge_from(&mut reverse_src);

        assert_eq!(
            forward.drain(),
            reverse.drain(),
            "merging in either direction must produce the same union"
        );
    }

    #[test]
    fn drain_leaves_empty() {
        let mut acc = Accumulator::new();
        acc.insert(b"k".as_slice(), b"v".as_slice());

        let snapshot = acc.drain();
        assert_eq!(snapshot.len(), 1);
        assert!(acc.is_empty());
    }

    #[test]
    fn shared_accumulator_insert_under_lock() {
        let shared = SharedAccumulator::new();
        shared.insert(b"k".as_slice(), b"v".as_slice());

        let mut local = Accumulator::new();
        local.insert(b"k".as_slice(), b"w".as_slice());
        shared.merge_from(&mut local);

        assert_eq!(shared.lock().get(b"k").unwrap().len(), 2);
    }
}
