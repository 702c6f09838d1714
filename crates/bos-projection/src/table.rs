// crates/bos-projection/src/table.rs
// ============================================================================
// Module: BOS Projection Table
// Description: Reusable thread-safe keyed map engines fold events into.
// Purpose: Avoid every engine re-deriving the same `Mutex<BTreeMap<K, V>>`
//          boilerplate for its read model (§9 "Projection storage": "any
//          storage that supports the determinism property").
// Dependencies: std::collections, std::sync
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Mutex;

/// A thread-safe, deterministically-ordered keyed projection table.
///
/// Each engine's projection store wraps one or more of these, one per
/// indexed read model (e.g. inventory stock keyed by `(item, location)`,
/// journal balances keyed by account code).
#[derive(Debug)]
pub struct ProjectionTable<K, V> {
    rows: Mutex<BTreeMap<K, V>>,
}

impl<K, V> Default for ProjectionTable<K, V>
where
    K: Ord,
{
    fn default() -> Self {
        Self { rows: Mutex::new(BTreeMap::new()) }
    }
}

impl<K, V> ProjectionTable<K, V>
where
    K: Ord + Clone,
    V: Clone,
{
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a clone of the row at `key`, if present.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<V> {
        self.rows.lock().unwrap_or_else(std::sync::PoisonError::into_inner).get(key).cloned()
    }

    /// Returns every row, in key order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<(K, V)> {
        self.rows
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Applies `update` to the row at `key`, inserting `default()` first if absent.
    pub fn update_or_insert(&self, key: K, default: impl FnOnce() -> V, update: impl FnOnce(&mut V)) {
        let mut rows = self.rows.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let entry = rows.entry(key).or_insert_with(default);
        update(entry);
    }

    /// Unconditionally replaces (or inserts) the row at `key`.
    pub fn set(&self, key: K, value: V) {
        self.rows.lock().unwrap_or_else(std::sync::PoisonError::into_inner).insert(key, value);
    }
}
