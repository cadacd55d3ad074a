//! Key/value store behind the template cache.

use std::sync::Arc;

use dashmap::DashMap;

use crate::source::{InvalidationToken, TemplatePath};
use crate::templating::Template;

/// A cached parsed template together with the freshness token it was built from.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Path the template was loaded from
    pub path: TemplatePath,
    /// Parsed template, shared read-only across renders
    pub template: Arc<dyn Template>,
    /// Source freshness at load time
    pub token: InvalidationToken,
}

/// Process-wide store of cache entries.
///
/// Implementations must tolerate concurrent inserts for the same key; either
/// last-write-wins or insert-if-absent is acceptable because templates built
/// from the same source are equivalent.
pub trait CacheStore: Send + Sync {
    /// Entry stored under `key`, if any.
    fn get(&self, key: &str) -> Option<CacheEntry>;

    /// Store `entry` under `key`, replacing any previous entry.
    fn insert(&self, key: String, entry: CacheEntry);

    /// Drop the entry under `key`, returning whether one existed.
    fn remove(&self, key: &str) -> bool;

    /// Drop every entry.
    fn clear(&self);

    /// Number of entries held.
    fn len(&self) -> usize;

    /// Whether the store holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory [`CacheStore`] over a [`DashMap`].
///
/// Reads clone the entry (an `Arc` bump), so no shard lock is held while a
/// template renders.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: DashMap<String, CacheEntry>,
}

impl MemoryCacheStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for MemoryCacheStore {
    fn get(&self, key: &str) -> Option<CacheEntry> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    fn insert(&self, key: String, entry: CacheEntry) {
        self.entries.insert(key, entry);
    }

    fn remove(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    fn clear(&self) {
        self.entries.clear();
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
