//! Trigger-invalidated memoization of artifacts derived from source resources.
//!
//! Each key maps to an immutable entry holding the derived value (or the fact
//! that the resource was absent) and the change trigger obtained when the
//! entry was made. A lookup whose trigger has not fired returns the stored
//! value without touching the provider. Once the trigger fires, the next
//! lookup resolves and computes again and swaps in a whole new entry.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, trace};
use vellum_common::ResourceKey;
use vellum_source::{inherited_locations, ChangeTrigger, FileInfo, FileProvider};

/// One memoized lookup. Never mutated after insertion.
struct CacheEntry<V> {
    value: Option<V>,
    trigger: Arc<dyn ChangeTrigger>,
}

/// Generic key → value cache with change-trigger invalidation and negative
/// result memoization.
///
/// Lookups do not serialize on a miss: two threads missing on the same key may
/// both resolve and compute, and the last insert wins. Either outcome leaves a
/// complete entry in the map, so `compute` only needs to be idempotent. No map
/// guard is held while `resolve` or `compute` run.
pub struct ArtifactCache<V> {
    provider: Arc<dyn FileProvider>,
    entries: DashMap<ResourceKey, Arc<CacheEntry<V>>>,
}

impl<V: Clone> ArtifactCache<V> {
    /// Creates an empty cache that resolves keys and obtains triggers through
    /// `provider`.
    pub fn new(provider: Arc<dyn FileProvider>) -> Self {
        Self {
            provider,
            entries: DashMap::new(),
        }
    }

    /// Returns the cached value for `key`, computing it from the provider's
    /// lookup when there is no entry or the entry's trigger has fired.
    ///
    /// Returns `Ok(None)` when the resource does not exist; that outcome is
    /// cached like any other. A `compute` error is returned as-is and leaves
    /// the cache untouched, so the next call tries again.
    pub fn get_or_add<E>(
        &self,
        key: &ResourceKey,
        compute: impl FnOnce(&FileInfo) -> Result<V, E>,
    ) -> Result<Option<V>, E> {
        self.get_or_add_with(key, |key| self.provider.file_info(key), compute)
    }

    /// Like [`get_or_add`](Self::get_or_add) with a caller-supplied `resolve`
    /// in place of the provider lookup. Triggers still come from the provider.
    pub fn get_or_add_with<E>(
        &self,
        key: &ResourceKey,
        resolve: impl FnOnce(&ResourceKey) -> FileInfo,
        compute: impl FnOnce(&FileInfo) -> Result<V, E>,
    ) -> Result<Option<V>, E> {
        if let Some(entry) = self.live_entry(key) {
            trace!(%key, "artifact cache hit");
            return Ok(entry.value.clone());
        }

        let file = resolve(key);
        let value = if file.exists() {
            debug!(%key, "compiling artifact");
            Some(compute(&file)?)
        } else {
            debug!(%key, "caching absent resource");
            None
        };

        let entry = Arc::new(CacheEntry {
            value: value.clone(),
            trigger: self.provider.watch(key),
        });
        self.entries.insert(key.clone(), entry);
        Ok(value)
    }

    /// Looks up `file_name` in every directory from `path`'s own up to the
    /// root, returning the values that exist, nearest first.
    ///
    /// Most candidates usually do not exist; their absence is cached, so a
    /// warm call costs one map read per directory level.
    pub fn get_or_add_inherited<E>(
        &self,
        path: &ResourceKey,
        file_name: &str,
        mut compute: impl FnMut(&FileInfo) -> Result<V, E>,
    ) -> Result<Vec<V>, E> {
        let mut found = Vec::new();
        for location in inherited_locations(path, file_name) {
            if let Some(value) = self.get_or_add(&location, &mut compute)? {
                found.push(value);
            }
        }
        Ok(found)
    }

    /// Returns the current entry for `key` if its trigger has not fired.
    fn live_entry(&self, key: &ResourceKey) -> Option<Arc<CacheEntry<V>>> {
        let entry = Arc::clone(self.entries.get(key)?.value());
        (!entry.trigger.is_expired()).then_some(entry)
    }

    /// Number of keys with an entry, live or expired.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every entry. Used when tearing down the owning service.
    pub fn clear(&self) {
        self.entries.clear();
    }
}
