//! A provider serving resources held in memory.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use vellum_common::ResourceKey;

use crate::file_info::FileInfo;
use crate::provider::FileProvider;
use crate::trigger::{ChangeTrigger, TriggerRegistry};

/// Serves resources from an in-memory map, for embedded views and tests.
///
/// Adding or removing a resource does not fire its triggers on its own; call
/// [`expire`](Self::expire) once the change should become visible. This lets
/// a batch of edits land before any cache refreshes.
#[derive(Default)]
pub struct InMemoryFileProvider {
    files: DashMap<ResourceKey, Arc<str>>,
    triggers: TriggerRegistry,
    lookups: AtomicUsize,
}

impl InMemoryFileProvider {
    /// Creates an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the resource at `key`.
    pub fn add_file(&self, key: impl Into<ResourceKey>, content: impl AsRef<str>) {
        self.files.insert(key.into(), Arc::from(content.as_ref()));
    }

    /// Removes the resource at `key`. Returns `true` if it was present.
    pub fn remove_file(&self, key: &str) -> bool {
        self.files.remove(key).is_some()
    }

    /// Fires every trigger handed out for `key`.
    pub fn expire(&self, key: &str) -> usize {
        self.triggers.expire(key)
    }

    /// Number of [`file_info`](FileProvider::file_info) calls served so far.
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::Relaxed)
    }
}

impl FileProvider for InMemoryFileProvider {
    fn file_info(&self, key: &ResourceKey) -> FileInfo {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        match self.files.get(key.as_str()) {
            Some(content) => FileInfo::in_memory(key.clone(), Arc::clone(content.value())),
            None => FileInfo::missing(key.clone()),
        }
    }

    fn watch(&self, key: &ResourceKey) -> Arc<dyn ChangeTrigger> {
        self.triggers.register(key.as_str())
    }
}
