//! The resource lookup and change notification contract.

use std::sync::Arc;

use vellum_common::ResourceKey;

use crate::file_info::FileInfo;
use crate::trigger::ChangeTrigger;

/// Looks up resources and hands out change triggers for them.
///
/// Both operations must accept keys for resources that do not exist: a
/// trigger obtained for an absent key fires when the resource is created.
pub trait FileProvider: Send + Sync {
    /// Looks up `key`. Absence is reported through [`FileInfo::exists`].
    fn file_info(&self, key: &ResourceKey) -> FileInfo;

    /// Returns a fresh trigger that fires the next time `key` changes.
    fn watch(&self, key: &ResourceKey) -> Arc<dyn ChangeTrigger>;
}

impl<P: FileProvider + ?Sized> FileProvider for Arc<P> {
    fn file_info(&self, key: &ResourceKey) -> FileInfo {
        (**self).file_info(key)
    }

    fn watch(&self, key: &ResourceKey) -> Arc<dyn ChangeTrigger> {
        (**self).watch(key)
    }
}
