//! A point-in-time view of one resource as reported by a provider.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use vellum_common::{ContentHash, ResourceKey};

use crate::error::SourceError;

/// Where a present resource's content lives.
#[derive(Debug, Clone)]
enum Contents {
    Missing,
    Memory(Arc<str>),
    Disk(PathBuf),
}

/// The result of looking up a [`ResourceKey`] in a [`FileProvider`](crate::FileProvider).
///
/// Lookups never fail: a resource that is not there produces a `FileInfo`
/// whose [`exists`](Self::exists) is `false`. Content is read lazily, so a
/// lookup on disk costs one `stat`.
#[derive(Debug, Clone)]
pub struct FileInfo {
    key: ResourceKey,
    contents: Contents,
}

impl FileInfo {
    /// A lookup that found nothing under `key`.
    pub fn missing(key: ResourceKey) -> Self {
        Self {
            key,
            contents: Contents::Missing,
        }
    }

    /// A resource held in memory.
    pub fn in_memory(key: ResourceKey, content: Arc<str>) -> Self {
        Self {
            key,
            contents: Contents::Memory(content),
        }
    }

    /// A resource stored at `path` on disk.
    pub fn on_disk(key: ResourceKey, path: PathBuf) -> Self {
        Self {
            key,
            contents: Contents::Disk(path),
        }
    }

    /// The key this lookup was made for.
    pub fn key(&self) -> &ResourceKey {
        &self.key
    }

    /// Returns `true` if the resource existed at lookup time.
    pub fn exists(&self) -> bool {
        !matches!(self.contents, Contents::Missing)
    }

    /// The filesystem path, for resources backed by a file.
    pub fn physical_path(&self) -> Option<&Path> {
        match &self.contents {
            Contents::Disk(path) => Some(path),
            _ => None,
        }
    }

    /// Reads the resource's full text.
    pub fn read_to_string(&self) -> Result<String, SourceError> {
        match &self.contents {
            Contents::Missing => Err(SourceError::Missing {
                key: self.key.to_string(),
            }),
            Contents::Memory(text) => Ok(text.to_string()),
            Contents::Disk(path) => std::fs::read_to_string(path).map_err(|e| SourceError::Io {
                path: path.clone(),
                source: e,
            }),
        }
    }

    /// Reads the resource and returns the hash of its content.
    pub fn content_hash(&self) -> Result<ContentHash, SourceError> {
        match &self.contents {
            Contents::Memory(text) => Ok(ContentHash::of_str(text)),
            _ => self.read_to_string().map(|text| ContentHash::of_str(&text)),
        }
    }
}
