//! Ordinal identifiers for cacheable source resources.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Separator used when joining key segments.
const SEPARATOR: char = '/';

/// A stable, ordinal identifier for a logical source resource.
///
/// Keys compare byte-for-byte (no case folding, no separator rewriting), so
/// `Views/Home.cshtml` and `views/home.cshtml` are distinct entries. Cloning
/// is an `Arc` bump.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceKey(Arc<str>);

impl ResourceKey {
    /// Creates a key from its exact string form.
    pub fn new(key: impl AsRef<str>) -> Self {
        Self(Arc::from(key.as_ref()))
    }

    /// Normalizes an application-relative identifier into a key.
    ///
    /// An identifier of the form `<marker>/rest` loses its marker and keeps the
    /// leading slash, so with the marker `~` the identifier `~/Views/Index.cshtml`
    /// becomes `/Views/Index.cshtml`. An empty marker disables the rewrite.
    pub fn from_app_relative(identifier: &str, marker: &str) -> Self {
        if !marker.is_empty() {
            if let Some(rest) = identifier.strip_prefix(marker) {
                if rest.starts_with(SEPARATOR) {
                    return Self::new(rest);
                }
            }
        }
        Self::new(identifier)
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the key is rooted (starts with `/` or `\`).
    pub fn is_rooted(&self) -> bool {
        self.0.starts_with(['/', '\\'])
    }

    /// Iterates over the non-empty path segments, accepting both `/` and `\`.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(['/', '\\']).filter(|s| !s.is_empty())
    }

    /// Returns the final segment, if any.
    pub fn file_name(&self) -> Option<&str> {
        self.segments().last()
    }
}

impl Borrow<str> for ResourceKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ResourceKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ResourceKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for ResourceKey {
    fn from(key: String) -> Self {
        Self(Arc::from(key))
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResourceKey({:?})", &*self.0)
    }
}
