//! Candidate locations for files inherited down a directory tree.

use vellum_common::ResourceKey;

/// Lists where a file named `file_name` could live to apply to `path`, from
/// the directory containing `path` up to the root, nearest first.
///
/// `path` itself is never listed, so a `_ViewStart.cshtml` does not inherit
/// itself. Rooted paths produce rooted candidates.
///
/// ```
/// use vellum_common::ResourceKey;
/// use vellum_source::inherited_locations;
///
/// let found = inherited_locations(&ResourceKey::new("/Views/Home/Index.cshtml"), "_ViewStart.cshtml");
/// let found: Vec<_> = found.iter().map(|k| k.as_str()).collect();
/// assert_eq!(
///     found,
///     ["/Views/Home/_ViewStart.cshtml", "/Views/_ViewStart.cshtml", "/_ViewStart.cshtml"]
/// );
/// ```
pub fn inherited_locations(path: &ResourceKey, file_name: &str) -> Vec<ResourceKey> {
    let rooted = path.is_rooted();
    let segments: Vec<&str> = path.segments().collect();
    let Some((_, dirs)) = segments.split_last() else {
        return Vec::new();
    };

    let mut locations = Vec::with_capacity(dirs.len() + 1);
    for depth in (0..=dirs.len()).rev() {
        let mut candidate = String::new();
        if rooted {
            candidate.push('/');
        }
        for dir in &dirs[..depth] {
            candidate.push_str(dir);
            candidate.push('/');
        }
        candidate.push_str(file_name);

        let candidate = ResourceKey::from(candidate);
        if candidate != *path {
            locations.push(candidate);
        }
    }
    locations
}
