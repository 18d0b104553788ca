//! A provider serving a directory tree, with notify-driven change triggers.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, warn};
use vellum_common::ResourceKey;

use crate::error::SourceError;
use crate::file_info::FileInfo;
use crate::provider::FileProvider;
use crate::trigger::{ChangeTrigger, NeverExpires, TriggerRegistry};

/// Serves resources from files under a root directory.
///
/// Keys are interpreted relative to the root, with `/` and `\` both accepted
/// as separators and a leading separator ignored. Keys that would escape the
/// root (`..`) resolve to missing resources.
///
/// With watching enabled, one recursive watcher covers the whole root, so a
/// trigger handed out for a file that does not exist yet fires when the file
/// is created.
pub struct PhysicalFileProvider {
    root: PathBuf,
    triggers: Arc<TriggerRegistry>,
    // Dropping the watcher stops notifications.
    watcher: Option<RecommendedWatcher>,
}

impl PhysicalFileProvider {
    /// Creates a provider rooted at `root`, watching it for changes.
    pub fn new(root: &Path) -> Result<Self, SourceError> {
        let mut provider = Self::unwatched(root)?;
        provider.watcher = Some(start_watcher(&provider.root, Arc::clone(&provider.triggers))?);
        debug!(root = %provider.root.display(), "watching view root");
        Ok(provider)
    }

    /// Creates a provider rooted at `root` whose triggers never fire.
    ///
    /// Suitable for deployments where sources never change after start-up.
    pub fn unwatched(root: &Path) -> Result<Self, SourceError> {
        let root = std::fs::canonicalize(root).map_err(|e| SourceError::Io {
            path: root.to_path_buf(),
            source: e,
        })?;
        Ok(Self {
            root,
            triggers: Arc::new(TriggerRegistry::new()),
            watcher: None,
        })
    }

    /// The canonical root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns `true` if triggers are backed by filesystem notifications.
    pub fn is_watching(&self) -> bool {
        self.watcher.is_some()
    }
}

impl FileProvider for PhysicalFileProvider {
    fn file_info(&self, key: &ResourceKey) -> FileInfo {
        let Some(relative) = relative_name(key) else {
            return FileInfo::missing(key.clone());
        };
        let path = self.root.join(&relative);
        if path.is_file() {
            FileInfo::on_disk(key.clone(), path)
        } else {
            FileInfo::missing(key.clone())
        }
    }

    fn watch(&self, key: &ResourceKey) -> Arc<dyn ChangeTrigger> {
        if self.watcher.is_none() {
            return Arc::new(NeverExpires);
        }
        // Keys outside the root can never exist, so nothing will ever change.
        let Some(relative) = relative_name(key) else {
            return Arc::new(NeverExpires);
        };
        self.triggers.register(&relative)
    }
}

/// Maps a key to its `/`-joined name relative to the root, rejecting keys
/// that leave the root.
fn relative_name(key: &ResourceKey) -> Option<String> {
    let mut parts = Vec::new();
    for segment in key.segments() {
        match segment {
            "." => {}
            ".." => return None,
            s => parts.push(s),
        }
    }
    (!parts.is_empty()).then(|| parts.join("/"))
}

/// Maps an absolute path reported by the watcher back to its relative name.
fn name_under_root(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<&str> = relative
        .components()
        .map(|c| match c {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect::<Option<_>>()?;
    (!parts.is_empty()).then(|| parts.join("/"))
}

fn start_watcher(
    root: &Path,
    triggers: Arc<TriggerRegistry>,
) -> Result<RecommendedWatcher, SourceError> {
    let watch_root = root.to_path_buf();
    let mut watcher = RecommendedWatcher::new(
        move |res: Result<Event, notify::Error>| match res {
            Ok(event) => expire_for_event(&watch_root, &triggers, &event),
            Err(e) => warn!(error = %e, "view watcher error"),
        },
        Config::default(),
    )
    .map_err(|e| SourceError::Watch {
        root: root.to_path_buf(),
        reason: e.to_string(),
    })?;

    watcher
        .watch(root, RecursiveMode::Recursive)
        .map_err(|e| SourceError::Watch {
            root: root.to_path_buf(),
            reason: e.to_string(),
        })?;
    Ok(watcher)
}

fn expire_for_event(root: &Path, triggers: &TriggerRegistry, event: &Event) {
    if matches!(event.kind, EventKind::Access(_)) {
        return;
    }
    for path in &event.paths {
        if let Some(name) = name_under_root(root, path) {
            let fired = triggers.expire_tree(&name);
            if fired > 0 {
                debug!(resource = %name, fired, kind = ?event.kind, "source changed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn key(s: &str) -> ResourceKey {
        ResourceKey::new(s)
    }

    #[test]
    fn relative_name_normalizes_separators() {
        assert_eq!(
            relative_name(&key("/Views\\Home/./Index.cshtml")).as_deref(),
            Some("Views/Home/Index.cshtml")
        );
        assert_eq!(relative_name(&key("../secrets.txt")), None);
        assert_eq!(relative_name(&key("/")), None);
    }

    #[test]
    fn name_under_root_maps_back() {
        let root = Path::new("/srv/app");
        assert_eq!(
            name_under_root(root, Path::new("/srv/app/Views/Index.cshtml")).as_deref(),
            Some("Views/Index.cshtml")
        );
        assert_eq!(name_under_root(root, Path::new("/elsewhere/x")), None);
        assert_eq!(name_under_root(root, root), None);
    }

    #[test]
    fn lookup_existing_and_missing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("Views")).unwrap();
        std::fs::write(dir.path().join("Views/Index.cshtml"), "<h1>Hi</h1>").unwrap();

        let provider = PhysicalFileProvider::unwatched(dir.path()).unwrap();
        let found = provider.file_info(&key("/Views/Index.cshtml"));
        assert!(found.exists());
        assert_eq!(found.read_to_string().unwrap(), "<h1>Hi</h1>");

        assert!(!provider.file_info(&key("Views/_ViewStart.cshtml")).exists());
        assert!(!provider.file_info(&key("Views")).exists());
        assert!(!provider.file_info(&key("../Views/Index.cshtml")).exists());
    }

    #[test]
    fn missing_root_is_io_error() {
        let err = PhysicalFileProvider::unwatched(Path::new("/definitely/not/here"))
            .err()
            .unwrap();
        assert!(matches!(err, SourceError::Io { .. }));
    }

    #[test]
    fn unwatched_triggers_never_fire() {
        let dir = tempfile::tempdir().unwrap();
        let provider = PhysicalFileProvider::unwatched(dir.path()).unwrap();
        assert!(!provider.is_watching());
        let trigger = provider.watch(&key("a.cshtml"));
        std::fs::write(dir.path().join("a.cshtml"), "a").unwrap();
        assert!(!trigger.is_expired());
    }

    #[test]
    fn watched_trigger_fires_when_missing_file_is_created() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("Views")).unwrap();
        let provider = PhysicalFileProvider::new(dir.path()).unwrap();
        assert!(provider.is_watching());

        let trigger = provider.watch(&key("/Views/_ViewStart.cshtml"));
        assert!(!trigger.is_expired());

        std::fs::write(dir.path().join("Views/_ViewStart.cshtml"), "@{ }").unwrap();

        let deadline = Instant::now() + Duration::from_secs(10);
        while !trigger.is_expired() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(20));
        }
        assert!(trigger.is_expired());
    }
}
