//! Configuration types deserialized from `vellum.toml`.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// The top-level cache configuration parsed from `vellum.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Where view sources live and how their identifiers are written.
    pub views: ViewsConfig,
    /// Change detection settings.
    #[serde(default)]
    pub watch: WatchConfig,
}

impl CacheConfig {
    /// Resolves the configured view root against the directory holding the
    /// configuration file. Absolute roots are returned unchanged.
    pub fn views_root(&self, project_dir: &Path) -> PathBuf {
        let root = Path::new(&self.views.root);
        if root.is_absolute() {
            root.to_path_buf()
        } else {
            project_dir.join(root)
        }
    }
}

/// View source location and identifier conventions.
#[derive(Debug, Clone, Deserialize)]
pub struct ViewsConfig {
    /// Directory containing view sources, relative to the project directory.
    pub root: String,
    /// Marker for application-relative identifiers (`~` in `~/Views/Index.cshtml`).
    /// An empty string disables normalization.
    #[serde(default = "default_app_relative_prefix")]
    pub app_relative_prefix: String,
    /// File name of the per-directory start file inherited by nested views.
    #[serde(default = "default_view_start")]
    pub view_start: String,
}

/// Change detection settings.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchConfig {
    /// Whether to watch the view root. When disabled, compiled views are
    /// never invalidated for the lifetime of the process.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

fn default_app_relative_prefix() -> String {
    "~".to_string()
}

fn default_view_start() -> String {
    "_ViewStart.cshtml".to_string()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(root: &str) -> CacheConfig {
        CacheConfig {
            views: ViewsConfig {
                root: root.to_string(),
                app_relative_prefix: default_app_relative_prefix(),
                view_start: default_view_start(),
            },
            watch: WatchConfig::default(),
        }
    }

    #[test]
    fn relative_root_joins_project_dir() {
        let cfg = config("Views");
        assert_eq!(
            cfg.views_root(Path::new("/srv/app")),
            PathBuf::from("/srv/app/Views")
        );
    }

    #[test]
    fn absolute_root_is_kept() {
        let cfg = config("/opt/views");
        assert_eq!(
            cfg.views_root(Path::new("/srv/app")),
            PathBuf::from("/opt/views")
        );
    }

    #[test]
    fn watch_defaults_to_enabled() {
        assert!(WatchConfig::default().enabled);
    }
}
