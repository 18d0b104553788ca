//! Process-scoped cache state shared by the orchestrators.

use std::path::Path;
use std::sync::Arc;

use tracing::info;
use vellum_common::ResourceKey;
use vellum_config::CacheConfig;
use vellum_source::{FileProvider, PhysicalFileProvider, SourceError};

use crate::artifact::ArtifactCache;
use crate::compile::CompiledArtifact;
use crate::factory::ActivationFactoryCache;

const DEFAULT_APP_RELATIVE_PREFIX: &str = "~";
const DEFAULT_VIEW_START: &str = "_ViewStart.cshtml";

/// The compiled-view cache, the factory cache, and the provider they share.
///
/// Build one per process (or per isolated host) and hand it to every
/// [`PageFactory`](crate::PageFactory) and
/// [`ComponentFactory`](crate::ComponentFactory) behind an `Arc`.
pub struct CacheServices {
    provider: Arc<dyn FileProvider>,
    artifacts: ArtifactCache<CompiledArtifact>,
    factories: ActivationFactoryCache,
    app_relative_prefix: String,
    view_start: String,
}

impl CacheServices {
    /// Creates services over `provider` with the default identifier marker
    /// (`~`) and start file name (`_ViewStart.cshtml`).
    pub fn new(provider: Arc<dyn FileProvider>) -> Self {
        Self {
            artifacts: ArtifactCache::new(Arc::clone(&provider)),
            provider,
            factories: ActivationFactoryCache::new(),
            app_relative_prefix: DEFAULT_APP_RELATIVE_PREFIX.to_string(),
            view_start: DEFAULT_VIEW_START.to_string(),
        }
    }

    /// Creates services serving the configured view root from disk.
    ///
    /// `project_dir` anchors a relative `views.root`. With `watch.enabled`
    /// off, compiled views stay cached until the process exits.
    pub fn from_config(config: &CacheConfig, project_dir: &Path) -> Result<Self, SourceError> {
        let root = config.views_root(project_dir);
        let provider = if config.watch.enabled {
            PhysicalFileProvider::new(&root)?
        } else {
            PhysicalFileProvider::unwatched(&root)?
        };
        info!(
            root = %provider.root().display(),
            watching = provider.is_watching(),
            "view cache ready"
        );

        let mut services = Self::new(Arc::new(provider));
        services.app_relative_prefix = config.views.app_relative_prefix.clone();
        services.view_start = config.views.view_start.clone();
        Ok(services)
    }

    /// The provider used for lookups and triggers.
    pub fn provider(&self) -> &Arc<dyn FileProvider> {
        &self.provider
    }

    /// Compiled artifacts keyed by resource.
    pub fn artifacts(&self) -> &ArtifactCache<CompiledArtifact> {
        &self.artifacts
    }

    /// Activation factories keyed by component type.
    pub fn factories(&self) -> &ActivationFactoryCache {
        &self.factories
    }

    /// Marker stripped from application-relative identifiers.
    pub fn app_relative_prefix(&self) -> &str {
        &self.app_relative_prefix
    }

    /// File name of the inherited per-directory start file.
    pub fn view_start(&self) -> &str {
        &self.view_start
    }

    /// Converts a caller-supplied identifier into a cache key.
    pub fn normalize(&self, identifier: &str) -> ResourceKey {
        ResourceKey::from_app_relative(identifier, &self.app_relative_prefix)
    }

    /// Drops every cached artifact and factory.
    pub fn clear(&self) {
        self.artifacts.clear();
        self.factories.clear();
    }
}
