//! The page orchestrator: identifier in, activated instance out.

use std::any::type_name;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::debug;
use vellum_common::ResourceKey;
use vellum_source::FileInfo;

use crate::activation::{self, DefaultFactoryBuilder, FactoryBuilder, Instance};
use crate::capability::CapabilityContext;
use crate::compile::{CompiledArtifact, Compiler};
use crate::component::{ActivationContext, ActivationHook, NoopHook};
use crate::error::ActivationError;
use crate::services::CacheServices;

/// Creates page instances from source identifiers.
///
/// Each call normalizes the identifier, fetches the compiled artifact (compiling
/// on a miss or after the source changed), fetches the factory for the type the
/// artifact produces, and activates a new instance. Both lookups are memoized in
/// the shared [`CacheServices`], so a warm call does no I/O and no compilation.
///
/// Unless one is supplied with [`with_compiler`](Self::with_compiler), the
/// compiler is resolved from the capability context as `dyn Compiler` the first
/// time a source needs compiling, and kept from then on.
pub struct PageFactory {
    services: Arc<CacheServices>,
    capabilities: Arc<dyn CapabilityContext>,
    compiler: OnceCell<Arc<dyn Compiler>>,
    builder: Arc<dyn FactoryBuilder>,
    hook: Arc<dyn ActivationHook>,
}

impl PageFactory {
    /// Creates a factory over `services` that activates instances against
    /// `capabilities`.
    pub fn new(services: Arc<CacheServices>, capabilities: Arc<dyn CapabilityContext>) -> Self {
        Self {
            services,
            capabilities,
            compiler: OnceCell::new(),
            builder: Arc::new(DefaultFactoryBuilder),
            hook: Arc::new(NoopHook),
        }
    }

    /// Uses `compiler` instead of resolving one from the capability context.
    pub fn with_compiler(self, compiler: Arc<dyn Compiler>) -> Self {
        Self {
            compiler: OnceCell::with_value(compiler),
            ..self
        }
    }

    /// Replaces the constructor selection strategy.
    pub fn with_builder(mut self, builder: Arc<dyn FactoryBuilder>) -> Self {
        self.builder = builder;
        self
    }

    /// Replaces the activation hook run on every page.
    pub fn with_hook(mut self, hook: Arc<dyn ActivationHook>) -> Self {
        self.hook = hook;
        self
    }

    /// Creates an instance of the page at `path`.
    ///
    /// `path` may be application-relative (`~/Views/Index.cshtml`). Returns
    /// `Ok(None)` when no such page exists.
    pub fn create_instance(&self, path: &str) -> Result<Option<Box<dyn Instance>>, ActivationError> {
        let key = self.services.normalize(path);
        let Some(artifact) = self.artifact(&key)? else {
            debug!(%key, "page not found");
            return Ok(None);
        };
        self.activate(&artifact).map(Some)
    }

    /// Creates instances of every start file that applies to the page at
    /// `path`, outermost first.
    pub fn view_starts(&self, path: &str) -> Result<Vec<Box<dyn Instance>>, ActivationError> {
        let key = self.services.normalize(path);
        let mut artifacts = self.services.artifacts().get_or_add_inherited(
            &key,
            self.services.view_start(),
            |file| self.compile(file),
        )?;
        artifacts.reverse();
        artifacts.iter().map(|artifact| self.activate(artifact)).collect()
    }

    /// Releases an instance returned by this factory.
    pub fn release(&self, instance: Box<dyn Instance>) {
        activation::release(instance);
    }

    fn artifact(&self, key: &ResourceKey) -> Result<Option<CompiledArtifact>, ActivationError> {
        self.services
            .artifacts()
            .get_or_add(key, |file| self.compile(file))
    }

    fn compile(&self, file: &FileInfo) -> Result<CompiledArtifact, ActivationError> {
        Ok(self.compiler()?.compile(file)?)
    }

    fn compiler(&self) -> Result<&Arc<dyn Compiler>, ActivationError> {
        self.compiler.get_or_try_init(|| {
            self.capabilities
                .resolve::<dyn Compiler>()
                .ok_or(ActivationError::MissingCapability {
                    type_name: type_name::<Self>(),
                    capability: type_name::<dyn Compiler>(),
                })
        })
    }

    fn activate(&self, artifact: &CompiledArtifact) -> Result<Box<dyn Instance>, ActivationError> {
        let factory = self
            .services
            .factories()
            .get_or_add(artifact.produced_type(), self.builder.as_ref())?;
        let mut instance = factory.create(self.capabilities.as_ref())?;
        let path = artifact.originating_key();
        instance.set_path(path);
        self.hook
            .activate(instance.as_mut(), &ActivationContext::Page { path });
        Ok(instance)
    }
}
