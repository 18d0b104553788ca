//! The compiler contract and the artifacts it produces.

use vellum_common::{ContentHash, ResourceKey};
use vellum_source::FileInfo;

use crate::activation::ComponentType;
use crate::error::CompilationError;

/// The cacheable result of compiling one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledArtifact {
    produced_type: ComponentType,
    originating_key: ResourceKey,
    source_hash: ContentHash,
}

impl CompiledArtifact {
    /// Records that compiling `originating_key` (whose text hashed to
    /// `source_hash`) produced `produced_type`.
    pub fn new(
        produced_type: ComponentType,
        originating_key: ResourceKey,
        source_hash: ContentHash,
    ) -> Self {
        Self {
            produced_type,
            originating_key,
            source_hash,
        }
    }

    /// The activatable type the source compiled to.
    pub fn produced_type(&self) -> &ComponentType {
        &self.produced_type
    }

    /// The key of the compiled resource.
    pub fn originating_key(&self) -> &ResourceKey {
        &self.originating_key
    }

    /// Hash of the source text that was compiled.
    pub fn source_hash(&self) -> ContentHash {
        self.source_hash
    }
}

/// Compiles a present resource into an artifact.
///
/// The artifact cache may call `compile` more than once for the same source
/// when lookups race, so implementations must not depend on being called once.
pub trait Compiler: Send + Sync {
    /// Compiles `file`, which is guaranteed to exist at lookup time.
    fn compile(&self, file: &FileInfo) -> Result<CompiledArtifact, CompilationError>;
}

impl<F> Compiler for F
where
    F: Fn(&FileInfo) -> Result<CompiledArtifact, CompilationError> + Send + Sync,
{
    fn compile(&self, file: &FileInfo) -> Result<CompiledArtifact, CompilationError> {
        self(file)
    }
}
