//! Error types for compilation and activation.

/// A compiler failure, reported verbatim to the caller and never cached.
#[derive(Debug, Clone, thiserror::Error)]
#[error("compilation of '{path}' failed: {}", .diagnostics.join("; "))]
pub struct CompilationError {
    /// Key of the resource that failed to compile.
    pub path: String,
    /// Compiler messages, in the order reported.
    pub diagnostics: Vec<String>,
}

impl CompilationError {
    /// Creates an error for `path` with a single diagnostic.
    pub fn new(path: impl Into<String>, diagnostic: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            diagnostics: vec![diagnostic.into()],
        }
    }
}

/// Errors surfaced while producing a ready-to-use instance.
///
/// A resource that does not exist is not an error; orchestrators report it as
/// `Ok(None)`. None of these conditions is memoized, so the next call retries.
#[derive(Debug, thiserror::Error)]
pub enum ActivationError {
    /// The type declares no usable constructor.
    #[error("type '{type_name}' cannot be activated: {reason}")]
    Configuration {
        /// The type being activated.
        type_name: &'static str,
        /// Why no constructor could be selected.
        reason: String,
    },

    /// A constructor parameter could not be resolved from the capability context.
    #[error("unable to resolve capability '{capability}' while activating '{type_name}'")]
    MissingCapability {
        /// The type being activated.
        type_name: &'static str,
        /// The unresolved capability.
        capability: &'static str,
    },

    /// The compiler rejected the source.
    #[error(transparent)]
    Compilation(#[from] CompilationError),

    /// The caller passed an argument of the wrong kind.
    #[error("invalid argument '{argument}': {reason}")]
    Argument {
        /// Name of the offending argument.
        argument: &'static str,
        /// What was expected.
        reason: String,
    },
}
