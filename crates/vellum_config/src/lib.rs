//! Parsing and validation of `vellum.toml` cache configuration files.
//!
//! This crate reads the configuration file and produces a strongly-typed
//! [`CacheConfig`] describing where view sources live, how application-relative
//! identifiers are normalized, and whether sources are watched for changes.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE};
pub use types::*;
