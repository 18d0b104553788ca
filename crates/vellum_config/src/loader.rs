//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::CacheConfig;
use std::path::Path;

/// Name of the configuration file inside a project directory.
pub const CONFIG_FILE: &str = "vellum.toml";

/// Loads and validates `vellum.toml` from a project directory.
pub fn load_config(project_dir: &Path) -> Result<CacheConfig, ConfigError> {
    let content = std::fs::read_to_string(project_dir.join(CONFIG_FILE))?;
    load_config_from_str(&content)
}

/// Parses and validates a `vellum.toml` configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<CacheConfig, ConfigError> {
    let config: CacheConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &CacheConfig) -> Result<(), ConfigError> {
    let views = &config.views;
    if views.root.trim().is_empty() {
        return Err(ConfigError::MissingField("views.root".to_string()));
    }
    if views.app_relative_prefix.contains(['/', '\\']) {
        return Err(ConfigError::ValidationError(format!(
            "views.app_relative_prefix '{}' must not contain a path separator",
            views.app_relative_prefix
        )));
    }
    if views.view_start.is_empty()
        || views.view_start.contains(['/', '\\'])
        || views.view_start == "."
        || views.view_start == ".."
    {
        return Err(ConfigError::ValidationError(format!(
            "views.view_start '{}' must be a bare file name",
            views.view_start
        )));
    }
    Ok(())
}
