//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::{StrataConfig, DEVELOPMENT_PROFILE};
use std::path::Path;

/// File name looked up in the project directory.
pub const CONFIG_FILE_NAME: &str = "strata.toml";

/// Loads and validates a `strata.toml` configuration from a project directory.
pub fn load_config(project_dir: &Path) -> Result<StrataConfig, ConfigError> {
    load_config_file(&project_dir.join(CONFIG_FILE_NAME))
}

/// Loads and validates a configuration file at `path`, whatever its name.
pub fn load_config_file(path: &Path) -> Result<StrataConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Parses and validates a `strata.toml` configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<StrataConfig, ConfigError> {
    let config: StrataConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &StrataConfig) -> Result<(), ConfigError> {
    if config.project.name.is_empty() {
        return Err(ConfigError::MissingField("project.name".to_string()));
    }
    if config.cache.max_concurrent_fetches == 0 {
        return Err(ConfigError::ValidationError(
            "cache.max_concurrent_fetches must be at least 1".to_string(),
        ));
    }
    let profile = &config.cache.profile;
    if profile != DEVELOPMENT_PROFILE && !config.cache.profiles.contains_key(profile) {
        return Err(ConfigError::UnknownProfile(profile.clone()));
    }
    Ok(())
}
