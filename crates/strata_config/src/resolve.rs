//! Profile resolution: turning the selected profile name into a cache profile.

use crate::error::ConfigError;
use crate::types::{StrataConfig, DEVELOPMENT_PROFILE};
use strata_mapper::CacheProfile;

/// Resolves the profile named `name`.
///
/// Declared profiles win; `development` falls back to the built-in Debug
/// profile when it is not declared.
pub fn resolve_profile(config: &StrataConfig, name: &str) -> Result<CacheProfile, ConfigError> {
    match config.cache.profiles.get(name) {
        Some(profile) => Ok(CacheProfile {
            name: name.to_string(),
            configuration: profile.configuration.clone(),
            platforms: profile.platforms.clone(),
        }),
        None if name == DEVELOPMENT_PROFILE => Ok(CacheProfile::development()),
        None => Err(ConfigError::UnknownProfile(name.to_string())),
    }
}

impl StrataConfig {
    /// The profile selected by `cache.profile`.
    pub fn cache_profile(&self) -> Result<CacheProfile, ConfigError> {
        resolve_profile(self, &self.cache.profile)
    }
}
