//! Configuration types deserialized from `strata.toml`.

use serde::Deserialize;
use std::collections::BTreeMap;
use strata_graph::Platform;
use strata_mapper::CacheOutputType;

/// Name of the profile that exists without being declared.
pub const DEVELOPMENT_PROFILE: &str = "development";

/// The top-level project configuration parsed from `strata.toml`.
#[derive(Debug, Deserialize)]
pub struct StrataConfig {
    /// Core project metadata.
    pub project: ProjectMeta,
    /// Binary and test cache settings.
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Core project metadata required in every `strata.toml`.
#[derive(Debug, Deserialize)]
pub struct ProjectMeta {
    /// The project name.
    pub name: String,
    /// Path of the serialized graph, relative to the project directory.
    #[serde(default = "default_graph")]
    pub graph: String,
}

/// Cache settings.
#[derive(Debug, Deserialize)]
pub struct CacheConfig {
    /// Root of the local cache layout, relative to the project directory.
    #[serde(default = "default_directory")]
    pub directory: String,
    /// Name of the profile binaries are hashed and cached for.
    #[serde(default = "default_profile")]
    pub profile: String,
    /// Shape of cached binaries.
    #[serde(default)]
    pub output_type: CacheOutputType,
    /// Upper bound on concurrent cache lookups.
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,
    /// Declared profiles by name.
    #[serde(default)]
    pub profiles: BTreeMap<String, ProfileConfig>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            profile: default_profile(),
            output_type: CacheOutputType::default(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
            profiles: BTreeMap::new(),
        }
    }
}

/// A declared cache profile.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileConfig {
    /// Build configuration, e.g. `Release`.
    pub configuration: String,
    /// Platforms to build for. Empty means every platform.
    #[serde(default)]
    pub platforms: Vec<Platform>,
}

fn default_graph() -> String {
    "graph.json".to_string()
}

fn default_directory() -> String {
    ".strata/cache".to_string()
}

fn default_profile() -> String {
    DEVELOPMENT_PROFILE.to_string()
}

fn default_max_concurrent_fetches() -> usize {
    8
}
