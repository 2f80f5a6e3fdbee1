//! Contracts for the external services mappers depend on.
//!
//! Implementations live outside this crate (see `strata_cache`); tests use
//! in-memory doubles. Every method returns [`CollaboratorError`] on failure
//! and mappers propagate it unchanged.

use crate::error::CollaboratorError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};
use strata_graph::{Graph, Platform, PrecompiledKind, TargetReference};

/// Content hash per target. Hashes are opaque strings.
pub type ContentHashes = BTreeMap<TargetReference, String>;

/// The build variant binaries are cached for. Part of every cache key.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct CacheProfile {
    /// Profile name.
    pub name: String,
    /// Build configuration, e.g. `Debug`.
    pub configuration: String,
    /// Platforms the binaries are built for.
    #[serde(default)]
    pub platforms: Vec<Platform>,
}

impl CacheProfile {
    /// The built-in `development` profile: Debug configuration, every platform.
    pub fn development() -> Self {
        Self {
            name: "development".to_string(),
            configuration: "Debug".to_string(),
            platforms: Vec::new(),
        }
    }
}

/// The shape of cached binaries.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheOutputType {
    /// A `.framework` per target.
    #[default]
    Framework,
    /// An `.xcframework` per target.
    XcFramework,
    /// A resource bundle.
    Bundle,
}

impl CacheOutputType {
    /// The dependency kind a cached binary of this type is linked as.
    pub fn precompiled_kind(self) -> PrecompiledKind {
        match self {
            CacheOutputType::Framework => PrecompiledKind::Framework,
            CacheOutputType::XcFramework => PrecompiledKind::XcFramework,
            CacheOutputType::Bundle => PrecompiledKind::Bundle,
        }
    }
}

impl fmt::Display for CacheOutputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheOutputType::Framework => write!(f, "framework"),
            CacheOutputType::XcFramework => write!(f, "xcframework"),
            CacheOutputType::Bundle => write!(f, "bundle"),
        }
    }
}

/// Parameters of a [`ContentHasher::content_hashes`] call.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct HashRequest {
    /// Profile that is mixed into every hash.
    pub profile: Option<CacheProfile>,
    /// Output type that is mixed into every hash.
    pub output_type: Option<CacheOutputType>,
    /// Target names that are always built from source and must not be reported.
    pub excluded: BTreeSet<String>,
    /// When set, only these targets are reported (their dependencies are
    /// still hashed so changes propagate).
    pub filter: Option<BTreeSet<TargetReference>>,
}

impl HashRequest {
    /// Sets the cache profile.
    pub fn with_profile(mut self, profile: CacheProfile) -> Self {
        self.profile = Some(profile);
        self
    }

    /// Sets the output type.
    pub fn with_output_type(mut self, output_type: CacheOutputType) -> Self {
        self.output_type = Some(output_type);
        self
    }

    /// Sets the excluded (source-only) names.
    pub fn with_excluded(mut self, excluded: BTreeSet<String>) -> Self {
        self.excluded = excluded;
        self
    }

    /// Restricts the reported targets.
    pub fn with_filter(mut self, filter: BTreeSet<TargetReference>) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Whether a hash for `reference` should be reported.
    pub fn includes(&self, reference: &TargetReference) -> bool {
        !self.excluded.contains(&reference.name)
            && self.filter.as_ref().map_or(true, |f| f.contains(reference))
    }
}

/// Computes content hashes of graph targets.
///
/// A target's hash must cover its dependencies' hashes transitively, so a
/// change anywhere below a target changes the target's hash. Results must be
/// deterministic for a given graph.
pub trait ContentHasher: Send + Sync {
    /// Hashes the targets of `graph` selected by `request`.
    fn content_hashes(
        &self,
        graph: &Graph,
        request: &HashRequest,
    ) -> Result<ContentHashes, CollaboratorError>;
}

/// Lookup and retrieval of cached binaries by target name and hash.
///
/// Implementations own retries, timeouts, and transport concerns. Calls may
/// arrive concurrently from several worker threads.
pub trait CacheStorage: Send + Sync {
    /// Whether an artifact for `name` at `hash` exists.
    fn exists(&self, name: &str, hash: &str) -> Result<bool, CollaboratorError>;

    /// Makes the artifact available locally and returns its path.
    fn fetch(&self, name: &str, hash: &str) -> Result<PathBuf, CollaboratorError>;
}

/// The kinds of directories in the cache layout.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum CacheCategory {
    /// Markers of test bundles that passed, named by content hash.
    Tests,
    /// The ledger of hashes computed by the last test run.
    Hashes,
    /// Precompiled binaries.
    Binaries,
}

/// Resolves cache directories by category.
pub trait CacheDirectoriesProvider: Send + Sync {
    /// Directory for `category`.
    fn cache_directory(&self, category: CacheCategory) -> PathBuf;
}

/// Answers whether a path exists. The only filesystem question mappers ask.
pub trait FileExistence: Send + Sync {
    /// Whether something exists at `path`.
    fn exists(&self, path: &Path) -> bool;
}

/// Result of substituting cached binaries into a graph.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct CacheSubstitution {
    /// The graph with substituted targets linked as binaries.
    pub graph: Graph,
    /// Source targets that are no longer needed and can be tree-shaken.
    pub pruned: BTreeSet<TargetReference>,
}

/// Rewrites a graph so that targets with cached binaries are linked as binaries.
pub trait GraphMutator: Send + Sync {
    /// Applies `substitutions` (target to artifact path) to `graph`.
    ///
    /// Targets named in `sources` stay source targets. Edges that pointed at a
    /// substituted target must keep existing and point at its binary. Targets
    /// in `pruned` are already on their way out and must not be treated as
    /// entry points of the graph.
    fn apply(
        &self,
        graph: Graph,
        substitutions: &BTreeMap<TargetReference, PathBuf>,
        sources: &BTreeSet<String>,
        pruned: &BTreeSet<TargetReference>,
    ) -> Result<CacheSubstitution, CollaboratorError>;
}
