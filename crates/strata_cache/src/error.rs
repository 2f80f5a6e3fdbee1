//! Error types for cache operations.

use std::path::PathBuf;
use strata_mapper::CollaboratorError;

/// Errors that can occur while hashing targets or accessing the cache.
///
/// When a cache type is used as a mapper collaborator these are flattened
/// into a [`CollaboratorError`] carrying the display message.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// An I/O error occurred while reading or writing cache files.
    #[error("cache I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A value could not be serialized into hash input.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Description of the serialization failure.
        reason: String,
    },

    /// Target dependencies form a cycle, so no hash can cover them.
    #[error("dependency cycle through target {target}")]
    DependencyCycle {
        /// A target on the cycle, as `path:name`.
        target: String,
    },

    /// No artifact is stored for the requested target and hash.
    #[error("no cached artifact for {name} with hash {hash}")]
    MissingArtifact {
        /// Target name.
        name: String,
        /// Requested content hash.
        hash: String,
    },
}

impl From<CacheError> for CollaboratorError {
    fn from(error: CacheError) -> Self {
        CollaboratorError::new(error.to_string())
    }
}
