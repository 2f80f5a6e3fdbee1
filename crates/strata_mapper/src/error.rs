//! Error types for mapper invocations.

/// A failure reported by a collaborator (hasher, cache storage, graph mutator).
///
/// Mappers do not interpret these; they propagate them unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct CollaboratorError {
    /// Description of the failure.
    pub message: String,
}

impl CollaboratorError {
    /// Creates a new collaborator error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for CollaboratorError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

/// Errors that abort a mapper invocation.
///
/// A mapper that returns an error returns no graph and no side effects.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MapperError {
    /// Targets requested to be built from source do not exist in the graph.
    #[error(
        "the following targets were not found: {}. Available targets: {}",
        .missing.join(", "),
        .available.join(", ")
    )]
    MissingTargets {
        /// Requested names that are not in the graph, sorted.
        missing: Vec<String>,
        /// Every target name in the graph, sorted.
        available: Vec<String>,
    },

    /// A collaborator failed; the error is passed through verbatim.
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),

    /// The bounded pool used for concurrent cache lookups could not be created.
    #[error("failed to start cache worker pool: {0}")]
    WorkerPool(String),
}
