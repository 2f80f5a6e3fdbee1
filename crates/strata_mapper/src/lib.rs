//! Graph mappers: pure `Graph -> (Graph, side effects)` transformations.
//!
//! A command composes a sequence of [`GraphMapper`]s with a
//! [`SequentialGraphMapper`]. Each stage consumes the previous stage's graph
//! and returns a new one together with [`SideEffect`] descriptors that are
//! executed only after the whole pipeline succeeded, so an aborted pipeline
//! leaves nothing on disk.
//!
//! The mappers:
//!
//! - [`FocusTargetsMapper`] marks everything outside a working set as pruned.
//! - [`CacheBinariesMapper`] substitutes targets with cached binaries.
//! - [`TestsCacheMapper`] removes unchanged, previously passing tests from schemes.
//! - [`TreeShakeMapper`] deletes pruned targets, empty projects, and dead schemes.
//!
//! Mappers never touch the filesystem or network themselves; everything
//! external goes through the traits in [`collaborators`].

#![warn(missing_docs)]

pub mod cache_binaries;
pub mod collaborators;
pub mod error;
pub mod focus;
pub mod mapper;
pub mod side_effect;
pub mod tests_cache;
pub mod tree_shake;

#[cfg(test)]
mod mocks;

pub use cache_binaries::CacheBinariesMapper;
pub use collaborators::{
    CacheCategory, CacheDirectoriesProvider, CacheOutputType, CacheProfile, CacheStorage,
    CacheSubstitution, ContentHasher, ContentHashes, FileExistence, GraphMutator, HashRequest,
};
pub use error::{CollaboratorError, MapperError};
pub use focus::FocusTargetsMapper;
pub use mapper::{GraphMapper, MapOutput, MapperEnvironment, SequentialGraphMapper};
pub use side_effect::{FileDescriptor, SideEffect};
pub use tests_cache::TestsCacheMapper;
pub use tree_shake::TreeShakeMapper;
