//! Default collaborators for the mapper pipeline.
//!
//! Provides content hashing of graph targets, the on-disk cache layout,
//! directory-backed binary storage, the graph mutator that links cached
//! binaries in place of source targets, and the executor that applies the
//! side effects a pipeline returns. The mappers in `strata_mapper` only
//! see these through its collaborator traits.

#![warn(missing_docs)]

pub mod directories;
pub mod error;
pub mod executor;
pub mod fs;
pub mod hash;
pub mod hasher;
pub mod mutator;
pub mod storage;

pub use directories::CacheDirectories;
pub use error::CacheError;
pub use executor::SideEffectExecutor;
pub use fs::LocalFileSystem;
pub use hash::ContentHash;
pub use hasher::XxhContentHasher;
pub use mutator::PrecompiledGraphMutator;
pub use storage::LocalCacheStorage;
