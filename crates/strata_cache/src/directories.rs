//! Layout of the local cache directory.

use crate::error::CacheError;
use std::path::{Path, PathBuf};
use strata_mapper::{CacheCategory, CacheDirectoriesProvider};

/// Subdirectory holding markers of test bundles that passed.
const TESTS_SUBDIR: &str = "tests";

/// Subdirectory holding the hash ledger of the last test run.
const HASHES_SUBDIR: &str = "hashes";

/// Subdirectory holding precompiled binaries.
const BINARIES_SUBDIR: &str = "binaries";

/// The cache layout under a single root:
///
/// ```text
/// <root>/tests/<hash>
/// <root>/hashes/<hash>
/// <root>/binaries/<name>/<hash>/
/// ```
#[derive(Clone, Debug)]
pub struct CacheDirectories {
    root: PathBuf,
}

impl CacheDirectories {
    /// Creates a layout rooted at `root`. Nothing is created on disk.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The cache root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates every category directory.
    pub fn ensure_all(&self) -> Result<(), CacheError> {
        for category in [CacheCategory::Tests, CacheCategory::Hashes, CacheCategory::Binaries] {
            let dir = self.cache_directory(category);
            std::fs::create_dir_all(&dir).map_err(|e| CacheError::Io {
                path: dir,
                source: e,
            })?;
        }
        Ok(())
    }
}

impl CacheDirectoriesProvider for CacheDirectories {
    fn cache_directory(&self, category: CacheCategory) -> PathBuf {
        let subdir = match category {
            CacheCategory::Tests => TESTS_SUBDIR,
            CacheCategory::Hashes => HASHES_SUBDIR,
            CacheCategory::Binaries => BINARIES_SUBDIR,
        };
        self.root.join(subdir)
    }
}
