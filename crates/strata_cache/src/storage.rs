//! Directory-backed storage of precompiled binaries.

use crate::directories::CacheDirectories;
use crate::error::CacheError;
use std::path::{Path, PathBuf};
use strata_mapper::{CacheCategory, CacheDirectoriesProvider, CacheStorage, CollaboratorError};

/// Binaries stored at `<binaries>/<name>/<hash>/`.
///
/// An artifact exists when its directory exists. Fetching a local artifact
/// does not copy anything; it returns the directory.
#[derive(Clone, Debug)]
pub struct LocalCacheStorage {
    binaries: PathBuf,
}

impl LocalCacheStorage {
    /// Storage inside the binaries directory of `directories`.
    pub fn new(directories: &CacheDirectories) -> Self {
        Self {
            binaries: directories.cache_directory(CacheCategory::Binaries),
        }
    }

    /// Storage rooted directly at `binaries`.
    pub fn at(binaries: impl Into<PathBuf>) -> Self {
        Self {
            binaries: binaries.into(),
        }
    }

    /// Directory of the artifact for `name` at `hash`.
    pub fn artifact_path(&self, name: &str, hash: &str) -> PathBuf {
        self.binaries.join(name).join(hash)
    }

    /// Stores `files` (relative path and contents) as the artifact for
    /// `name` at `hash`, and returns its directory.
    pub fn store(
        &self,
        name: &str,
        hash: &str,
        files: &[(&Path, &[u8])],
    ) -> Result<PathBuf, CacheError> {
        let dir = self.artifact_path(name, hash);
        std::fs::create_dir_all(&dir).map_err(|e| CacheError::Io {
            path: dir.clone(),
            source: e,
        })?;
        for (relative, contents) in files {
            let path = dir.join(relative);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| CacheError::Io {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
            std::fs::write(&path, contents).map_err(|e| CacheError::Io { path, source: e })?;
        }
        Ok(dir)
    }

    fn lookup(&self, name: &str, hash: &str) -> Result<PathBuf, CacheError> {
        let dir = self.artifact_path(name, hash);
        if dir.is_dir() {
            Ok(dir)
        } else {
            Err(CacheError::MissingArtifact {
                name: name.to_string(),
                hash: hash.to_string(),
            })
        }
    }
}

impl CacheStorage for LocalCacheStorage {
    fn exists(&self, name: &str, hash: &str) -> Result<bool, CollaboratorError> {
        Ok(self.artifact_path(name, hash).is_dir())
    }

    fn fetch(&self, name: &str, hash: &str) -> Result<PathBuf, CollaboratorError> {
        Ok(self.lookup(name, hash)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_artifacts_exist_and_fetch() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = LocalCacheStorage::new(&CacheDirectories::new(tmp.path()));
        assert!(!storage.exists("Core", "abc").unwrap());

        let dir = storage
            .store("Core", "abc", &[(Path::new("Core.framework/Core"), b"binary".as_slice())])
            .unwrap();
        assert_eq!(dir, tmp.path().join("binaries/Core/abc"));
        assert!(storage.exists("Core", "abc").unwrap());
        assert_eq!(storage.fetch("Core", "abc").unwrap(), dir);
        assert_eq!(
            std::fs::read(dir.join("Core.framework/Core")).unwrap(),
            b"binary"
        );
    }

    #[test]
    fn other_hashes_are_misses() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = LocalCacheStorage::at(tmp.path());
        storage.store("Core", "abc", &[]).unwrap();
        assert!(!storage.exists("Core", "def").unwrap());
    }

    #[test]
    fn fetching_a_missing_artifact_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = LocalCacheStorage::at(tmp.path());
        let err = storage.fetch("Core", "abc").unwrap_err();
        assert_eq!(err.message, "no cached artifact for Core with hash abc");
    }
}
