//! The local filesystem as a [`FileExistence`] collaborator.

use std::path::Path;
use strata_mapper::FileExistence;

/// Answers existence questions against the real filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalFileSystem;

impl FileExistence for LocalFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_existing_paths() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("marker");
        assert!(!LocalFileSystem.exists(&file));
        std::fs::write(&file, "").unwrap();
        assert!(LocalFileSystem.exists(&file));
    }
}
