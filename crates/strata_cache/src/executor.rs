//! Applies the side effects a mapper pipeline returned.

use crate::error::CacheError;
use strata_mapper::{FileDescriptor, SideEffect};

/// Performs side effects against the local filesystem.
///
/// Effects run in order. Parent directories are created as needed. The first
/// failure stops execution; effects already applied stay applied.
#[derive(Clone, Copy, Debug, Default)]
pub struct SideEffectExecutor;

impl SideEffectExecutor {
    /// Applies every effect in `effects`.
    pub fn execute(&self, effects: &[SideEffect]) -> Result<(), CacheError> {
        for effect in effects {
            match effect {
                SideEffect::File(descriptor) => self.write_file(descriptor)?,
            }
        }
        Ok(())
    }

    fn write_file(&self, descriptor: &FileDescriptor) -> Result<(), CacheError> {
        let path = &descriptor.path;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CacheError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let result = match &descriptor.contents {
            Some(contents) => std::fs::write(path, contents),
            None if path.exists() => Ok(()),
            None => std::fs::write(path, b""),
        };
        result.map_err(|e| CacheError::Io {
            path: path.clone(),
            source: e,
        })
    }
}
