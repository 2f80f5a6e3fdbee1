//! Deferred descriptions of I/O produced by mappers.

use std::path::PathBuf;

/// Something to do once the whole pipeline has succeeded.
///
/// Mappers return these instead of performing I/O so that a pipeline that
/// fails halfway leaves no partial state behind.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum SideEffect {
    /// Write (or touch) a file.
    File(FileDescriptor),
}

impl SideEffect {
    /// The path this effect writes to.
    pub fn path(&self) -> &PathBuf {
        match self {
            SideEffect::File(descriptor) => &descriptor.path,
        }
    }
}

/// A file to create at `path`, with optional contents.
///
/// A descriptor without contents creates an empty file, or leaves an
/// existing one as it is.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct FileDescriptor {
    /// Destination path.
    pub path: PathBuf,
    /// Bytes to write, if any.
    pub contents: Option<Vec<u8>>,
}

impl FileDescriptor {
    /// A descriptor that creates an empty file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            contents: None,
        }
    }

    /// Sets the contents to write.
    pub fn with_contents(mut self, contents: impl Into<Vec<u8>>) -> Self {
        self.contents = Some(contents.into());
        self
    }
}
