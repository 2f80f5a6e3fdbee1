//! Projects: ordered target lists plus project-level schemes.

use crate::scheme::Scheme;
use crate::target::{Target, TargetReference};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A project at a path on disk.
///
/// Target order is significant: it is the order targets appear in the
/// generated project and must survive every mapper that filters targets.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Project {
    /// Directory containing the project.
    pub path: PathBuf,
    /// Project name.
    pub name: String,
    /// Targets in declaration order.
    #[serde(default)]
    pub targets: Vec<Target>,
    /// Project-level schemes.
    #[serde(default)]
    pub schemes: Vec<Scheme>,
    /// Whether the project comes from an external dependency.
    #[serde(default)]
    pub is_external: bool,
}

impl Project {
    /// Creates an empty project.
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            targets: Vec::new(),
            schemes: Vec::new(),
            is_external: false,
        }
    }

    /// Looks up a target by name.
    pub fn target(&self, name: &str) -> Option<&Target> {
        self.targets.iter().find(|t| t.name == name)
    }

    /// Returns a reference to `target` qualified with this project's path.
    pub fn reference(&self, target: &Target) -> TargetReference {
        TargetReference::new(self.path.clone(), target.name.clone())
    }
}
