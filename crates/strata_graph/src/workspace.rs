//! The workspace that groups projects.

use crate::scheme::Scheme;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A workspace: the list of project paths it includes plus its own schemes.
///
/// Workspace schemes are independent of project schemes but are pruned by
/// the same rules.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct Workspace {
    /// Directory containing the workspace.
    pub path: PathBuf,
    /// Workspace name.
    #[serde(default)]
    pub name: String,
    /// Paths of the projects in the workspace, in order.
    #[serde(default)]
    pub projects: Vec<PathBuf>,
    /// Workspace-level schemes.
    #[serde(default)]
    pub schemes: Vec<Scheme>,
}

impl Workspace {
    /// Creates a workspace with no projects and no schemes.
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            projects: Vec::new(),
            schemes: Vec::new(),
        }
    }
}
