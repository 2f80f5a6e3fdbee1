//! Dependency edges between graph nodes.

use crate::target::TargetReference;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The kind of precompiled artifact a [`GraphDependency::Precompiled`] node links.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PrecompiledKind {
    /// A `.framework`.
    Framework,
    /// An `.xcframework`.
    XcFramework,
    /// A static or dynamic library.
    Library,
    /// A resource bundle.
    Bundle,
}

/// The node a dependency edge points at.
///
/// Mappers only inspect the [`Target`](GraphDependency::Target) variant and
/// pass every other variant through unchanged.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum GraphDependency {
    /// A source target in a project of the graph.
    Target {
        /// Target name.
        name: String,
        /// Path of the project defining the target.
        path: PathBuf,
    },
    /// A product of a package dependency.
    Package {
        /// Product name.
        product: String,
        /// Path of the package.
        path: PathBuf,
    },
    /// A precompiled binary artifact.
    Precompiled {
        /// Name of the target the artifact was built from.
        name: String,
        /// Location of the artifact.
        path: PathBuf,
        /// Artifact kind.
        binary: PrecompiledKind,
    },
    /// A system SDK.
    Sdk {
        /// SDK name, e.g. `XCTest.framework`.
        name: String,
        /// Whether linking is optional.
        #[serde(default)]
        optional: bool,
    },
    /// A standalone resource bundle.
    Bundle {
        /// Location of the bundle.
        path: PathBuf,
    },
}

impl GraphDependency {
    /// Creates a target edge to `name` in the project at `path`.
    pub fn target(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        GraphDependency::Target {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Returns the target reference when this is a target edge.
    pub fn target_reference(&self) -> Option<TargetReference> {
        match self {
            GraphDependency::Target { name, path } => {
                Some(TargetReference::new(path.clone(), name.clone()))
            }
            GraphDependency::Package { .. }
            | GraphDependency::Precompiled { .. }
            | GraphDependency::Sdk { .. }
            | GraphDependency::Bundle { .. } => None,
        }
    }

    /// Returns `true` when this edge points at the target `reference`.
    pub fn points_at(&self, reference: &TargetReference) -> bool {
        match self {
            GraphDependency::Target { name, path } => {
                *name == reference.name && *path == reference.project_path
            }
            _ => false,
        }
    }
}

impl From<&TargetReference> for GraphDependency {
    fn from(reference: &TargetReference) -> Self {
        GraphDependency::target(reference.name.clone(), reference.project_path.clone())
    }
}
