//! Buildable units and the references that identify them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Identity of a target: the project it belongs to plus its name.
///
/// Names are unique within a project, so `(project_path, name)` is unique
/// across the whole graph. Ordered by path first so that sets of references
/// iterate project by project.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct TargetReference {
    /// Path of the project that defines the target.
    pub project_path: PathBuf,
    /// Target name.
    pub name: String,
}

impl TargetReference {
    /// Creates a reference to the target `name` in the project at `project_path`.
    pub fn new(project_path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            project_path: project_path.into(),
            name: name.into(),
        }
    }

    /// Returns the project path as a borrowed [`Path`].
    pub fn path(&self) -> &Path {
        &self.project_path
    }
}

impl fmt::Display for TargetReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.project_path.display(), self.name)
    }
}

/// The kind of artifact a target produces.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Product {
    /// An application bundle.
    App,
    /// A dynamic framework.
    Framework,
    /// A static framework.
    StaticFramework,
    /// A static library.
    StaticLibrary,
    /// A dynamic library.
    DynamicLibrary,
    /// A resource bundle.
    Bundle,
    /// An application extension.
    AppExtension,
    /// A command line executable.
    CommandLineTool,
    /// A unit test bundle.
    UnitTests,
    /// A UI test bundle.
    UiTests,
}

impl Product {
    /// Returns `true` for test bundles (unit or UI tests).
    pub fn is_test_bundle(self) -> bool {
        matches!(self, Product::UnitTests | Product::UiTests)
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Product::App => "app",
            Product::Framework => "framework",
            Product::StaticFramework => "staticFramework",
            Product::StaticLibrary => "staticLibrary",
            Product::DynamicLibrary => "dynamicLibrary",
            Product::Bundle => "bundle",
            Product::AppExtension => "appExtension",
            Product::CommandLineTool => "commandLineTool",
            Product::UnitTests => "unitTests",
            Product::UiTests => "uiTests",
        };
        f.write_str(s)
    }
}

/// The platform a target is built for.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// iOS.
    Ios,
    /// macOS.
    Macos,
    /// tvOS.
    Tvos,
    /// watchOS.
    Watchos,
    /// visionOS.
    Visionos,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Platform::Ios => "ios",
            Platform::Macos => "macos",
            Platform::Tvos => "tvos",
            Platform::Watchos => "watchos",
            Platform::Visionos => "visionos",
        };
        f.write_str(s)
    }
}

/// A single buildable or testable unit.
///
/// Pipeline decisions about a target (for example "prune this") are not
/// stored here; they travel in the mapper environment so that a `Target`
/// is a plain value.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Target {
    /// Target name, unique within its project.
    pub name: String,
    /// What the target produces.
    pub product: Product,
    /// The platform the target is built for.
    pub platform: Platform,
}

impl Target {
    /// Creates a target.
    pub fn new(name: impl Into<String>, product: Product, platform: Platform) -> Self {
        Self {
            name: name.into(),
            product,
            platform,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn references_order_by_project_then_name() {
        let a = TargetReference::new("/a", "Zed");
        let b = TargetReference::new("/b", "Alpha");
        let c = TargetReference::new("/a", "Alpha");
        let mut refs = vec![a.clone(), b.clone(), c.clone()];
        refs.sort();
        assert_eq!(refs, vec![c, a, b]);
    }

    #[test]
    fn test_bundles() {
        assert!(Product::UnitTests.is_test_bundle());
        assert!(Product::UiTests.is_test_bundle());
        assert!(!Product::Framework.is_test_bundle());
        assert!(!Product::App.is_test_bundle());
    }

    #[test]
    fn product_serializes_camel_case() {
        let json = serde_json::to_string(&Product::StaticLibrary).unwrap();
        assert_eq!(json, "\"staticLibrary\"");
        let back: Product = serde_json::from_str("\"uiTests\"").unwrap();
        assert_eq!(back, Product::UiTests);
    }

    #[test]
    fn reference_display() {
        let r = TargetReference::new("/project", "Core");
        assert_eq!(r.to_string(), "/project:Core");
    }
}
