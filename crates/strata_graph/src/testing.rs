//! Fixture constructors for tests.
//!
//! Enabled for this crate's own tests and, through the `testing` feature,
//! for the tests of downstream crates.

use crate::dependency::GraphDependency;
use crate::graph::Graph;
use crate::project::Project;
use crate::scheme::{BuildAction, Scheme, TestAction, TestableTarget};
use crate::target::{Platform, Product, Target, TargetReference};
use std::path::PathBuf;

/// Default project path used by fixtures.
pub const TEST_PROJECT_PATH: &str = "/project";

impl Target {
    /// An iOS framework named `name`.
    pub fn test(name: &str) -> Self {
        Target::new(name, Product::Framework, Platform::Ios)
    }

    /// An iOS target named `name` with the given product.
    pub fn test_with_product(name: &str, product: Product) -> Self {
        Target::new(name, product, Platform::Ios)
    }
}

impl Project {
    /// A project at `path` holding `targets`, named after the last path component.
    pub fn test(path: &str, targets: Vec<Target>) -> Self {
        let path = PathBuf::from(path);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Project".to_string());
        let mut project = Project::new(path, name);
        project.targets = targets;
        project
    }
}

impl Scheme {
    /// A scheme that builds and tests `targets` (all in one project).
    pub fn test(name: &str, project_path: &str, targets: &[&str]) -> Self {
        let refs: Vec<TargetReference> = targets
            .iter()
            .map(|t| TargetReference::new(project_path, *t))
            .collect();
        Scheme::new(name)
            .with_build_action(BuildAction::new(refs.clone()))
            .with_test_action(TestAction::new(
                refs.into_iter().map(TestableTarget::new).collect(),
            ))
    }
}

impl Graph {
    /// A graph holding `projects`, rooted at [`TEST_PROJECT_PATH`].
    pub fn test(projects: Vec<Project>) -> Self {
        projects
            .into_iter()
            .fold(Graph::new("Graph", TEST_PROJECT_PATH), Graph::with_project)
    }

    /// Adds a target edge `from -> to`, both in the project at `path`.
    pub fn with_test_edge(self, path: &str, from: &str, to: &str) -> Self {
        self.with_dependency(
            TargetReference::new(path, from),
            GraphDependency::target(to, path),
        )
    }
}
