//! In-memory model of a build-target graph.
//!
//! A [`Graph`] holds the workspace, every loaded [`Project`] with its ordered
//! targets and schemes, and the dependency edges between targets. Values are
//! never mutated in place by the mapper pipeline: each stage consumes one
//! `Graph` and produces a new one. Projects are shared behind [`Arc`](std::sync::Arc)
//! so that stages which leave a project untouched do not copy it.

#![warn(missing_docs)]

pub mod dependency;
pub mod graph;
pub mod project;
pub mod scheme;
pub mod target;
pub mod traverser;
pub mod workspace;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use dependency::{GraphDependency, PrecompiledKind};
pub use graph::Graph;
pub use project::Project;
pub use scheme::{BuildAction, RunAction, Scheme, TestAction, TestPlan, TestableTarget};
pub use target::{Platform, Product, Target, TargetReference};
pub use traverser::GraphTraverser;
pub use workspace::Workspace;
