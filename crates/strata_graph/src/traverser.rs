//! Read-only queries over a [`Graph`].

use crate::graph::Graph;
use crate::target::{Target, TargetReference};
use std::collections::{BTreeMap, BTreeSet};

/// Answers reachability questions about a graph without modifying it.
///
/// Builds a reverse edge index once on construction so that dependent
/// lookups do not rescan every edge.
pub struct GraphTraverser<'a> {
    graph: &'a Graph,
    dependents: BTreeMap<TargetReference, BTreeSet<TargetReference>>,
}

impl<'a> GraphTraverser<'a> {
    /// Creates a traverser over `graph`.
    pub fn new(graph: &'a Graph) -> Self {
        let mut dependents: BTreeMap<TargetReference, BTreeSet<TargetReference>> = BTreeMap::new();
        for (from, edges) in &graph.dependencies {
            for to in edges.iter().filter_map(|e| e.target_reference()) {
                dependents.entry(to).or_default().insert(from.clone());
            }
        }
        Self { graph, dependents }
    }

    /// The graph being traversed.
    pub fn graph(&self) -> &'a Graph {
        self.graph
    }

    /// Targets `reference` depends on directly through target edges.
    ///
    /// Edges pointing at targets that are not in the graph are skipped.
    pub fn direct_target_dependencies(&self, reference: &TargetReference) -> Vec<TargetReference> {
        self.graph
            .dependencies_of(reference)
            .filter_map(|e| e.target_reference())
            .filter(|r| self.graph.target(r).is_some())
            .collect()
    }

    /// Targets that depend directly on `reference`.
    pub fn dependents(&self, reference: &TargetReference) -> impl Iterator<Item = &TargetReference> {
        self.dependents.get(reference).into_iter().flatten()
    }

    /// Test bundles that depend directly on `reference`.
    pub fn test_targets_depending_on(&self, reference: &TargetReference) -> Vec<TargetReference> {
        self.dependents(reference)
            .filter(|r| self.target(r).is_some_and(|t| t.product.is_test_bundle()))
            .cloned()
            .collect()
    }

    /// Returns `seeds` plus every target reachable from them through target edges.
    pub fn transitive_closure<I>(&self, seeds: I) -> BTreeSet<TargetReference>
    where
        I: IntoIterator<Item = TargetReference>,
    {
        let mut visited = BTreeSet::new();
        let mut stack: Vec<TargetReference> = seeds.into_iter().collect();
        while let Some(current) = stack.pop() {
            if !visited.insert(current.clone()) {
                continue;
            }
            for dep in self.direct_target_dependencies(&current) {
                if !visited.contains(&dep) {
                    stack.push(dep);
                }
            }
        }
        visited
    }

    /// Looks up a target by reference.
    pub fn target(&self, reference: &TargetReference) -> Option<&'a Target> {
        self.graph.target(reference)
    }

    /// References of every target nothing else depends on.
    pub fn root_targets(&self) -> BTreeSet<TargetReference> {
        self.root_targets_ignoring(&BTreeSet::new())
    }

    /// Like [`root_targets`](Self::root_targets), with the targets in
    /// `ignored` treated as absent: they are never roots, and depending on
    /// something does not stop it from being a root.
    pub fn root_targets_ignoring(&self, ignored: &BTreeSet<TargetReference>) -> BTreeSet<TargetReference> {
        self.graph
            .target_references()
            .filter(|r| !ignored.contains(r))
            .filter(|r| self.dependents(r).all(|d| ignored.contains(d)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependency::GraphDependency;
    use crate::project::Project;
    use crate::target::{Platform, Product};

    fn r(name: &str) -> TargetReference {
        TargetReference::new("/p", name)
    }

    // ATests -> A, B -> A, C -> B, B -> missing
    fn graph() -> Graph {
        let mut project = Project::new("/p", "P");
        project.targets = vec![
            Target::new("A", Product::Framework, Platform::Ios),
            Target::new("ATests", Product::UnitTests, Platform::Ios),
            Target::new("B", Product::Framework, Platform::Ios),
            Target::new("C", Product::App, Platform::Ios),
        ];
        Graph::new("G", "/p")
            .with_project(project)
            .with_dependency(r("ATests"), GraphDependency::target("A", "/p"))
            .with_dependency(r("B"), GraphDependency::target("A", "/p"))
            .with_dependency(r("B"), GraphDependency::target("Missing", "/p"))
            .with_dependency(r("C"), GraphDependency::target("B", "/p"))
    }

    #[test]
    fn direct_dependencies_skip_missing_targets() {
        let g = graph();
        let t = GraphTraverser::new(&g);
        assert_eq!(t.direct_target_dependencies(&r("B")), vec![r("A")]);
        assert!(t.direct_target_dependencies(&r("A")).is_empty());
    }

    #[test]
    fn dependents_and_test_targets() {
        let g = graph();
        let t = GraphTraverser::new(&g);
        let dependents: Vec<_> = t.dependents(&r("A")).cloned().collect();
        assert_eq!(dependents, vec![r("ATests"), r("B")]);
        assert_eq!(t.test_targets_depending_on(&r("A")), vec![r("ATests")]);
        assert!(t.test_targets_depending_on(&r("B")).is_empty());
    }

    #[test]
    fn transitive_closure_includes_seeds() {
        let g = graph();
        let t = GraphTraverser::new(&g);
        let closure = t.transitive_closure([r("C")]);
        assert_eq!(closure, [r("A"), r("B"), r("C")].into_iter().collect());
    }

    #[test]
    fn roots_are_targets_without_dependents() {
        let g = graph();
        let t = GraphTraverser::new(&g);
        assert_eq!(
            t.root_targets(),
            [r("ATests"), r("C")].into_iter().collect()
        );
    }

    #[test]
    fn ignored_targets_neither_root_nor_block_roots() {
        let g = graph();
        let t = GraphTraverser::new(&g);
        let ignored = [r("C")].into_iter().collect();
        assert_eq!(
            t.root_targets_ignoring(&ignored),
            [r("ATests"), r("B")].into_iter().collect()
        );
    }
}
