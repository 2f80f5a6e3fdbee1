//! Links cached binaries in place of source targets.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use strata_graph::{Graph, GraphDependency, GraphTraverser, TargetReference};
use strata_mapper::{CacheOutputType, CacheSubstitution, CollaboratorError, GraphMutator};

/// Default [`GraphMutator`].
///
/// Walks the graph from the targets that must stay source targets: the
/// `sources`, the test bundles that depend on them, and every target nothing
/// depends on. Targets already pruned are left out of the walk and do not
/// count as dependents. Edges into a substituted target are rewritten into
/// [`GraphDependency::Precompiled`] edges and the walk does not descend into
/// it. Targets the walk never reaches are no longer needed as sources and are
/// reported as pruned.
#[derive(Clone, Copy, Debug, Default)]
pub struct PrecompiledGraphMutator {
    output_type: CacheOutputType,
}

impl PrecompiledGraphMutator {
    /// Creates a mutator that links binaries of `output_type`.
    pub fn new(output_type: CacheOutputType) -> Self {
        Self { output_type }
    }

    fn source_roots(
        traverser: &GraphTraverser<'_>,
        sources: &BTreeSet<String>,
        pruned: &BTreeSet<TargetReference>,
    ) -> BTreeSet<TargetReference> {
        let mut roots: BTreeSet<TargetReference> = traverser
            .graph()
            .target_references()
            .filter(|r| sources.contains(&r.name) && !pruned.contains(r))
            .collect();
        let tests: Vec<TargetReference> = roots
            .iter()
            .flat_map(|r| traverser.test_targets_depending_on(r))
            .filter(|r| !pruned.contains(r))
            .collect();
        roots.extend(tests);
        roots.extend(traverser.root_targets_ignoring(pruned));
        roots
    }
}

impl GraphMutator for PrecompiledGraphMutator {
    fn apply(
        &self,
        mut graph: Graph,
        substitutions: &BTreeMap<TargetReference, PathBuf>,
        sources: &BTreeSet<String>,
        pruned: &BTreeSet<TargetReference>,
    ) -> Result<CacheSubstitution, CollaboratorError> {
        let (visited, unreached) = {
            let traverser = GraphTraverser::new(&graph);
            let roots = Self::source_roots(&traverser, sources, pruned);
            let is_binary =
                |r: &TargetReference| substitutions.contains_key(r) && !roots.contains(r);

            let mut visited = BTreeSet::new();
            let mut stack: Vec<TargetReference> = roots.iter().cloned().collect();
            while let Some(current) = stack.pop() {
                if !visited.insert(current.clone()) {
                    continue;
                }
                stack.extend(
                    traverser
                        .direct_target_dependencies(&current)
                        .into_iter()
                        .filter(|dep| !is_binary(dep) && !visited.contains(dep)),
                );
            }
            let unreached: BTreeSet<TargetReference> = graph
                .target_references()
                .filter(|r| !visited.contains(r))
                .collect();
            (visited, unreached)
        };

        let binary = self.output_type.precompiled_kind();
        for (from, edges) in graph.dependencies.iter_mut() {
            if !visited.contains(from) {
                continue;
            }
            *edges = std::mem::take(edges)
                .into_iter()
                .map(|edge| {
                    let artifact = edge
                        .target_reference()
                        .filter(|r| !visited.contains(r))
                        .and_then(|r| substitutions.get(&r).map(|path| (r, path)));
                    match artifact {
                        Some((reference, path)) => GraphDependency::Precompiled {
                            name: reference.name,
                            path: path.clone(),
                            binary,
                        },
                        None => edge,
                    }
                })
                .collect();
        }

        Ok(CacheSubstitution {
            graph,
            pruned: unreached,
        })
    }
}
