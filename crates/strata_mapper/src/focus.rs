//! Reduces a graph to the targets relevant to a working set.

use crate::error::MapperError;
use crate::mapper::{GraphMapper, MapOutput, MapperEnvironment};
use std::collections::BTreeSet;
use std::sync::Arc;
use strata_diagnostics::LogSink;
use strata_graph::{Graph, GraphTraverser, TargetReference};

/// Marks every target outside the focused working set as pruned.
///
/// The working set is seeded with the targets whose name is in
/// `included_targets` (matched across every project) and grows to a fixpoint
/// with:
///
/// - every target reachable from a kept target through target edges, and
/// - every test bundle with a direct edge to a kept target.
///
/// A non-test target that merely depends on a kept target is not pulled in.
/// The environment's pruned set is recomputed from scratch. With no
/// `included_targets` nothing is pruned; with an empty set everything is.
pub struct FocusTargetsMapper {
    included_targets: Option<BTreeSet<String>>,
    sink: Arc<LogSink>,
}

impl FocusTargetsMapper {
    /// Creates a focus mapper. `None` disables focusing.
    pub fn new(included_targets: Option<BTreeSet<String>>, sink: Arc<LogSink>) -> Self {
        Self {
            included_targets,
            sink,
        }
    }

    fn keep_set(graph: &Graph, included: &BTreeSet<String>) -> BTreeSet<TargetReference> {
        let traverser = GraphTraverser::new(graph);
        let seeds = graph
            .target_references()
            .filter(|r| included.contains(&r.name));
        let mut keep = traverser.transitive_closure(seeds);
        loop {
            let tests: Vec<TargetReference> = keep
                .iter()
                .flat_map(|r| traverser.test_targets_depending_on(r))
                .filter(|t| !keep.contains(t))
                .collect();
            if tests.is_empty() {
                return keep;
            }
            keep.extend(traverser.transitive_closure(tests));
        }
    }
}

impl GraphMapper for FocusTargetsMapper {
    fn name(&self) -> &str {
        "focus"
    }

    fn map(&self, graph: Graph, mut environment: MapperEnvironment) -> Result<MapOutput, MapperError> {
        self.sink
            .debug(format!("Transforming graph {}: Focusing targets", graph.name));

        environment.pruned_targets = match &self.included_targets {
            None => BTreeSet::new(),
            Some(included) => {
                let keep = Self::keep_set(&graph, included);
                graph
                    .target_references()
                    .filter(|r| !keep.contains(r))
                    .collect()
            }
        };
        Ok(MapOutput::new(graph, environment))
    }
}
