//! Physically removes pruned targets and whatever they leave behind.

use crate::error::MapperError;
use crate::mapper::{GraphMapper, MapOutput, MapperEnvironment};
use std::collections::BTreeSet;
use std::sync::Arc;
use strata_diagnostics::LogSink;
use strata_graph::{Graph, Scheme, TargetReference};

/// Deletes every target marked as pruned in the environment.
///
/// Projects left without targets are removed from the graph and from the
/// workspace. Scheme actions lose their references to removed targets, and a
/// scheme is dropped when it ends up with neither build targets nor test
/// plans, or when a run or test action expands variables from a removed
/// target. Dependency edges from and to removed targets go away; every other
/// edge kind is kept. Surviving targets keep their order.
///
/// The pruned set is consumed: the environment handed on is empty.
pub struct TreeShakeMapper {
    sink: Arc<LogSink>,
}

impl TreeShakeMapper {
    /// Creates a tree-shake mapper.
    pub fn new(sink: Arc<LogSink>) -> Self {
        Self { sink }
    }
}

impl GraphMapper for TreeShakeMapper {
    fn name(&self) -> &str {
        "tree-shake"
    }

    fn map(&self, mut graph: Graph, mut environment: MapperEnvironment) -> Result<MapOutput, MapperError> {
        self.sink
            .debug(format!("Transforming graph {}: Tree-shaking nodes", graph.name));

        let pruned = std::mem::take(&mut environment.pruned_targets);
        let (removed, kept): (BTreeSet<TargetReference>, BTreeSet<TargetReference>) =
            graph.target_references().partition(|r| pruned.contains(r));
        if removed.is_empty() {
            return Ok(MapOutput::new(graph, environment));
        }

        let shaker = Shaker {
            removed: &removed,
            kept: &kept,
        };

        graph.projects.retain(|_, project| {
            project
                .targets
                .iter()
                .any(|t| kept.contains(&project.reference(t)))
        });
        for project in graph.projects.values_mut() {
            let touches_removed = project
                .targets
                .iter()
                .any(|t| removed.contains(&project.reference(t)))
                || project.schemes.iter().any(|s| shaker.affects(s));
            if !touches_removed {
                continue;
            }
            let project = Arc::make_mut(project);
            let path = project.path.clone();
            project
                .targets
                .retain(|t| kept.contains(&TargetReference::new(path.clone(), t.name.clone())));
            project.schemes = shaker.prune_schemes(std::mem::take(&mut project.schemes));
        }

        let projects = &graph.projects;
        graph.workspace.projects.retain(|path| projects.contains_key(path));
        graph.workspace.schemes = shaker.prune_schemes(std::mem::take(&mut graph.workspace.schemes));

        graph.dependencies.retain(|from, _| !removed.contains(from));
        for edges in graph.dependencies.values_mut() {
            edges.retain(|edge| edge.target_reference().map_or(true, |r| !removed.contains(&r)));
        }

        self.sink.debug(format!(
            "Removed {} targets from graph {}",
            removed.len(),
            graph.name
        ));
        Ok(MapOutput::new(graph, environment))
    }
}

struct Shaker<'a> {
    removed: &'a BTreeSet<TargetReference>,
    kept: &'a BTreeSet<TargetReference>,
}

impl Shaker<'_> {
    /// Whether pruning would change `scheme`.
    fn affects(&self, scheme: &Scheme) -> bool {
        scheme.referenced_targets().any(|r| !self.kept.contains(r))
            || self.expands_from_removed(scheme)
    }

    fn expands_from_removed(&self, scheme: &Scheme) -> bool {
        let run = scheme
            .run_action
            .as_ref()
            .and_then(|a| a.expand_variable_from_target.as_ref());
        let test = scheme
            .test_action
            .as_ref()
            .and_then(|a| a.expand_variable_from_target.as_ref());
        run.into_iter().chain(test).any(|r| self.removed.contains(r))
    }

    fn prune_schemes(&self, schemes: Vec<Scheme>) -> Vec<Scheme> {
        schemes
            .into_iter()
            .filter(|scheme| !self.expands_from_removed(scheme))
            .filter_map(|mut scheme| {
                scheme.retain_targets(|r| self.kept.contains(r));
                let meaningful =
                    !scheme.build_targets().is_empty() || !scheme.test_plans().is_empty();
                meaningful.then_some(scheme)
            })
            .collect()
    }
}
