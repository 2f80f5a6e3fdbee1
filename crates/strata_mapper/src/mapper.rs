//! The mapper contract and the sequential pipeline runner.

use crate::error::MapperError;
use crate::side_effect::SideEffect;
use std::collections::BTreeSet;
use strata_graph::{Graph, TargetReference};

/// Decisions carried between mapper stages alongside the graph.
///
/// The graph itself stays free of scratch fields: a stage that decides a
/// target should go away records the decision here, and a later stage acts
/// on it.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct MapperEnvironment {
    /// Targets marked for removal by tree-shaking.
    pub pruned_targets: BTreeSet<TargetReference>,
}

impl MapperEnvironment {
    /// Whether `reference` is marked for removal.
    pub fn is_pruned(&self, reference: &TargetReference) -> bool {
        self.pruned_targets.contains(reference)
    }
}

/// What a mapper returns on success.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct MapOutput {
    /// The transformed graph.
    pub graph: Graph,
    /// Deferred effects to execute after the pipeline finishes.
    pub side_effects: Vec<SideEffect>,
    /// The environment handed to the next stage.
    pub environment: MapperEnvironment,
}

impl MapOutput {
    /// Output with no side effects.
    pub fn new(graph: Graph, environment: MapperEnvironment) -> Self {
        Self {
            graph,
            side_effects: Vec::new(),
            environment,
        }
    }

    /// Sets the side effects.
    pub fn with_side_effects(mut self, side_effects: Vec<SideEffect>) -> Self {
        self.side_effects = side_effects;
        self
    }
}

/// A pure graph transformation.
///
/// Implementations must not perform I/O other than through their
/// collaborators, and must not keep state between calls, so the same mapper
/// can be run again or shared between threads working on different graphs.
pub trait GraphMapper: Send + Sync {
    /// Short name used in log messages.
    fn name(&self) -> &str;

    /// Transforms `graph`.
    fn map(&self, graph: Graph, environment: MapperEnvironment) -> Result<MapOutput, MapperError>;
}

/// Runs mappers left to right, threading each output graph into the next
/// stage and concatenating their side effects.
///
/// The first failing stage aborts the run; side effects of earlier stages
/// are discarded with it.
#[derive(Default)]
pub struct SequentialGraphMapper {
    mappers: Vec<Box<dyn GraphMapper>>,
}

impl SequentialGraphMapper {
    /// Creates a runner over `mappers`.
    pub fn new(mappers: Vec<Box<dyn GraphMapper>>) -> Self {
        Self { mappers }
    }

    /// Appends a stage.
    pub fn with(mut self, mapper: impl GraphMapper + 'static) -> Self {
        self.mappers.push(Box::new(mapper));
        self
    }

    /// Names of the stages, in order.
    pub fn stage_names(&self) -> Vec<&str> {
        self.mappers.iter().map(|m| m.name()).collect()
    }

    /// Runs the pipeline from an empty environment.
    pub fn run(&self, graph: Graph) -> Result<MapOutput, MapperError> {
        self.map(graph, MapperEnvironment::default())
    }
}

impl GraphMapper for SequentialGraphMapper {
    fn name(&self) -> &str {
        "sequential"
    }

    fn map(&self, graph: Graph, environment: MapperEnvironment) -> Result<MapOutput, MapperError> {
        let mut side_effects = Vec::new();
        let mut graph = graph;
        let mut environment = environment;
        for mapper in &self.mappers {
            let output = mapper.map(graph, environment)?;
            graph = output.graph;
            environment = output.environment;
            side_effects.extend(output.side_effects);
        }
        Ok(MapOutput {
            graph,
            side_effects,
            environment,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CollaboratorError;
    use crate::side_effect::FileDescriptor;
    use strata_graph::{Project, Target};

    /// Renames the graph and emits one file effect named after the stage.
    struct Rename(&'static str);

    impl GraphMapper for Rename {
        fn name(&self) -> &str {
            self.0
        }

        fn map(&self, mut graph: Graph, environment: MapperEnvironment) -> Result<MapOutput, MapperError> {
            graph.name = format!("{}+{}", graph.name, self.0);
            Ok(MapOutput::new(graph, environment)
                .with_side_effects(vec![SideEffect::File(FileDescriptor::new(self.0))]))
        }
    }

    struct Fail;

    impl GraphMapper for Fail {
        fn name(&self) -> &str {
            "fail"
        }

        fn map(&self, _: Graph, _: MapperEnvironment) -> Result<MapOutput, MapperError> {
            Err(CollaboratorError::new("stage failed").into())
        }
    }

    /// Marks every target as pruned.
    struct PruneAll;

    impl GraphMapper for PruneAll {
        fn name(&self) -> &str {
            "prune-all"
        }

        fn map(&self, graph: Graph, mut environment: MapperEnvironment) -> Result<MapOutput, MapperError> {
            environment.pruned_targets.extend(graph.target_references());
            Ok(MapOutput::new(graph, environment))
        }
    }

    #[test]
    fn stages_run_in_order_and_concatenate_effects() {
        let pipeline = SequentialGraphMapper::default()
            .with(Rename("a"))
            .with(Rename("b"));
        let output = pipeline.run(Graph::test(vec![])).unwrap();
        assert_eq!(output.graph.name, "Graph+a+b");
        assert_eq!(
            output.side_effects,
            vec![
                SideEffect::File(FileDescriptor::new("a")),
                SideEffect::File(FileDescriptor::new("b")),
            ]
        );
        assert_eq!(pipeline.stage_names(), vec!["a", "b"]);
    }

    #[test]
    fn failure_aborts_without_effects() {
        let pipeline = SequentialGraphMapper::default()
            .with(Rename("a"))
            .with(Fail)
            .with(Rename("b"));
        let err = pipeline.run(Graph::test(vec![])).unwrap_err();
        assert_eq!(err, MapperError::Collaborator(CollaboratorError::new("stage failed")));
    }

    #[test]
    fn environment_is_threaded_between_stages() {
        let graph = Graph::test(vec![Project::test("/project", vec![Target::test("A")])]);
        let pipeline = SequentialGraphMapper::default()
            .with(PruneAll)
            .with(Rename("after"));
        let output = pipeline.run(graph).unwrap();
        assert!(output
            .environment
            .is_pruned(&TargetReference::new("/project", "A")));
    }

    #[test]
    fn empty_pipeline_is_identity() {
        let graph = Graph::test(vec![Project::test("/project", vec![Target::test("A")])]);
        let output = SequentialGraphMapper::default().run(graph.clone()).unwrap();
        assert_eq!(output.graph, graph);
        assert!(output.side_effects.is_empty());
    }
}
