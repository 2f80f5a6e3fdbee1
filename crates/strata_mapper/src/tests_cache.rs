//! Skips tests whose targets have not changed since the last successful run.

use crate::collaborators::{
    CacheCategory, CacheDirectoriesProvider, ContentHasher, ContentHashes, FileExistence,
    HashRequest,
};
use crate::error::MapperError;
use crate::mapper::{GraphMapper, MapOutput, MapperEnvironment};
use crate::side_effect::{FileDescriptor, SideEffect};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use strata_diagnostics::LogSink;
use strata_graph::{Graph, GraphTraverser, Scheme, TargetReference};

/// Removes up-to-date targets from the build and test actions of every scheme.
///
/// A target is up to date when the tests directory holds a marker for its
/// current content hash and every target it depends on is up to date as well.
/// Because hashes cover dependencies transitively, a change anywhere below a
/// test bundle invalidates it.
///
/// Independently of the skip decision, the mapper emits one ledger file per
/// hashed target into the hashes directory, named after the target and
/// holding its current hash. A test runner copies the hashes of passing
/// targets into the tests directory as markers.
pub struct TestsCacheMapper {
    hasher: Arc<dyn ContentHasher>,
    directories: Arc<dyn CacheDirectoriesProvider>,
    files: Arc<dyn FileExistence>,
    sink: Arc<LogSink>,
}

impl TestsCacheMapper {
    /// Creates a tests-cache mapper.
    pub fn new(
        hasher: Arc<dyn ContentHasher>,
        directories: Arc<dyn CacheDirectoriesProvider>,
        files: Arc<dyn FileExistence>,
        sink: Arc<LogSink>,
    ) -> Self {
        Self {
            hasher,
            directories,
            files,
            sink,
        }
    }

    /// Targets named by any scheme, plus everything they depend on.
    fn hashable_targets(graph: &Graph) -> BTreeSet<TargetReference> {
        let traverser = GraphTraverser::new(graph);
        let seeds: Vec<TargetReference> = all_schemes(graph)
            .flat_map(Scheme::referenced_targets)
            .filter(|r| graph.target(r).is_some())
            .cloned()
            .collect();
        traverser.transitive_closure(seeds)
    }

    fn skipped_targets(&self, graph: &Graph, hashes: &ContentHashes) -> BTreeSet<TargetReference> {
        let check = UpToDate {
            traverser: GraphTraverser::new(graph),
            hashes,
            tests_directory: self.directories.cache_directory(CacheCategory::Tests),
            files: self.files.as_ref(),
        };
        let mut memo = BTreeMap::new();
        hashes
            .keys()
            .filter(|r| check.is_up_to_date(r, &mut memo))
            .cloned()
            .collect()
    }
}

struct UpToDate<'a> {
    traverser: GraphTraverser<'a>,
    hashes: &'a ContentHashes,
    tests_directory: PathBuf,
    files: &'a dyn FileExistence,
}

impl UpToDate<'_> {
    fn is_up_to_date(
        &self,
        reference: &TargetReference,
        memo: &mut BTreeMap<TargetReference, bool>,
    ) -> bool {
        if let Some(known) = memo.get(reference) {
            return *known;
        }
        // Provisional answer while the dependencies are visited; breaks cycles.
        memo.insert(reference.clone(), false);

        let cached = match self.hashes.get(reference) {
            Some(hash) => self.files.exists(&self.tests_directory.join(hash)),
            None => false,
        };
        let result = cached
            && self
                .traverser
                .direct_target_dependencies(reference)
                .iter()
                .all(|dependency| self.is_up_to_date(dependency, memo));
        memo.insert(reference.clone(), result);
        result
    }
}

fn all_schemes(graph: &Graph) -> impl Iterator<Item = &Scheme> {
    graph
        .workspace
        .schemes
        .iter()
        .chain(graph.projects.values().flat_map(|p| p.schemes.iter()))
}

/// Drops skipped references from `schemes`, recording which were removed.
fn remove_skipped(
    schemes: &mut [Scheme],
    skipped: &BTreeSet<TargetReference>,
    removed: &mut BTreeSet<TargetReference>,
) {
    for scheme in schemes {
        scheme.retain_targets(|reference| {
            if skipped.contains(reference) {
                removed.insert(reference.clone());
                false
            } else {
                true
            }
        });
    }
}

fn references_any(schemes: &[Scheme], skipped: &BTreeSet<TargetReference>) -> bool {
    schemes
        .iter()
        .flat_map(Scheme::referenced_targets)
        .any(|r| skipped.contains(r))
}

fn ledger_entries(hashes_directory: &Path, hashes: &ContentHashes) -> Vec<SideEffect> {
    hashes
        .iter()
        .map(|(reference, hash)| {
            SideEffect::File(
                FileDescriptor::new(hashes_directory.join(&reference.name))
                    .with_contents(hash.as_bytes()),
            )
        })
        .collect()
}

impl GraphMapper for TestsCacheMapper {
    fn name(&self) -> &str {
        "tests-cache"
    }

    fn map(&self, mut graph: Graph, environment: MapperEnvironment) -> Result<MapOutput, MapperError> {
        self.sink.debug(format!(
            "Transforming graph {}: Skipping unchanged tests",
            graph.name
        ));

        let hashable = Self::hashable_targets(&graph);
        let request = HashRequest::default().with_filter(hashable);
        let hashes = self.hasher.content_hashes(&graph, &request)?;
        let skipped = self.skipped_targets(&graph, &hashes);

        let mut removed = BTreeSet::new();
        if !skipped.is_empty() {
            remove_skipped(&mut graph.workspace.schemes, &skipped, &mut removed);
            for project in graph.projects.values_mut() {
                if references_any(&project.schemes, &skipped) {
                    remove_skipped(&mut Arc::make_mut(project).schemes, &skipped, &mut removed);
                }
            }
        }
        for reference in &removed {
            self.sink.notice(format!(
                "{} has not changed from last successful run, skipping...",
                reference.name
            ));
        }

        let hashes_directory = self.directories.cache_directory(CacheCategory::Hashes);
        let side_effects = ledger_entries(&hashes_directory, &hashes);
        Ok(MapOutput::new(graph, environment).with_side_effects(side_effects))
    }
}
