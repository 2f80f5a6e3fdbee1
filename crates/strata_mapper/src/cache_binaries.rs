//! Substitutes source targets with previously built binaries.

use crate::collaborators::{
    CacheOutputType, CacheProfile, CacheStorage, ContentHasher, GraphMutator, HashRequest,
};
use crate::error::{CollaboratorError, MapperError};
use crate::mapper::{GraphMapper, MapOutput, MapperEnvironment};
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::Arc;
use strata_diagnostics::LogSink;
use strata_graph::{Graph, TargetReference};

/// Default size of the fetch worker pool.
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 8;

/// Replaces targets that have a cached binary with that binary.
///
/// For every hashed target that is neither listed in `sources` nor focused,
/// and that no earlier stage pruned, the storage is asked whether an artifact
/// exists for the target's hash, and if so the artifact is fetched. Lookups run on a bounded worker pool. The first failure aborts
/// the invocation and nothing is substituted. The collected substitutions are
/// handed to the [`GraphMutator`], and the source targets it reports as no
/// longer needed are marked as pruned.
pub struct CacheBinariesMapper {
    sources: BTreeSet<String>,
    focused: BTreeSet<String>,
    profile: CacheProfile,
    output_type: CacheOutputType,
    max_concurrent_fetches: usize,
    hasher: Arc<dyn ContentHasher>,
    storage: Arc<dyn CacheStorage>,
    mutator: Arc<dyn GraphMutator>,
    sink: Arc<LogSink>,
}

impl CacheBinariesMapper {
    /// Creates a mapper with no source-only targets, the development profile,
    /// and framework output.
    pub fn new(
        hasher: Arc<dyn ContentHasher>,
        storage: Arc<dyn CacheStorage>,
        mutator: Arc<dyn GraphMutator>,
        sink: Arc<LogSink>,
    ) -> Self {
        Self {
            sources: BTreeSet::new(),
            focused: BTreeSet::new(),
            profile: CacheProfile::development(),
            output_type: CacheOutputType::default(),
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
            hasher,
            storage,
            mutator,
            sink,
        }
    }

    /// Names of targets that must always be built from source.
    pub fn with_sources(mut self, sources: BTreeSet<String>) -> Self {
        self.sources = sources;
        self
    }

    /// Names of focused targets. They stay source targets like `sources`,
    /// but names missing from the graph are ignored instead of rejected.
    pub fn with_focused(mut self, focused: BTreeSet<String>) -> Self {
        self.focused = focused;
        self
    }

    /// Sets the cache profile forwarded to the hasher.
    pub fn with_profile(mut self, profile: CacheProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Sets the output type forwarded to the hasher.
    pub fn with_output_type(mut self, output_type: CacheOutputType) -> Self {
        self.output_type = output_type;
        self
    }

    /// Bounds the number of concurrent storage calls. Zero is treated as one.
    pub fn with_max_concurrent_fetches(mut self, max: usize) -> Self {
        self.max_concurrent_fetches = max.max(1);
        self
    }

    fn validate_sources(&self, graph: &Graph) -> Result<(), MapperError> {
        let available = graph.target_names();
        let missing: Vec<String> = self
            .sources
            .iter()
            .filter(|name| available.binary_search(name).is_err())
            .cloned()
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(MapperError::MissingTargets { missing, available })
        }
    }

    /// `sources` plus the focused names present in `graph`.
    fn source_names(&self, graph: &Graph) -> BTreeSet<String> {
        let available = graph.target_names();
        let mut names = self.sources.clone();
        names.extend(
            self.focused
                .iter()
                .filter(|name| available.binary_search(name).is_ok())
                .cloned(),
        );
        names
    }

    /// Looks up and fetches every candidate on the bounded pool.
    fn fetch_all(
        &self,
        candidates: Vec<(TargetReference, String)>,
    ) -> Result<BTreeMap<TargetReference, PathBuf>, MapperError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_concurrent_fetches)
            .build()
            .map_err(|e| MapperError::WorkerPool(e.to_string()))?;

        let storage = self.storage.as_ref();
        let fetched = pool.install(|| {
            candidates
                .par_iter()
                .map(|(reference, hash)| -> Result<Option<(TargetReference, PathBuf)>, CollaboratorError> {
                    if !storage.exists(&reference.name, hash)? {
                        return Ok(None);
                    }
                    let path = storage.fetch(&reference.name, hash)?;
                    Ok(Some((reference.clone(), path)))
                })
                .collect::<Result<Vec<_>, CollaboratorError>>()
        })?;

        Ok(fetched.into_iter().flatten().collect())
    }
}

impl GraphMapper for CacheBinariesMapper {
    fn name(&self) -> &str {
        "cache-binaries"
    }

    fn map(&self, graph: Graph, mut environment: MapperEnvironment) -> Result<MapOutput, MapperError> {
        self.sink.debug(format!(
            "Transforming graph {}: Replacing targets with cached binaries",
            graph.name
        ));
        self.validate_sources(&graph)?;
        let sources = self.source_names(&graph);

        let request = HashRequest::default()
            .with_profile(self.profile.clone())
            .with_output_type(self.output_type)
            .with_excluded(sources.clone());
        let hashes = self.hasher.content_hashes(&graph, &request)?;

        let candidates: Vec<(TargetReference, String)> = hashes
            .into_iter()
            .filter(|(reference, _)| {
                !sources.contains(&reference.name) && !environment.is_pruned(reference)
            })
            .collect();
        let substitutions = self.fetch_all(candidates)?;
        self.sink.debug(format!(
            "Found {} cached binaries for graph {}",
            substitutions.len(),
            graph.name
        ));

        let substitution = self.mutator.apply(
            graph,
            &substitutions,
            &sources,
            &environment.pruned_targets,
        )?;
        environment.pruned_targets.extend(substitution.pruned);
        Ok(MapOutput::new(substitution.graph, environment))
    }
}
