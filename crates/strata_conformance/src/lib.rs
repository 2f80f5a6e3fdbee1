//! End-to-end helpers for the Strata mapper pipelines.
//!
//! Builds a small two-project workspace graph, runs the `generate`, `build`
//! and `test` pipelines over it with the real on-disk collaborators, and
//! applies their side effects, returning the result for assertion in
//! integration tests. A cache root directory stands in for the user's cache.

#![warn(missing_docs)]

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;

use strata_cache::{
    CacheDirectories, LocalCacheStorage, LocalFileSystem, PrecompiledGraphMutator,
    SideEffectExecutor, XxhContentHasher,
};
use strata_config::StrataConfig;
use strata_diagnostics::{LogSink, Severity};
use strata_graph::{
    BuildAction, Graph, GraphDependency, Platform, Product, Project, Scheme, Target,
    TargetReference, TestAction, TestableTarget,
};
use strata_mapper::{
    CacheBinariesMapper, FocusTargetsMapper, HashRequest, MapOutput, SequentialGraphMapper,
    TestsCacheMapper, TreeShakeMapper,
};

/// Path of the application project.
pub const APP_PROJECT: &str = "/workspace/App";
/// Path of the framework project.
pub const KIT_PROJECT: &str = "/workspace/Kit";

/// Result of running one pipeline.
pub struct PipelineRun {
    /// The final graph and environment.
    pub output: MapOutput,
    /// Notices emitted during the run, in order.
    pub notices: Vec<String>,
}

/// Shorthand for a reference into one of the fixture projects.
pub fn reference(project: &str, name: &str) -> TargetReference {
    TargetReference::new(project, name)
}

/// The workspace used by the conformance tests.
///
/// ```text
/// App ──► Networking ──► Core
///  └──────────────────────┘
/// AppTests ──► App            (and XCTest, an SDK)
/// NetworkingTests ──► Networking
/// CoreTests ──► Core
/// Analytics                   (no edges, in no scheme)
/// ```
///
/// Schemes: `App` (builds App, tests AppTests), `Kit` (builds Core and
/// Networking, tests their bundles) and a workspace scheme `All` that
/// builds both products.
pub fn sample_graph() -> Graph {
    let app = reference(APP_PROJECT, "App");
    let app_tests = reference(APP_PROJECT, "AppTests");
    let core = reference(KIT_PROJECT, "Core");
    let networking = reference(KIT_PROJECT, "Networking");
    let core_tests = reference(KIT_PROJECT, "CoreTests");
    let networking_tests = reference(KIT_PROJECT, "NetworkingTests");

    let mut app_project = Project::new(APP_PROJECT, "App");
    app_project.targets = vec![
        Target::new("App", Product::App, Platform::Ios),
        Target::new("AppTests", Product::UnitTests, Platform::Ios),
    ];
    app_project.schemes = vec![Scheme::new("App")
        .with_build_action(BuildAction::new(vec![app.clone()]))
        .with_test_action(TestAction::new(vec![TestableTarget::new(app_tests.clone())]))];

    let mut kit_project = Project::new(KIT_PROJECT, "Kit");
    kit_project.targets = vec![
        Target::new("Core", Product::Framework, Platform::Ios),
        Target::new("Networking", Product::Framework, Platform::Ios),
        Target::new("CoreTests", Product::UnitTests, Platform::Ios),
        Target::new("NetworkingTests", Product::UnitTests, Platform::Ios),
        Target::new("Analytics", Product::Framework, Platform::Ios),
    ];
    kit_project.schemes = vec![Scheme::new("Kit")
        .with_build_action(BuildAction::new(vec![core.clone(), networking.clone()]))
        .with_test_action(TestAction::new(vec![
            TestableTarget::new(core_tests.clone()),
            TestableTarget::new(networking_tests.clone()),
        ]))];

    let mut graph = Graph::new("Workspace", "/workspace")
        .with_project(app_project)
        .with_project(kit_project)
        .with_dependency(app.clone(), GraphDependency::target("Networking", KIT_PROJECT))
        .with_dependency(app.clone(), GraphDependency::target("Core", KIT_PROJECT))
        .with_dependency(app_tests.clone(), GraphDependency::target("App", APP_PROJECT))
        .with_dependency(
            app_tests,
            GraphDependency::Sdk {
                name: "XCTest.framework".to_string(),
                optional: false,
            },
        )
        .with_dependency(networking.clone(), GraphDependency::target("Core", KIT_PROJECT))
        .with_dependency(networking_tests, GraphDependency::target("Networking", KIT_PROJECT))
        .with_dependency(core_tests, GraphDependency::target("Core", KIT_PROJECT));
    graph.workspace.schemes =
        vec![Scheme::new("All").with_build_action(BuildAction::new(vec![app, networking, core]))];
    graph
}

/// Parses a configuration whose `[project]` table is filled in, followed by
/// `extra` TOML.
pub fn make_config(extra: &str) -> StrataConfig {
    let source = format!("[project]\nname = \"Workspace\"\n\n{extra}");
    match strata_config::load_config_from_str(&source) {
        Ok(config) => config,
        Err(e) => panic!("invalid conformance config: {e}"),
    }
}

fn run(
    pipeline: SequentialGraphMapper,
    graph: Graph,
    sink: &LogSink,
) -> Result<PipelineRun, Box<dyn std::error::Error>> {
    let output = pipeline.run(graph)?;
    SideEffectExecutor.execute(&output.side_effects)?;
    Ok(PipelineRun {
        output,
        notices: sink.messages_with(Severity::Notice),
    })
}

/// Runs focus → tree-shake.
pub fn run_generate(
    graph: Graph,
    focus: Option<&[&str]>,
) -> Result<PipelineRun, Box<dyn std::error::Error>> {
    let sink = Arc::new(LogSink::new());
    let pipeline = SequentialGraphMapper::default()
        .with(FocusTargetsMapper::new(focus_set(focus), sink.clone()))
        .with(TreeShakeMapper::new(sink.clone()));
    run(pipeline, graph, &sink)
}

/// Runs focus → cache-binaries → tree-shake against the cache at `cache_root`.
pub fn run_build(
    graph: Graph,
    cache_root: &Path,
    config: &StrataConfig,
    focus: Option<&[&str]>,
    sources: &[&str],
) -> Result<PipelineRun, Box<dyn std::error::Error>> {
    let sink = Arc::new(LogSink::new());
    let directories = CacheDirectories::new(cache_root);
    let output_type = config.cache.output_type;
    let cache_binaries = CacheBinariesMapper::new(
        Arc::new(XxhContentHasher::new()),
        Arc::new(LocalCacheStorage::new(&directories)),
        Arc::new(PrecompiledGraphMutator::new(output_type)),
        sink.clone(),
    )
    .with_sources(sources.iter().map(|s| s.to_string()).collect())
    .with_focused(focus_set(focus).unwrap_or_default())
    .with_profile(config.cache_profile()?)
    .with_output_type(output_type)
    .with_max_concurrent_fetches(config.cache.max_concurrent_fetches);

    let pipeline = SequentialGraphMapper::default()
        .with(FocusTargetsMapper::new(focus_set(focus), sink.clone()))
        .with(cache_binaries)
        .with(TreeShakeMapper::new(sink.clone()));
    run(pipeline, graph, &sink)
}

/// Runs focus → tests-cache → tree-shake against the cache at `cache_root`.
pub fn run_test(
    graph: Graph,
    cache_root: &Path,
    focus: Option<&[&str]>,
) -> Result<PipelineRun, Box<dyn std::error::Error>> {
    let sink = Arc::new(LogSink::new());
    let tests_cache = TestsCacheMapper::new(
        Arc::new(XxhContentHasher::new()),
        Arc::new(CacheDirectories::new(cache_root)),
        Arc::new(LocalFileSystem),
        sink.clone(),
    );
    let pipeline = SequentialGraphMapper::default()
        .with(FocusTargetsMapper::new(focus_set(focus), sink.clone()))
        .with(tests_cache)
        .with(TreeShakeMapper::new(sink.clone()));
    run(pipeline, graph, &sink)
}

fn focus_set(focus: Option<&[&str]>) -> Option<BTreeSet<String>> {
    focus.map(|names| names.iter().map(|n| n.to_string()).collect())
}

/// Content hashes of every target in `graph` for `config`'s profile and
/// output type, keyed by target name.
pub fn build_hashes(graph: &Graph, config: &StrataConfig) -> BTreeMap<String, String> {
    let profile = match config.cache_profile() {
        Ok(profile) => profile,
        Err(e) => panic!("unresolvable profile: {e}"),
    };
    let request = HashRequest::default()
        .with_profile(profile)
        .with_output_type(config.cache.output_type);
    hashes_by_name(graph, &request)
}

/// Content hashes of every target in `graph` as the tests cache computes them.
pub fn test_hashes(graph: &Graph) -> BTreeMap<String, String> {
    hashes_by_name(graph, &HashRequest::default())
}

fn hashes_by_name(graph: &Graph, request: &HashRequest) -> BTreeMap<String, String> {
    match XxhContentHasher::new().hash_graph(graph, request) {
        Ok(hashes) => hashes
            .into_iter()
            .map(|(reference, hash)| (reference.name, hash.to_string()))
            .collect(),
        Err(e) => panic!("hashing failed: {e}"),
    }
}

/// Stores an empty artifact for each of `names` under the build hash for
/// `config`, as a previous build would have.
pub fn store_binaries(cache_root: &Path, graph: &Graph, config: &StrataConfig, names: &[&str]) {
    let hashes = build_hashes(graph, config);
    let storage = LocalCacheStorage::new(&CacheDirectories::new(cache_root));
    for name in names {
        let framework = format!("{name}.framework/{name}");
        let files = [(Path::new(&framework), b"binary".as_slice())];
        if let Err(e) = storage.store(name, &hashes[*name], &files) {
            panic!("failed to store {name}: {e}");
        }
    }
}

/// Turns the ledger entries of `names` into tests markers, the way a test
/// runner records a passing run: `hashes/<name>` holds the hash, and the
/// marker is `tests/<hash>`. Returns how many entries were recorded.
pub fn record_passing(cache_root: &Path, names: &[&str]) -> usize {
    let directories = CacheDirectories::new(cache_root);
    if let Err(e) = directories.ensure_all() {
        panic!("failed to create cache directories: {e}");
    }
    let hashes_dir = cache_root.join("hashes");
    let tests_dir = cache_root.join("tests");
    let mut recorded = 0;
    for name in names {
        let entry = hashes_dir.join(name);
        let Ok(hash) = std::fs::read_to_string(&entry) else {
            continue;
        };
        if let Err(e) = std::fs::write(tests_dir.join(hash.trim()), "") {
            panic!("failed to record {name}: {e}");
        }
        if let Err(e) = std::fs::remove_file(&entry) {
            panic!("failed to clear ledger entry of {name}: {e}");
        }
        recorded += 1;
    }
    recorded
}

/// Names of every target in `graph`, project by project in declaration order.
pub fn target_names(graph: &Graph) -> Vec<String> {
    graph.target_references().map(|r| r.name).collect()
}

/// Names of the targets built by the scheme `scheme` in `graph`, if the
/// scheme exists.
pub fn scheme_build_targets(graph: &Graph, scheme: &str) -> Option<Vec<String>> {
    graph
        .workspace
        .schemes
        .iter()
        .chain(graph.projects.values().flat_map(|p| p.schemes.iter()))
        .find(|s| s.name == scheme)
        .map(|s| s.build_targets().iter().map(|t| t.name.clone()).collect())
}

/// Names of the targets tested by the scheme `scheme` in `graph`, if the
/// scheme exists.
pub fn scheme_test_targets(graph: &Graph, scheme: &str) -> Option<Vec<String>> {
    graph
        .workspace
        .schemes
        .iter()
        .chain(graph.projects.values().flat_map(|p| p.schemes.iter()))
        .find(|s| s.name == scheme)
        .map(|s| s.test_targets().iter().map(|t| t.target.name.clone()).collect())
}
