//! Shared pipeline helpers for CLI commands.
//!
//! Project root and config resolution, graph loading and writing, the mapper
//! sequence each command runs, and rendering of the log sink.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use strata_cache::{
    CacheDirectories, LocalCacheStorage, LocalFileSystem, PrecompiledGraphMutator,
    SideEffectExecutor, XxhContentHasher,
};
use strata_config::{StrataConfig, CONFIG_FILE_NAME};
use strata_diagnostics::{LogRenderer, LogSink, Severity, TerminalRenderer};
use strata_graph::Graph;
use strata_mapper::{
    CacheBinariesMapper, FocusTargetsMapper, MapOutput, SequentialGraphMapper, TestsCacheMapper,
    TreeShakeMapper,
};

use crate::GlobalArgs;

/// Walks up from `start` looking for the nearest directory containing `strata.toml`.
pub fn find_project_root(start: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(CONFIG_FILE_NAME).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(format!(
                "could not find {CONFIG_FILE_NAME} in {} or any parent directory",
                start.display()
            )
            .into());
        }
    }
}

/// Resolves the project root directory from global CLI args.
///
/// If `--config` is specified, uses that path (file → parent dir, dir → itself).
/// Otherwise walks up from the current directory looking for `strata.toml`.
/// When `--config` names a file, [`ProjectContext::load`] reads that file
/// rather than the root's `strata.toml`.
pub fn resolve_project_root(global: &GlobalArgs) -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Some(ref config_path) = global.config {
        let p = PathBuf::from(config_path);
        if p.is_file() {
            Ok(p.parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| PathBuf::from(".")))
        } else {
            Ok(p)
        }
    } else {
        find_project_root(&std::env::current_dir()?)
    }
}

/// A loaded project: its root directory and configuration.
pub struct ProjectContext {
    /// Directory containing `strata.toml`.
    pub root: PathBuf,
    /// The parsed configuration.
    pub config: StrataConfig,
}

impl ProjectContext {
    /// Resolves the project root and loads its configuration.
    ///
    /// A `--config` file is loaded as given; relative paths in it resolve
    /// against its directory.
    pub fn load(global: &GlobalArgs) -> Result<Self, Box<dyn std::error::Error>> {
        let root = resolve_project_root(global)?;
        let config = match global.config.as_deref().map(Path::new) {
            Some(file) if file.is_file() => strata_config::load_config_file(file)?,
            _ => strata_config::load_config(&root)?,
        };
        Ok(Self { root, config })
    }

    /// The graph file: `--graph` if given, else `project.graph` under the root.
    pub fn graph_path(&self, global: &GlobalArgs) -> PathBuf {
        match &global.graph {
            Some(path) => PathBuf::from(path),
            None => self.root.join(&self.config.project.graph),
        }
    }

    /// The cache layout rooted at `cache.directory`.
    pub fn cache_directories(&self) -> CacheDirectories {
        CacheDirectories::new(self.root.join(&self.config.cache.directory))
    }
}

/// Reads a graph from a JSON file.
pub fn load_graph(path: &Path) -> Result<Graph, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read graph {}: {e}", path.display()))?;
    let graph = serde_json::from_str(&content)
        .map_err(|e| format!("failed to parse graph {}: {e}", path.display()))?;
    Ok(graph)
}

/// Writes `graph` as pretty JSON to `output`, or to stdout.
pub fn write_graph(graph: &Graph, output: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(graph)?;
    match output {
        Some(path) => std::fs::write(path, json + "\n")?,
        None => println!("{json}"),
    }
    Ok(())
}

/// Converts a `--focus` argument into the focus mapper's input.
pub fn focus_targets(focus: &Option<Vec<String>>) -> Option<BTreeSet<String>> {
    focus.as_ref().map(|names| names.iter().cloned().collect())
}

/// Focus, then tree-shake.
pub fn generate_pipeline(focus: Option<BTreeSet<String>>, sink: &Arc<LogSink>) -> SequentialGraphMapper {
    SequentialGraphMapper::default()
        .with(FocusTargetsMapper::new(focus, sink.clone()))
        .with(TreeShakeMapper::new(sink.clone()))
}

/// Focus, link cached binaries, then tree-shake.
///
/// Focused targets are always built from source.
pub fn build_pipeline(
    context: &ProjectContext,
    focus: Option<BTreeSet<String>>,
    sources: BTreeSet<String>,
    sink: &Arc<LogSink>,
) -> Result<SequentialGraphMapper, Box<dyn std::error::Error>> {
    let cache = &context.config.cache;
    let directories = context.cache_directories();
    let cache_binaries = CacheBinariesMapper::new(
        Arc::new(XxhContentHasher::new()),
        Arc::new(LocalCacheStorage::new(&directories)),
        Arc::new(PrecompiledGraphMutator::new(cache.output_type)),
        sink.clone(),
    )
    .with_sources(sources)
    .with_focused(focus.clone().unwrap_or_default())
    .with_profile(context.config.cache_profile()?)
    .with_output_type(cache.output_type)
    .with_max_concurrent_fetches(cache.max_concurrent_fetches);

    Ok(SequentialGraphMapper::default()
        .with(FocusTargetsMapper::new(focus, sink.clone()))
        .with(cache_binaries)
        .with(TreeShakeMapper::new(sink.clone())))
}

/// Focus, skip unchanged tests, then tree-shake.
pub fn test_pipeline(
    context: &ProjectContext,
    focus: Option<BTreeSet<String>>,
    sink: &Arc<LogSink>,
) -> SequentialGraphMapper {
    let tests_cache = TestsCacheMapper::new(
        Arc::new(XxhContentHasher::new()),
        Arc::new(context.cache_directories()),
        Arc::new(LocalFileSystem),
        sink.clone(),
    );
    SequentialGraphMapper::default()
        .with(FocusTargetsMapper::new(focus, sink.clone()))
        .with(tests_cache)
        .with(TreeShakeMapper::new(sink.clone()))
}

/// Runs `pipeline` over `graph` and applies its side effects.
///
/// Side effects are only applied once every stage succeeded.
pub fn run_pipeline(
    pipeline: &SequentialGraphMapper,
    graph: Graph,
) -> Result<MapOutput, Box<dyn std::error::Error>> {
    let output = pipeline.run(graph)?;
    SideEffectExecutor.execute(&output.side_effects)?;
    Ok(output)
}

/// Minimum severity printed for the given flags.
pub fn min_severity(global: &GlobalArgs) -> Severity {
    if global.verbose {
        Severity::Debug
    } else if global.quiet {
        Severity::Error
    } else {
        Severity::Info
    }
}

/// Renders and drains every message in `sink` to stderr.
///
/// Returns the number of messages printed.
pub fn render_log(sink: &LogSink, global: &GlobalArgs) -> usize {
    let renderer = TerminalRenderer::new(min_severity(global), global.color);
    let mut printed = 0;
    for message in sink.take_all() {
        if let Some(line) = renderer.render(&message) {
            eprintln!("{line}");
            printed += 1;
        }
    }
    printed
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use strata_graph::{Product, Project, Scheme, Target};

    /// Project path used by command tests.
    pub const PROJECT: &str = "/app";

    /// App -> Core -> Utils, CoreTests -> Core, Extra unreferenced.
    pub fn graph() -> Graph {
        let mut project = Project::test(
            PROJECT,
            vec![
                Target::test_with_product("App", Product::App),
                Target::test("Core"),
                Target::test("Utils"),
                Target::test_with_product("CoreTests", Product::UnitTests),
                Target::test("Extra"),
            ],
        );
        project.schemes = vec![
            Scheme::test("App", PROJECT, &["App"]),
            Scheme::test("CoreTests", PROJECT, &["CoreTests"]),
        ];
        Graph::test(vec![project])
            .with_test_edge(PROJECT, "App", "Core")
            .with_test_edge(PROJECT, "Core", "Utils")
            .with_test_edge(PROJECT, "CoreTests", "Core")
    }

    /// Writes `strata.toml` and `graph.json` into `dir` and returns quiet
    /// global args pointing at it.
    pub fn project_dir(dir: &Path) -> GlobalArgs {
        std::fs::write(
            dir.join(CONFIG_FILE_NAME),
            "[project]\nname = \"App\"\n\n[cache]\ndirectory = \"cache\"\n",
        )
        .unwrap();
        std::fs::write(
            dir.join("graph.json"),
            serde_json::to_string(&graph()).unwrap(),
        )
        .unwrap();
        GlobalArgs {
            quiet: true,
            verbose: false,
            color: false,
            config: Some(dir.join(CONFIG_FILE_NAME).to_string_lossy().into_owned()),
            graph: None,
        }
    }

    /// Reads a graph written by a command.
    pub fn read_output(path: &Path) -> Graph {
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    /// Target names of the fixture project in `graph`, in order.
    pub fn target_names(graph: &Graph) -> Vec<String> {
        graph
            .projects
            .get(Path::new(PROJECT))
            .map(|p| p.targets.iter().map(|t| t.name.clone()).collect())
            .unwrap_or_default()
    }
}
