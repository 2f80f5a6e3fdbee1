//! `strata build`: focus, link cached binaries, and tree-shake.
//!
//! 1. Find the project root and load `strata.toml`
//! 2. Load the graph JSON
//! 3. Run focus → cache-binaries → tree-shake
//! 4. Write the resulting graph

use std::collections::BTreeSet;
use std::sync::Arc;

use strata_diagnostics::LogSink;

use crate::pipeline::{
    build_pipeline, focus_targets, load_graph, render_log, run_pipeline, write_graph,
    ProjectContext,
};
use crate::{BuildArgs, GlobalArgs};

/// Runs the `strata build` command.
///
/// Returns exit code 0 on success.
pub fn run(args: &BuildArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let context = ProjectContext::load(global)?;
    let graph = load_graph(&context.graph_path(global))?;
    let targets_before = graph.target_references().count();

    if !global.quiet {
        let cache = &context.config.cache;
        eprintln!(
            "  Building {} (profile {}, {})",
            context.config.project.name, cache.profile, cache.output_type
        );
    }

    let sink = Arc::new(LogSink::new());
    let sources: BTreeSet<String> = args.source.iter().cloned().collect();
    let pipeline = build_pipeline(&context, focus_targets(&args.focus), sources, &sink)?;
    let result = run_pipeline(&pipeline, graph);
    render_log(&sink, global);
    let output = result?;

    if !global.quiet {
        let remaining = output.graph.target_references().count();
        eprintln!("  Kept {remaining} of {targets_before} targets as sources");
    }

    write_graph(&output.graph, args.output.as_deref())?;
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::fixtures;
    use std::path::Path;
    use strata_cache::{CacheDirectories, LocalCacheStorage, XxhContentHasher};
    use strata_graph::{GraphDependency, TargetReference};
    use strata_mapper::{CacheOutputType, CacheProfile, HashRequest};
    use tempfile::TempDir;

    fn args(sources: &[&str], output: &Path) -> BuildArgs {
        BuildArgs {
            focus: None,
            source: sources.iter().map(|s| s.to_string()).collect(),
            output: Some(output.to_string_lossy().into_owned()),
        }
    }

    fn store_binary(cache_root: &Path, name: &str) {
        let request = HashRequest::default()
            .with_profile(CacheProfile::development())
            .with_output_type(CacheOutputType::Framework);
        let hashes = XxhContentHasher::new()
            .hash_graph(&fixtures::graph(), &request)
            .unwrap();
        let hash = hashes[&TargetReference::new(fixtures::PROJECT, name)].to_string();
        LocalCacheStorage::new(&CacheDirectories::new(cache_root))
            .store(name, &hash, &[])
            .unwrap();
    }

    #[test]
    fn cached_dependency_is_linked_as_binary() {
        let tmp = TempDir::new().unwrap();
        let global = fixtures::project_dir(tmp.path());
        store_binary(&tmp.path().join("cache"), "Utils");

        let out = tmp.path().join("out.json");
        assert_eq!(run(&args(&[], &out), &global).unwrap(), 0);

        let graph = fixtures::read_output(&out);
        assert_eq!(
            fixtures::target_names(&graph),
            vec!["App", "Core", "CoreTests", "Extra"]
        );
        let core_edges = &graph.dependencies[&TargetReference::new(fixtures::PROJECT, "Core")];
        assert!(core_edges
            .iter()
            .all(|e| matches!(e, GraphDependency::Precompiled { name, .. } if name == "Utils")));
    }

    #[test]
    fn focused_target_is_built_from_source() {
        let tmp = TempDir::new().unwrap();
        let global = fixtures::project_dir(tmp.path());
        store_binary(&tmp.path().join("cache"), "Core");
        store_binary(&tmp.path().join("cache"), "Utils");

        let out = tmp.path().join("out.json");
        let mut build = args(&[], &out);
        build.focus = Some(vec!["Core".to_string()]);
        run(&build, &global).unwrap();

        let graph = fixtures::read_output(&out);
        assert_eq!(fixtures::target_names(&graph), vec!["Core", "CoreTests"]);
        let core_edges = &graph.dependencies[&TargetReference::new(fixtures::PROJECT, "Core")];
        assert!(core_edges
            .iter()
            .all(|e| matches!(e, GraphDependency::Precompiled { name, .. } if name == "Utils")));
    }

    #[test]
    fn nothing_cached_keeps_every_target() {
        let tmp = TempDir::new().unwrap();
        let global = fixtures::project_dir(tmp.path());
        let out = tmp.path().join("out.json");
        run(&args(&[], &out), &global).unwrap();
        assert_eq!(fixtures::read_output(&out), fixtures::graph());
    }

    #[test]
    fn unknown_source_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let global = fixtures::project_dir(tmp.path());
        let out = tmp.path().join("out.json");
        let err = run(&args(&["Nope"], &out), &global).unwrap_err();
        assert!(err.to_string().contains("the following targets were not found: Nope"));
        assert!(!out.exists());
    }
}
