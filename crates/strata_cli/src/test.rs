//! `strata test`: focus, skip unchanged tests, and tree-shake.
//!
//! Writes one ledger file per hashed target into the cache's hashes
//! directory, named after the target and holding its hash. A test runner
//! turns the hashes of passing targets into markers in the tests directory,
//! which is what later runs consult.

use std::sync::Arc;

use strata_diagnostics::LogSink;

use crate::pipeline::{
    focus_targets, load_graph, render_log, run_pipeline, test_pipeline, write_graph,
    ProjectContext,
};
use crate::{GlobalArgs, TestArgs};

/// Runs the `strata test` command.
///
/// Returns exit code 0 on success.
pub fn run(args: &TestArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let context = ProjectContext::load(global)?;
    let graph = load_graph(&context.graph_path(global))?;

    if !global.quiet {
        eprintln!("  Testing {}", context.config.project.name);
    }

    let sink = Arc::new(LogSink::new());
    let pipeline = test_pipeline(&context, focus_targets(&args.focus), &sink);
    let result = run_pipeline(&pipeline, graph);
    render_log(&sink, global);
    let output = result?;

    write_graph(&output.graph, args.output.as_deref())?;
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::fixtures;
    use std::collections::BTreeMap;
    use std::path::Path;
    use strata_cache::XxhContentHasher;
    use strata_graph::{Graph, TargetReference};
    use strata_mapper::HashRequest;
    use tempfile::TempDir;

    fn hashes() -> BTreeMap<String, String> {
        XxhContentHasher::new()
            .hash_graph(&fixtures::graph(), &HashRequest::default())
            .unwrap()
            .into_iter()
            .map(|(reference, hash)| (reference.name, hash.to_string()))
            .collect()
    }

    fn mark_passed(cache_root: &Path, names: &[&str]) {
        let tests = cache_root.join("tests");
        std::fs::create_dir_all(&tests).unwrap();
        let hashes = hashes();
        for name in names {
            std::fs::write(tests.join(&hashes[*name]), "").unwrap();
        }
    }

    fn run_test(dir: &Path) -> Graph {
        let global = fixtures::project_dir(dir);
        let out = dir.join("out.json");
        let args = TestArgs {
            focus: None,
            output: Some(out.to_string_lossy().into_owned()),
        };
        assert_eq!(run(&args, &global).unwrap(), 0);
        fixtures::read_output(&out)
    }

    fn scheme_targets(graph: &Graph, scheme: &str) -> Vec<String> {
        let project = &graph.projects[Path::new(fixtures::PROJECT)];
        project
            .schemes
            .iter()
            .find(|s| s.name == scheme)
            .map(|s| s.build_targets().iter().map(|t| t.name.clone()).collect())
            .unwrap_or_default()
    }

    #[test]
    fn writes_a_ledger_entry_per_referenced_target() {
        let tmp = TempDir::new().unwrap();
        run_test(tmp.path());

        let ledger = tmp.path().join("cache/hashes");
        let hashes = hashes();
        for name in ["App", "Core", "Utils", "CoreTests"] {
            let entry = ledger.join(name);
            assert_eq!(std::fs::read_to_string(entry).unwrap(), hashes[name]);
        }
        assert!(!ledger.join("Extra").exists());
    }

    #[test]
    fn passed_tests_are_skipped() {
        let tmp = TempDir::new().unwrap();
        mark_passed(&tmp.path().join("cache"), &["CoreTests", "Core", "Utils"]);

        let graph = run_test(tmp.path());
        assert!(scheme_targets(&graph, "CoreTests").is_empty());
        assert_eq!(scheme_targets(&graph, "App"), vec!["App"]);
    }

    #[test]
    fn changed_dependency_reruns_tests() {
        let tmp = TempDir::new().unwrap();
        mark_passed(&tmp.path().join("cache"), &["CoreTests", "Core"]);

        let graph = run_test(tmp.path());
        assert_eq!(scheme_targets(&graph, "CoreTests"), vec!["CoreTests"]);
        assert!(graph
            .target(&TargetReference::new(fixtures::PROJECT, "CoreTests"))
            .is_some());
    }
}
