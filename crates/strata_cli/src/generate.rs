//! `strata generate`: focus the graph and tree-shake it.
//!
//! 1. Find the project root and load `strata.toml`
//! 2. Load the graph JSON
//! 3. Run focus → tree-shake
//! 4. Write the resulting graph

use std::sync::Arc;

use strata_diagnostics::LogSink;

use crate::pipeline::{
    focus_targets, generate_pipeline, load_graph, render_log, run_pipeline, write_graph,
    ProjectContext,
};
use crate::{GenerateArgs, GlobalArgs};

/// Runs the `strata generate` command.
///
/// Returns exit code 0 on success.
pub fn run(args: &GenerateArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let context = ProjectContext::load(global)?;
    let graph = load_graph(&context.graph_path(global))?;

    if !global.quiet {
        eprintln!("  Generating {}", context.config.project.name);
    }

    let sink = Arc::new(LogSink::new());
    let pipeline = generate_pipeline(focus_targets(&args.focus), &sink);
    let result = run_pipeline(&pipeline, graph);
    render_log(&sink, global);
    let output = result?;

    write_graph(&output.graph, args.output.as_deref())?;
    Ok(0)
}
