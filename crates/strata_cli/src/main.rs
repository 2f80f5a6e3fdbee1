//! Strata CLI: the command-line interface for the Strata graph pipeline.
//!
//! Provides `strata generate` to focus and tree-shake a graph, `strata build`
//! to additionally link cached binaries, `strata test` to skip unchanged
//! tests, and `strata cache print-hashes` to inspect target hashes.

#![warn(missing_docs)]

mod build;
mod cache;
mod generate;
mod pipeline;
mod test;

use std::process;

use clap::{Parser, Subcommand, ValueEnum};

/// Strata: reshapes build-target graphs before project generation.
#[derive(Parser, Debug)]
#[command(name = "strata", version, about = "Strata build graph pipeline")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Control colored output.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Path to a custom `strata.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Path to the graph JSON (defaults to `project.graph` from the config).
    #[arg(long, global = true)]
    pub graph: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Focus the graph and remove everything outside the focus.
    Generate(GenerateArgs),
    /// Like `generate`, and link cached binaries for unchanged targets.
    Build(BuildArgs),
    /// Like `generate`, and skip tests that passed and have not changed.
    Test(TestArgs),
    /// Inspect the binary cache.
    #[command(subcommand)]
    Cache(CacheCommand),
}

/// Arguments for the `strata generate` subcommand.
#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// Target names to focus on. Without values, every target is pruned.
    #[arg(long, num_args = 0..)]
    pub focus: Option<Vec<String>>,

    /// Write the resulting graph here instead of stdout.
    #[arg(short, long)]
    pub output: Option<String>,
}

/// Arguments for the `strata build` subcommand.
#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Target names to focus on.
    #[arg(long, num_args = 0..)]
    pub focus: Option<Vec<String>>,

    /// Target names that must be built from source.
    #[arg(long, num_args = 1..)]
    pub source: Vec<String>,

    /// Write the resulting graph here instead of stdout.
    #[arg(short, long)]
    pub output: Option<String>,
}

/// Arguments for the `strata test` subcommand.
#[derive(Parser, Debug)]
pub struct TestArgs {
    /// Target names to focus on.
    #[arg(long, num_args = 0..)]
    pub focus: Option<Vec<String>>,

    /// Write the resulting graph here instead of stdout.
    #[arg(short, long)]
    pub output: Option<String>,
}

/// `strata cache` subcommands.
#[derive(Subcommand, Debug)]
pub enum CacheCommand {
    /// Print the content hash of every target.
    PrintHashes,
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Detect from terminal capabilities.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Whether to use colored output.
    pub color: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
    /// Optional path to the graph JSON.
    pub graph: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let color = match cli.color {
        ColorChoice::Auto => std::env::var("TERM").is_ok(),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        color,
        config: cli.config,
        graph: cli.graph,
    };

    let result = match cli.command {
        Command::Generate(ref args) => generate::run(args, &global),
        Command::Build(ref args) => build::run(args, &global),
        Command::Test(ref args) => test::run(args, &global),
        Command::Cache(CacheCommand::PrintHashes) => cache::print_hashes(&global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
