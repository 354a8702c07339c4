//! importgraph CLI - import graphs and build order from the command line.
//!
//! Follows the imports of the given Python files and prints the resulting
//! graph, its cycles, the files that could not be resolved, or the order in
//! which the files can be processed.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

mod cli;

/// importgraph: file-level import graphs and build order for Python sources.
#[derive(Parser)]
#[command(name = "importgraph")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file (defaults to ./importgraph.yaml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory searched for absolute imports (can be repeated)
    #[arg(short = 'P', long = "search-path", global = true)]
    search_paths: Vec<PathBuf>,

    /// Location of stub-only packages (e.g., a typeshed checkout)
    #[arg(short = 'T', long = "stubs", global = true)]
    stub_root: Option<PathBuf>,

    /// Scan files on a single thread
    #[arg(long, global = true)]
    no_parallel: bool,

    /// Emit JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Inputs {
    /// Seed files to start from
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print build units, dependencies first
    Deps(Inputs),

    /// Print every import edge, including unresolved imports
    Graph(Inputs),

    /// Print the dependency tree
    Tree(Inputs),

    /// Print files and cycles in topological order, dependents first
    Sorted(Inputs),

    /// Print imports that could not be resolved
    Unresolved(Inputs),

    /// Print import cycles
    Cycles(Inputs),

    /// Print the effective configuration, after file and flag overrides
    Config,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let options = cli::Options {
        config: cli.config,
        search_paths: cli.search_paths,
        stub_root: cli.stub_root,
        no_parallel: cli.no_parallel,
        json: cli.json,
    };

    let result = match cli.command {
        Commands::Deps(inputs) => cli::deps::run(&options, &inputs.files),
        Commands::Graph(inputs) => cli::graph::run(&options, &inputs.files),
        Commands::Tree(inputs) => cli::tree::run(&options, &inputs.files),
        Commands::Sorted(inputs) => cli::sorted::run(&options, &inputs.files),
        Commands::Unresolved(inputs) => cli::unresolved::run(&options, &inputs.files),
        Commands::Cycles(inputs) => cli::cycles::run(&options, &inputs.files),
        Commands::Config => cli::config::run(&options),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {e}", "error".red().bold());
            // Show cause chain for nested errors
            let mut source = std::error::Error::source(&e);
            while let Some(cause) = source {
                eprintln!("  {}: {cause}", "caused by".dimmed());
                source = std::error::Error::source(cause);
            }
            ExitCode::FAILURE
        }
    }
}
