//! CLI command implementations.

mod display;

pub mod config;
pub mod cycles;
pub mod deps;
pub mod graph;
pub mod sorted;
pub mod tree;
pub mod unresolved;

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;

use importgraph::{Config, ImportGraph};

/// Flags shared by every command.
pub struct Options {
    pub config: Option<PathBuf>,
    pub search_paths: Vec<PathBuf>,
    pub stub_root: Option<PathBuf>,
    pub no_parallel: bool,
    pub json: bool,
}

impl Options {
    /// Configuration file (or defaults) with command-line overrides applied.
    fn resolve_config(&self) -> Result<Config, importgraph::Error> {
        let cwd = std::env::current_dir()?;
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::discover(&cwd)?,
        };

        if !self.search_paths.is_empty() {
            config.search_paths.clone_from(&self.search_paths);
        }
        if let Some(stub_root) = &self.stub_root {
            config.stub_root = Some(stub_root.clone());
        }
        if self.no_parallel {
            config.parallel = false;
        }
        if config.search_paths.is_empty() {
            config.search_paths.push(cwd.clone());
        }
        Ok(config.relative_to(&cwd))
    }
}

/// Build the import graph for `files`, reporting per-file problems on stderr.
fn load_graph(options: &Options, files: &[PathBuf]) -> Result<ImportGraph, importgraph::Error> {
    let config = options.resolve_config()?;
    let mut graph = ImportGraph::new(config)?;

    let stats = graph.add_files_recursive(files, &AtomicBool::new(false))?;
    display::print_scan_errors(&stats.errors);

    Ok(graph)
}
