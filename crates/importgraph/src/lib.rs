//! # importgraph: Import Graphs and Build Order for Python Source Trees
//!
//! importgraph follows the imports of a set of seed files, builds the
//! file-level dependency graph, folds every import cycle into a single
//! composite node and hands back the order in which files can be processed so
//! that each file comes after everything it imports.
//!
//! ## Design Philosophy
//!
//! - **Graph core, pluggable edges** - Scanning and resolution sit behind the
//!   `ImportScanner` and `ImportResolver` traits; the core never parses
//! - **No silent cycles** - Every cycle ends up inside a build unit
//! - **Stable output** - Same tree in, same order out, independent of thread
//!   scheduling
//! - **Best effort** - A broken import or an unreadable file is recorded and
//!   the traversal carries on
//!
//! ## Quick Start
//!
//! ```no_run
//! use importgraph::{Config, ImportGraph};
//! use std::path::Path;
//!
//! let config = Config {
//!     search_paths: vec!["/path/to/project".into()],
//!     ..Config::default()
//! };
//! let mut graph = ImportGraph::new(config)?;
//!
//! let stats = graph.add_file_recursive(Path::new("/path/to/project/main.py"))?;
//! println!("Scanned {} files", stats.files_scanned);
//!
//! for unit in graph.build_units()? {
//!     println!("{:?}", unit.files());
//! }
//! for (file, imports) in graph.broken_dependencies() {
//!     println!("{}: {imports:?}", file.display());
//! }
//! # Ok::<(), importgraph::Error>(())
//! ```

mod builder;
mod config;
mod error;
mod graph;
mod languages;
mod report;
mod resolver;
mod root;
mod types;

pub use config::{Config, DEFAULT_CONFIG_FILE};
pub use error::{Error, Result, ScanError, ScanErrorKind};
pub use graph::cycles::{collapse_cycles, find_cycle};
pub use graph::sequence::{sequence, topological_order};
pub use graph::{CycleNode, DependencyGraph, FileNode, Node, NodeId};
pub use languages::ImportScanner;
pub use languages::python::PythonScanner;
pub use report::{EdgeLine, NodeFormatter, TreeLine};
pub use resolver::{ImportResolver, PythonResolver};
pub use root::common_root;
pub use types::{BrokenDependencies, BuildUnit, FileKind, Import, Resolution, TraversalStats};

use std::cell::OnceCell;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;

use builder::{Builder, TraversalState};
use tracing::{debug, info};

/// Import graph of one source tree.
///
/// Owns the graph, the broken-dependency registry, the cached display root
/// and the scanner/resolver pair used to grow the graph. One instance covers
/// one invocation; nothing is persisted.
pub struct ImportGraph {
    config: Config,
    scanner: Box<dyn ImportScanner>,
    resolver: Box<dyn ImportResolver>,
    graph: DependencyGraph,
    broken: BrokenDependencies,
    traversal: TraversalState,
    root: OnceCell<PathBuf>,
}

impl std::fmt::Debug for ImportGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImportGraph")
            .field("config", &self.config)
            .field("nodes", &self.graph.node_count())
            .field("edges", &self.graph.edge_count())
            .field("broken", &self.broken.len())
            .finish_non_exhaustive()
    }
}

impl ImportGraph {
    /// Create a graph for Python sources using the tree-sitter scanner and
    /// the search-path resolver.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parser`] if the Python grammar fails to load.
    pub fn new(config: Config) -> Result<Self> {
        let scanner = PythonScanner::new()?;
        let resolver = PythonResolver::new(&config);
        Ok(Self::with_collaborators(config, scanner, resolver))
    }

    /// Create a graph with a custom scanner and resolver.
    ///
    /// `config` still decides which resolved files count as source files and
    /// whether scanning runs in parallel.
    pub fn with_collaborators(
        config: Config,
        scanner: impl ImportScanner + 'static,
        resolver: impl ImportResolver + 'static,
    ) -> Self {
        Self {
            config,
            scanner: Box::new(scanner),
            resolver: Box::new(resolver),
            graph: DependencyGraph::new(),
            broken: BrokenDependencies::new(),
            traversal: TraversalState::default(),
            root: OnceCell::new(),
        }
    }

    // === Building ===

    /// Scan one file and add its direct dependencies, without following them.
    ///
    /// A later [`ImportGraph::add_file_recursive`] on the same file follows
    /// them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Scan`] if the file cannot be scanned. The file is
    /// then left out of the graph, unless an earlier call had added it.
    pub fn add_file(&mut self, path: &Path) -> Result<TraversalStats> {
        let path = std::path::absolute(path)?;
        let known = self.graph.contains_file(&path);
        let stats = self.builder().run(std::slice::from_ref(&path), false, &AtomicBool::new(false));
        self.check_seed(&path, known, stats)
    }

    /// Scan `seed` and everything it transitively imports.
    ///
    /// Files that fail to scan below the seed are reported in
    /// [`TraversalStats::errors`] and not expanded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Scan`] if the seed itself cannot be scanned. The
    /// seed is then left out of the graph, unless an earlier call had added
    /// it; nodes added by earlier calls are untouched.
    pub fn add_file_recursive(&mut self, seed: &Path) -> Result<TraversalStats> {
        let seed = std::path::absolute(seed)?;
        let known = self.graph.contains_file(&seed);
        let stats = self.builder().run(std::slice::from_ref(&seed), true, &AtomicBool::new(false));
        let stats = self.check_seed(&seed, known, stats)?;
        info!(
            seed = %seed.display(),
            files = stats.files_scanned,
            edges = stats.edges_added,
            broken = stats.broken_imports,
            "Traversal finished"
        );
        Ok(stats)
    }

    /// Traverse from several seeds in one FIFO worklist.
    ///
    /// Setting `cancel` stops the traversal between files; whatever was built
    /// so far stays in the graph, and the next expanding call picks up the
    /// files that were left unscanned. Seeds that fail to scan are reported
    /// in [`TraversalStats::errors`] like any other file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if a seed path cannot be made absolute.
    pub fn add_files_recursive(&mut self, seeds: &[PathBuf], cancel: &AtomicBool) -> Result<TraversalStats> {
        let seeds = seeds
            .iter()
            .map(std::path::absolute)
            .collect::<std::io::Result<Vec<_>>>()?;
        let stats = self.builder().run(&seeds, true, cancel);
        info!(
            seeds = seeds.len(),
            files = stats.files_scanned,
            edges = stats.edges_added,
            broken = stats.broken_imports,
            errors = stats.errors.len(),
            cancelled = stats.cancelled,
            "Traversal finished"
        );
        Ok(stats)
    }

    fn builder(&mut self) -> Builder<'_> {
        Builder {
            graph: &mut self.graph,
            broken: &mut self.broken,
            state: &mut self.traversal,
            scanner: self.scanner.as_ref(),
            resolver: self.resolver.as_ref(),
            config: &self.config,
        }
    }

    /// Turn a failure to scan the seed itself into an error, undoing the
    /// seed's traversal bookkeeping. `known` says whether the seed had a
    /// node before this call.
    fn check_seed(
        &mut self,
        seed: &Path,
        known: bool,
        stats: TraversalStats,
    ) -> Result<TraversalStats> {
        let seed_error = stats
            .errors
            .iter()
            .find(|e| e.path == seed && e.kind != ScanErrorKind::ResolveFailed);
        let Some(error) = seed_error else {
            return Ok(stats);
        };

        self.traversal.forget(seed);
        if !known {
            self.graph.discard_file(seed);
            self.root = OnceCell::new();
        }
        Err(Error::Scan {
            path: seed.to_path_buf(),
            source: error.clone(),
        })
    }

    // === Queries ===

    /// The underlying graph.
    #[must_use]
    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// Configuration this graph was built with.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Unresolved specifiers per importing file.
    #[must_use]
    pub fn broken_dependencies(&self) -> &BrokenDependencies {
        &self.broken
    }

    /// Location of stub-only packages, if configured.
    #[must_use]
    pub fn stub_root(&self) -> Option<&Path> {
        self.config.stub_root.as_deref()
    }

    /// Common directory of all importing files, computed once and cached.
    #[must_use]
    pub fn root(&self) -> &Path {
        self.root.get_or_init(|| root::graph_root(&self.graph))
    }

    /// Like [`ImportGraph::root`], optionally dropping the cached value first.
    pub fn find_root(&mut self, recalculate: bool) -> &Path {
        if recalculate {
            self.root = OnceCell::new();
        }
        self.root()
    }

    /// Formatter for node names relative to this graph's root.
    #[must_use]
    pub fn formatter(&self) -> NodeFormatter<'_> {
        NodeFormatter::new(&self.graph, self.root(), self.stub_root())
    }

    // === Ordering ===

    /// Collapse every cycle into a composite node. Returns the number of
    /// cycle nodes created.
    pub fn collapse_cycles(&mut self) -> usize {
        let collapsed = collapse_cycles(&mut self.graph);
        if collapsed > 0 {
            debug!(collapsed, nodes = self.graph.node_count(), "Graph is now acyclic");
        }
        collapsed
    }

    /// Processing order, dependencies first.
    ///
    /// Collapses any remaining cycles first, so each cycle comes out as one
    /// unit holding all of its files.
    ///
    /// # Errors
    ///
    /// [`Error::GraphNotAcyclic`] would mean the collapser left a cycle
    /// behind; it is not expected.
    pub fn build_units(&mut self) -> Result<Vec<BuildUnit>> {
        self.collapse_cycles();
        sequence(&self.graph)
    }

    /// Topological order of the collapsed graph, dependents first.
    ///
    /// # Errors
    ///
    /// [`Error::GraphNotAcyclic`] if cycles have not been collapsed.
    pub fn topological_order(&self) -> Result<Vec<NodeId>> {
        topological_order(&self.graph)
    }
}
