//! Worklist traversal that builds the dependency graph.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       Builder::run                            │
//! ├──────────────────────────────────────────────────────────────┤
//! │  Wave (Parallel):    rayon::par_iter() scan + resolve         │
//! │  Apply (Sequential): nodes, edges, broken deps, enqueue       │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The queue is FIFO. Each wave takes everything queued so far, scans it on
//! worker threads, then applies the results one file at a time in queue
//! order. Files discovered while applying go to the back of the queue and
//! form the next wave, so the graph comes out exactly as a one-at-a-time
//! FIFO traversal would build it.
//!
//! Only the apply step touches the graph; workers own nothing but their
//! results.
//!
//! `TraversalState` outlives a single run. A file scanned without expansion
//! (`ImportGraph::add_file`) remembers its source targets, so a later
//! expanding run picks them up. Files a cancelled run had queued but not
//! applied are handed back and queued again by the next expanding run.

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, trace, warn};

use crate::config::Config;
use crate::error::ScanError;
use crate::graph::DependencyGraph;
use crate::languages::ImportScanner;
use crate::resolver::ImportResolver;
use crate::types::{BrokenDependencies, FileKind, Resolution, TraversalStats};

/// Scan-and-resolve result for one file, built on a worker thread.
#[derive(Debug)]
struct ScannedFile {
    path: PathBuf,
    outcome: Result<Vec<ResolvedImport>, ScanError>,
}

#[derive(Debug)]
struct ResolvedImport {
    specifier: String,
    outcome: ImportOutcome,
}

#[derive(Debug)]
enum ImportOutcome {
    Resolved(PathBuf),
    Unresolved,
    Failed(ScanError),
}

/// What earlier runs left behind for later ones.
#[derive(Debug, Default)]
pub(crate) struct TraversalState {
    /// Files scanned or queued for scanning
    visited: HashSet<PathBuf>,
    /// Source targets of files that were scanned but not expanded
    unexpanded: HashMap<PathBuf, Vec<PathBuf>>,
    /// Files a cancelled run queued but never applied
    interrupted: Vec<PathBuf>,
}

impl TraversalState {
    /// Undo a seed that failed to scan, so a later run tries it again.
    pub fn forget(&mut self, path: &Path) {
        self.visited.remove(path);
        self.unexpanded.remove(path);
    }
}

/// Mutable traversal state, borrowed from the owning `ImportGraph`.
pub(crate) struct Builder<'a> {
    pub graph: &'a mut DependencyGraph,
    pub broken: &'a mut BrokenDependencies,
    pub state: &'a mut TraversalState,
    pub scanner: &'a dyn ImportScanner,
    pub resolver: &'a dyn ImportResolver,
    pub config: &'a Config,
}

impl Builder<'_> {
    /// Traverse from `seeds`.
    ///
    /// With `expand` false only the seeds themselves are scanned; their
    /// targets get nodes and edges but are not queued. An expanding run
    /// skips seeds that were already expanded, and expands seeds that were
    /// only scanned. `cancel` is checked before every wave and before
    /// applying each file; a cancelled run leaves a consistent partial graph
    /// and hands its unapplied files to the next expanding run.
    pub fn run(&mut self, seeds: &[PathBuf], expand: bool, cancel: &AtomicBool) -> TraversalStats {
        let start = Instant::now();
        let mut stats = TraversalStats::default();
        let mut queue: VecDeque<PathBuf> = VecDeque::new();

        for seed in seeds {
            self.graph.add_file(seed.clone(), FileKind::Source);
            if expand {
                self.enqueue(seed.clone(), &mut queue);
            } else if self.state.visited.insert(seed.clone()) {
                queue.push_back(seed.clone());
            } else {
                debug!(file = %seed.display(), "Seed already scanned, skipping");
            }
        }
        if expand && !self.state.interrupted.is_empty() {
            let resumed = std::mem::take(&mut self.state.interrupted);
            debug!(files = resumed.len(), "Resuming cancelled traversal");
            for path in resumed {
                self.enqueue(path, &mut queue);
            }
        }

        let mut wave_number = 0;
        'waves: while !queue.is_empty() {
            if cancel.load(Ordering::Relaxed) {
                stats.cancelled = true;
                break;
            }

            wave_number += 1;
            let wave: Vec<PathBuf> = queue.drain(..).collect();
            debug!(wave = wave_number, files = wave.len(), "Scanning wave");
            let mut scanned = self.scan_wave(&wave).into_iter();

            while let Some(file) = scanned.next() {
                if cancel.load(Ordering::Relaxed) {
                    stats.cancelled = true;
                    let unapplied =
                        std::iter::once(file.path).chain(scanned.by_ref().map(|f| f.path));
                    self.interrupt(unapplied);
                    break 'waves;
                }
                self.apply(file, expand, &mut queue, &mut stats);
            }
        }

        if stats.cancelled {
            self.interrupt(queue.drain(..));
            debug!(
                pending = self.state.interrupted.len(),
                scanned = stats.files_scanned,
                "Traversal cancelled"
            );
        }
        stats.duration = start.elapsed();
        stats
    }

    /// Queue `path` for an expanding run.
    ///
    /// A file already visited is not queued again, but if it was only
    /// scanned, its remembered source targets are queued in its place.
    fn enqueue(&mut self, path: PathBuf, queue: &mut VecDeque<PathBuf>) {
        let mut pending = vec![path];
        while let Some(path) = pending.pop() {
            if self.state.visited.insert(path.clone()) {
                queue.push_back(path);
            } else if let Some(targets) = self.state.unexpanded.remove(&path) {
                trace!(
                    file = %path.display(),
                    targets = targets.len(),
                    "Expanding scanned file"
                );
                pending.extend(targets.into_iter().rev());
            }
        }
    }

    /// Give files back so a later run scans them.
    fn interrupt(&mut self, paths: impl IntoIterator<Item = PathBuf>) {
        for path in paths {
            if self.state.visited.remove(&path) {
                self.state.interrupted.push(path);
            }
        }
    }

    fn scan_wave(&self, wave: &[PathBuf]) -> Vec<ScannedFile> {
        let scanner = self.scanner;
        let resolver = self.resolver;
        if self.config.parallel && wave.len() > 1 {
            wave.par_iter()
                .map(|path| scan_file(scanner, resolver, path))
                .collect()
        } else {
            wave.iter()
                .map(|path| scan_file(scanner, resolver, path))
                .collect()
        }
    }

    fn apply(
        &mut self,
        file: ScannedFile,
        expand: bool,
        queue: &mut VecDeque<PathBuf>,
        stats: &mut TraversalStats,
    ) {
        let imports = match file.outcome {
            Ok(imports) => imports,
            Err(error) => {
                warn!(file = %file.path.display(), error = %error.message, "Skipping file");
                stats.errors.push(error);
                return;
            }
        };

        stats.files_scanned += 1;
        let from = self.graph.add_file(file.path.clone(), FileKind::Source);
        let mut unexpanded = Vec::new();

        for import in imports {
            match import.outcome {
                ImportOutcome::Resolved(target) => {
                    let kind = self.config.file_kind(&target);
                    let is_new = !self.graph.contains_file(&target);
                    let to = self.graph.add_file(target.clone(), kind);
                    if self.graph.add_edge(from, to) {
                        stats.edges_added += 1;
                    }
                    match kind {
                        FileKind::Source if expand => self.enqueue(target, queue),
                        FileKind::Source => unexpanded.push(target),
                        FileKind::TargetOnly if is_new => stats.target_only += 1,
                        FileKind::TargetOnly => {}
                    }
                }
                ImportOutcome::Unresolved => {
                    trace!(
                        file = %file.path.display(),
                        import = %import.specifier,
                        "Unresolved import"
                    );
                    self.broken
                        .entry(file.path.clone())
                        .or_default()
                        .insert(import.specifier);
                    stats.broken_imports += 1;
                }
                ImportOutcome::Failed(error) => {
                    warn!(
                        file = %file.path.display(),
                        import = %import.specifier,
                        error = %error.message,
                        "Resolver failed"
                    );
                    stats.errors.push(error);
                }
            }
        }

        if !unexpanded.is_empty() {
            self.state.unexpanded.insert(file.path, unexpanded);
        }
    }
}

/// Scan one file and resolve each of its imports.
///
/// A resolver error on one import does not stop the others.
fn scan_file(scanner: &dyn ImportScanner, resolver: &dyn ImportResolver, path: &Path) -> ScannedFile {
    let outcome = scanner.scan(path).map(|imports| {
        imports
            .into_iter()
            .map(|import| {
                let specifier = import.specifier();
                let outcome = match resolver.resolve(path, &import) {
                    Ok(Resolution::Resolved(target)) => ImportOutcome::Resolved(target),
                    Ok(Resolution::Unresolved) => ImportOutcome::Unresolved,
                    Err(e) => ImportOutcome::Failed(ScanError::resolve_failed(
                        path.to_path_buf(),
                        &specifier,
                        &e,
                    )),
                };
                ResolvedImport { specifier, outcome }
            })
            .collect()
    });

    ScannedFile {
        path: path.to_path_buf(),
        outcome,
    }
}
