//! Domain types shared between the graph core and its collaborators.
//!
//! - **Inputs**: `Import` (what a scanner yields), `Resolution` (what a
//!   resolver answers)
//! - **Node metadata**: `FileKind`
//! - **Results**: `BuildUnit`, `TraversalStats`
//!
//! ## Design Decisions
//!
//! | Decision | Choice | Rationale |
//! |----------|--------|-----------|
//! | Unresolved import | `Resolution::Unresolved` variant | "Not found" is expected; errors stay errors |
//! | Specifier text | Rendered from `Import` | One spelling for the broken registry and reports |
//! | Build unit | Ordered file list | Cycle members keep the order the cycle was found in |

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ScanError;

/// A raw import specifier extracted from a source file.
///
/// Covers both statement forms:
///
/// | Source | `level` | `module` | `member` |
/// |--------|---------|----------|----------|
/// | `import a.b` | 0 | `a.b` | `None` |
/// | `from a import b` | 0 | `a` | `Some("b")` |
/// | `from . import x` | 1 | `""` | `Some("x")` |
/// | `from ..pkg import *` | 2 | `pkg` | `None`, `is_wildcard` |
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Import {
    /// Dotted module path, without the leading dots of a relative import
    pub module: String,
    /// Number of leading dots (0 for absolute imports)
    pub level: u32,
    /// Name imported from the module, for `from` imports
    pub member: Option<String>,
    /// Whether this is `from x import *`
    pub is_wildcard: bool,
    /// Line number (1-indexed, 0 when unknown)
    pub line: u32,
}

impl Import {
    /// An `import a.b.c` style import. Leading dots mark a relative import.
    #[must_use]
    pub fn module(name: &str) -> Self {
        let (level, module) = split_level(name);
        Self {
            module: module.to_string(),
            level,
            member: None,
            is_wildcard: false,
            line: 0,
        }
    }

    /// A `from module import member` style import.
    #[must_use]
    pub fn from_import(module: &str, member: &str) -> Self {
        Self {
            member: Some(member.to_string()),
            ..Self::module(module)
        }
    }

    /// A `from module import *` style import.
    #[must_use]
    pub fn wildcard(module: &str) -> Self {
        Self {
            is_wildcard: true,
            ..Self::module(module)
        }
    }

    /// Attach the source line.
    #[must_use]
    pub fn at_line(mut self, line: u32) -> Self {
        self.line = line;
        self
    }

    /// Whether this import is relative to the importing file.
    #[must_use]
    pub fn is_relative(&self) -> bool {
        self.level > 0
    }

    /// The specifier as recorded in the broken-dependency registry.
    #[must_use]
    pub fn specifier(&self) -> String {
        self.to_string()
    }
}

fn split_level(name: &str) -> (u32, &str) {
    let module = name.trim_start_matches('.');
    #[allow(clippy::cast_possible_truncation)] // nobody writes four billion dots
    let level = (name.len() - module.len()) as u32;
    (level, module)
}

impl fmt::Display for Import {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for _ in 0..self.level {
            f.write_str(".")?;
        }
        f.write_str(&self.module)?;
        if let Some(member) = &self.member {
            if !self.module.is_empty() {
                f.write_str(".")?;
            }
            f.write_str(member)?;
        }
        Ok(())
    }
}

/// Outcome of resolving one import.
///
/// Only "not found" is reported as `Unresolved`. Any other failure comes back
/// as an `Err` from the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The import maps to this absolute path
    Resolved(PathBuf),
    /// Nothing on the search path provides the import
    Unresolved,
}

/// Unresolved specifiers per importing file.
///
/// Entries are only ever added. A file is scanned once, so its set is fixed
/// after its first scan.
pub type BrokenDependencies = BTreeMap<PathBuf, BTreeSet<String>>;

/// Whether a file node is expanded during traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    /// A source file: its own imports are followed
    Source,
    /// A stub or compiled artifact: an edge target, never expanded
    TargetOnly,
}

impl FileKind {
    /// Returns `true` for source files.
    #[must_use]
    pub fn is_source(self) -> bool {
        matches!(self, Self::Source)
    }
}

/// One item of the processing order.
///
/// Either a single source file or every file of a collapsed cycle, in the
/// order the cycle was recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildUnit {
    files: Vec<PathBuf>,
    cycle: bool,
}

impl BuildUnit {
    /// A unit holding one file.
    #[must_use]
    pub fn single(path: PathBuf) -> Self {
        Self {
            files: vec![path],
            cycle: false,
        }
    }

    /// A unit holding the flattened members of a cycle.
    #[must_use]
    pub fn cycle(files: Vec<PathBuf>) -> Self {
        Self { files, cycle: true }
    }

    /// Files in this unit.
    #[must_use]
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Consume the unit, returning its files.
    #[must_use]
    pub fn into_files(self) -> Vec<PathBuf> {
        self.files
    }

    /// Whether the unit came from a collapsed cycle.
    #[must_use]
    pub fn is_cycle(&self) -> bool {
        self.cycle
    }
}

/// Statistics from a traversal run.
#[derive(Debug, Clone, Default)]
pub struct TraversalStats {
    /// Source files whose imports were scanned
    pub files_scanned: usize,
    /// Edges that were new to the graph
    pub edges_added: usize,
    /// Imports that went to the broken-dependency registry
    pub broken_imports: usize,
    /// Resolved targets that are never expanded (stubs, compiled modules)
    pub target_only: usize,
    /// File-scoped errors; the traversal continued past each of them
    pub errors: Vec<ScanError>,
    /// Wall-clock time of the traversal
    pub duration: Duration,
    /// Whether the caller stopped the traversal early
    pub cancelled: bool,
}
