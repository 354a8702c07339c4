//! Error types for importgraph operations.
//!
//! Errors are split in two:
//!
//! - **`Error`**: Top-level errors that halt an operation (a seed that cannot
//!   be scanned, bad configuration, a graph handed to the sequencer with a
//!   cycle still in it)
//! - **`ScanError`**: File-scoped errors that are collected during traversal
//!   but don't stop it
//!
//! Unresolved imports are neither. They are expected, and land in the
//! broken-dependency registry.
//!
//! `ScanErrorKind` uses a 4xx/5xx style categorization:
//! - Input problems: undecodable or unparseable source files
//! - Internal problems: I/O failures while reading or resolving

use std::path::PathBuf;
use thiserror::Error;

/// Result type for importgraph operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for importgraph operations.
#[derive(Debug, Error)]
pub enum Error {
    /// File system operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Tree-sitter parsing infrastructure failed
    #[error("parser error: {0}")]
    Parser(String),

    /// Invalid configuration or arguments
    #[error("configuration error: {0}")]
    Config(String),

    /// A traversal root could not be scanned
    #[error("cannot scan {}", path.display())]
    Scan {
        /// The seed file
        path: PathBuf,
        /// What went wrong
        #[source]
        source: ScanError,
    },

    /// The sequencer was handed a graph that still contains a cycle.
    ///
    /// Collapsing always runs before sequencing, so this is a bug.
    #[error("graph still contains a cycle through {remaining} node(s)")]
    GraphNotAcyclic {
        /// Number of nodes Kahn's algorithm could not place
        remaining: usize,
    },
}

/// Error encountered while scanning or resolving imports of one file.
///
/// These are collected during traversal. The file keeps its node in the graph
/// but its subtree is not expanded.
#[derive(Debug, Clone)]
pub struct ScanError {
    /// Path to the file that failed
    pub path: PathBuf,
    /// Category of the error
    pub kind: ScanErrorKind,
    /// Human-readable error message
    pub message: String,
}

impl std::fmt::Display for ScanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} ({})",
            self.path.display(),
            self.message,
            self.kind
        )
    }
}

impl std::error::Error for ScanError {}

/// Categorization of scan errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanErrorKind {
    // === Input Problems (analogous to HTTP 4xx) ===
    /// Tree-sitter could not produce a syntax tree
    ParseFailed,

    /// File content is not valid UTF-8
    EncodingError,

    // === Internal Problems (analogous to HTTP 5xx) ===
    /// Could not read the file from disk
    ReadFailed,

    /// The resolver hit an error other than "not found"
    ResolveFailed,
}

impl std::fmt::Display for ScanErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ParseFailed => write!(f, "parse failed"),
            Self::EncodingError => write!(f, "encoding error"),
            Self::ReadFailed => write!(f, "read failed"),
            Self::ResolveFailed => write!(f, "resolve failed"),
        }
    }
}

impl ScanErrorKind {
    /// Returns `true` if this is an input problem (4xx-style).
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::ParseFailed | Self::EncodingError)
    }

    /// Returns `true` if this is an internal problem (5xx-style).
    #[must_use]
    pub fn is_internal_error(&self) -> bool {
        matches!(self, Self::ReadFailed | Self::ResolveFailed)
    }
}

impl ScanError {
    /// Create a new scan error.
    #[must_use]
    pub fn new(path: PathBuf, kind: ScanErrorKind, message: impl Into<String>) -> Self {
        Self {
            path,
            kind,
            message: message.into(),
        }
    }

    /// Create a parse error for a file.
    #[must_use]
    pub fn parse_failed(path: PathBuf, message: impl Into<String>) -> Self {
        Self::new(path, ScanErrorKind::ParseFailed, message)
    }

    /// Create an encoding error for a file.
    #[must_use]
    pub fn encoding_error(path: PathBuf) -> Self {
        Self::new(path, ScanErrorKind::EncodingError, "file is not valid UTF-8")
    }

    /// Create a read error for a file.
    #[must_use]
    pub fn read_failed(path: PathBuf, error: &std::io::Error) -> Self {
        Self::new(path, ScanErrorKind::ReadFailed, error.to_string())
    }

    /// Create a resolver error for one import of a file.
    #[must_use]
    pub fn resolve_failed(path: PathBuf, specifier: &str, error: &Error) -> Self {
        Self::new(
            path,
            ScanErrorKind::ResolveFailed,
            format!("resolving `{specifier}`: {error}"),
        )
    }
}
