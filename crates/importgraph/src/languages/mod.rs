//! Import scanning.
//!
//! A scanner turns one file into the ordered list of imports it declares. The
//! graph builder only sees the `ImportScanner` trait; `python` provides the
//! tree-sitter implementation used by the CLI.
//!
//! ## Adding a New Language
//!
//! 1. Create a module (e.g., `ruby.rs`) with a scanner type
//! 2. Implement `ImportScanner` for it
//! 3. Pair it with a resolver that understands its specifiers

pub mod python;
mod tree_sitter_utils;

use std::path::Path;

use crate::error::ScanError;
use crate::types::Import;

/// Extracts raw import specifiers from a file.
///
/// Implementations must be pure functions of file content: the builder may
/// call `scan` for several files at once from worker threads, and never
/// scans the same file twice.
pub trait ImportScanner: Send + Sync {
    /// Imports declared by `path`, in source order.
    ///
    /// # Errors
    ///
    /// A [`ScanError`] for the file when it cannot be read, decoded or parsed.
    /// The builder records it and does not expand the file.
    fn scan(&self, path: &Path) -> Result<Vec<Import>, ScanError>;
}
