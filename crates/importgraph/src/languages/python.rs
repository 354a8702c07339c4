//! Python import scanning using tree-sitter-python.
//!
//! Every `import` and `from ... import` statement in the file is reported,
//! including ones nested in functions, `try` blocks and `if TYPE_CHECKING:`
//! guards. `from __future__ import ...` is a compiler directive, not a
//! dependency, and is skipped.

use std::path::Path;

use super::ImportScanner;
use super::tree_sitter_utils::{node_line, node_text};
use crate::error::{Error, ScanError};
use crate::types::Import;

/// Tree-sitter node kind constants for the Python grammar.
mod node_kinds {
    pub const IMPORT_STATEMENT: &str = "import_statement";
    pub const IMPORT_FROM_STATEMENT: &str = "import_from_statement";
    pub const FUTURE_IMPORT_STATEMENT: &str = "future_import_statement";
    pub const ALIASED_IMPORT: &str = "aliased_import";
    pub const WILDCARD_IMPORT: &str = "wildcard_import";

    // Field names
    pub const NAME: &str = "name";
    pub const MODULE_NAME: &str = "module_name";
}

/// Scans Python source files for imports.
///
/// Parsers are not shareable across threads, so each `scan` call builds its
/// own; the grammar itself is checked once in [`PythonScanner::new`].
#[derive(Debug, Clone, Copy)]
pub struct PythonScanner;

impl PythonScanner {
    /// Create a scanner, checking that the grammar loads.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parser`] if tree-sitter rejects the grammar (ABI
    /// version mismatch).
    pub fn new() -> Result<Self, Error> {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|e| Error::Parser(e.to_string()))?;
        Ok(Self)
    }

    /// Extract imports from Python source text.
    ///
    /// # Errors
    ///
    /// Returns a parse error when tree-sitter produces no tree.
    pub fn scan_source(&self, path: &Path, source: &str) -> Result<Vec<Import>, ScanError> {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|e| ScanError::parse_failed(path.to_path_buf(), e.to_string()))?;
        let tree = parser.parse(source, None).ok_or_else(|| {
            ScanError::parse_failed(path.to_path_buf(), "tree-sitter produced no syntax tree")
        })?;

        Ok(extract_imports(&tree, source.as_bytes()))
    }
}

impl ImportScanner for PythonScanner {
    fn scan(&self, path: &Path) -> Result<Vec<Import>, ScanError> {
        let content =
            std::fs::read(path).map_err(|e| ScanError::read_failed(path.to_path_buf(), &e))?;
        let source = std::str::from_utf8(&content)
            .map_err(|_| ScanError::encoding_error(path.to_path_buf()))?;
        self.scan_source(path, source)
    }
}

/// Extract import statements from a Python syntax tree, in source order.
pub fn extract_imports(tree: &tree_sitter::Tree, content: &[u8]) -> Vec<Import> {
    let mut imports = Vec::new();
    extract_imports_recursive(&tree.root_node(), content, &mut imports);
    imports
}

fn extract_imports_recursive(node: &tree_sitter::Node, content: &[u8], imports: &mut Vec<Import>) {
    use node_kinds::{FUTURE_IMPORT_STATEMENT, IMPORT_FROM_STATEMENT, IMPORT_STATEMENT};

    match node.kind() {
        IMPORT_STATEMENT => parse_import_statement(node, content, imports),
        IMPORT_FROM_STATEMENT => parse_from_statement(node, content, imports),
        FUTURE_IMPORT_STATEMENT => {}
        _ => {
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                extract_imports_recursive(&child, content, imports);
            }
        }
    }
}

/// `import a.b, c as d`: one import per name.
fn parse_import_statement(node: &tree_sitter::Node, content: &[u8], imports: &mut Vec<Import>) {
    let line = node_line(node);
    let mut cursor = node.walk();
    for name in node.children_by_field_name(node_kinds::NAME, &mut cursor) {
        if let Some(module) = imported_name(&name, content) {
            imports.push(Import::module(&module).at_line(line));
        }
    }
}

/// `from m import a, b as c` / `from . import x` / `from m import *`.
fn parse_from_statement(node: &tree_sitter::Node, content: &[u8], imports: &mut Vec<Import>) {
    let line = node_line(node);
    let Some(module) = node
        .child_by_field_name(node_kinds::MODULE_NAME)
        .and_then(|m| node_text(&m, content))
        .map(|text| compact(&text))
    else {
        return;
    };

    let mut cursor = node.walk();
    let has_wildcard = node
        .children(&mut cursor)
        .any(|child| child.kind() == node_kinds::WILDCARD_IMPORT);
    if has_wildcard {
        imports.push(Import::wildcard(&module).at_line(line));
        return;
    }

    let mut cursor = node.walk();
    for name in node.children_by_field_name(node_kinds::NAME, &mut cursor) {
        if let Some(member) = imported_name(&name, content) {
            imports.push(Import::from_import(&module, &member).at_line(line));
        }
    }
}

/// The dotted name being imported, looking through `as` aliases.
fn imported_name(node: &tree_sitter::Node, content: &[u8]) -> Option<String> {
    let target = if node.kind() == node_kinds::ALIASED_IMPORT {
        node.child_by_field_name(node_kinds::NAME)?
    } else {
        *node
    };
    node_text(&target, content).map(|text| compact(&text))
}

/// Dotted names may legally contain whitespace (`a . b`); drop it.
fn compact(text: &str) -> String {
    text.split_whitespace().collect()
}
