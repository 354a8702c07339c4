//! Human-readable views of a graph.
//!
//! Nothing here feeds back into graph construction or ordering. The CLI
//! prints these; library users can render them however they like.
//!
//! Naming rules for nodes:
//!
//! | Node | Shown as |
//! |------|----------|
//! | File under the root | path relative to the root |
//! | File under the stub root | `[path relative to the stub root]` |
//! | Cycle | `[a->b->c]`, members in recorded order, nested cycles inline |

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use crate::graph::{DependencyGraph, Node, NodeId};
use crate::types::BrokenDependencies;

/// Formats graph nodes relative to a root directory.
#[derive(Debug, Clone, Copy)]
pub struct NodeFormatter<'a> {
    graph: &'a DependencyGraph,
    root: &'a Path,
    stub_root: Option<&'a Path>,
}

/// One line of an edge listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeLine {
    /// The importing node
    pub from: String,
    /// The imported node, or the unresolved specifier
    pub to: String,
    /// Whether `to` is an unresolved specifier
    pub broken: bool,
}

/// One line of a dependency tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeLine {
    /// Nesting depth, 0 for roots
    pub depth: usize,
    /// Formatted node name
    pub label: String,
}

impl<'a> NodeFormatter<'a> {
    /// Create a formatter.
    #[must_use]
    pub fn new(graph: &'a DependencyGraph, root: &'a Path, stub_root: Option<&'a Path>) -> Self {
        Self {
            graph,
            root,
            stub_root,
        }
    }

    /// Display name of a node.
    #[must_use]
    pub fn format(&self, id: NodeId) -> String {
        match self.graph.node(id) {
            Node::File(file) => self.format_path(&file.path),
            Node::Cycle(cycle) => {
                let members: Vec<String> = cycle.members().iter().map(|&m| self.format(m)).collect();
                format!("[{}]", members.join("->"))
            }
        }
    }

    /// Display name of a file path.
    #[must_use]
    pub fn format_path(&self, path: &Path) -> String {
        if let Some(stub_root) = self.stub_root
            && let Ok(relative) = path.strip_prefix(stub_root)
        {
            return format!("[{}]", relative.display());
        }
        path.strip_prefix(self.root)
            .unwrap_or(path)
            .display()
            .to_string()
    }

    /// Every edge plus every broken import, grouped by importing node.
    ///
    /// Nodes come in key order; within a node, resolved dependencies come
    /// first (key order), then unresolved specifiers (sorted). A cycle node
    /// lists the broken imports of all of its files.
    #[must_use]
    pub fn edge_lines(&self, broken: &BrokenDependencies) -> Vec<EdgeLine> {
        let mut lines = Vec::new();
        for id in self.graph.nodes() {
            let from = self.format(id);
            for dep in self.graph.dependencies(id) {
                lines.push(EdgeLine {
                    from: from.clone(),
                    to: self.format(dep),
                    broken: false,
                });
            }

            let specifiers: BTreeSet<&String> = self
                .graph
                .flatten(id)
                .iter()
                .filter_map(|path| broken.get(path))
                .flatten()
                .collect();
            for specifier in specifiers {
                lines.push(EdgeLine {
                    from: from.clone(),
                    to: specifier.clone(),
                    broken: true,
                });
            }
        }
        lines
    }

    /// Depth-first dependency tree from every node nothing depends on.
    ///
    /// Each node is shown once, under the first parent that reaches it.
    /// Target-only files are left out. Meant for a collapsed graph: a node
    /// sitting on an uncollapsed cycle with no outside dependent is never
    /// reached.
    #[must_use]
    pub fn tree_lines(&self) -> Vec<TreeLine> {
        let mut lines = Vec::new();
        let mut seen: HashSet<NodeId> = HashSet::new();

        let roots: Vec<NodeId> = self
            .graph
            .nodes()
            .into_iter()
            .filter(|&id| self.graph.dependent_count(id) == 0)
            .collect();

        let mut stack: Vec<(NodeId, usize)> = roots.into_iter().rev().map(|id| (id, 0)).collect();
        while let Some((id, depth)) = stack.pop() {
            if !self.is_shown(id) || !seen.insert(id) {
                continue;
            }
            lines.push(TreeLine {
                depth,
                label: self.format(id),
            });
            for dep in self.graph.dependencies(id).into_iter().rev() {
                stack.push((dep, depth + 1));
            }
        }
        lines
    }

    /// Names of cycles and source files in the given order.
    #[must_use]
    pub fn order_lines(&self, order: &[NodeId]) -> Vec<String> {
        order
            .iter()
            .filter(|&&id| self.is_shown(id))
            .map(|&id| self.format(id))
            .collect()
    }

    fn is_shown(&self, id: NodeId) -> bool {
        match self.graph.node(id) {
            Node::Cycle(_) => true,
            Node::File(file) => file.kind.is_source(),
        }
    }
}
