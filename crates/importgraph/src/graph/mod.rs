//! The file dependency graph.
//!
//! Nodes live in an arena and are addressed by `NodeId`; edges hold ids, so a
//! cycle node can own other cycle nodes without any reference cycles.
//!
//! ## Design
//!
//! - `Node` is `File | Cycle`. A cycle's members are ids of nodes that left
//!   the live graph when the cycle was collapsed.
//! - Edges point from dependent to dependency. Insertion is idempotent.
//! - Every traversal that needs an order uses the node key: the file path, or
//!   for a cycle the smallest file path inside it. Paths are unique, so keys
//!   are too.
//!
//! Algorithms live in submodules:
//!
//! | Operation | Module | Algorithm |
//! |-----------|--------|-----------|
//! | Cycle collapsing | `cycles` | Repeated iterative DFS, one cycle per pass |
//! | Build ordering | `sequence` | Kahn's algorithm, smallest key first, reversed |

pub mod cycles;
pub mod sequence;

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use crate::types::FileKind;

/// Index of a node in the graph arena.
///
/// Ids are never reused. A collapsed node keeps its id; it just stops being
/// live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Position in the arena.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A node of the dependency graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A single file
    File(FileNode),
    /// A collapsed cycle
    Cycle(CycleNode),
}

impl Node {
    /// Ordering key used for every deterministic traversal.
    #[must_use]
    pub fn key(&self) -> &Path {
        match self {
            Self::File(file) => &file.path,
            Self::Cycle(cycle) => &cycle.key,
        }
    }

    /// Returns `true` for cycle nodes.
    #[must_use]
    pub fn is_cycle(&self) -> bool {
        matches!(self, Self::Cycle(_))
    }
}

/// A file, identified by its absolute path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNode {
    /// Absolute path
    pub path: PathBuf,
    /// Whether traversal expands this file
    pub kind: FileKind,
}

/// A collapsed cycle.
///
/// Members are kept in the order the cycle was found in, which is the order
/// they are flattened in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleNode {
    members: Vec<NodeId>,
    key: PathBuf,
}

impl CycleNode {
    /// Direct members, in recorded order.
    #[must_use]
    pub fn members(&self) -> &[NodeId] {
        &self.members
    }

}

/// Directed graph over files and collapsed cycles.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: Vec<Node>,
    live: Vec<bool>,
    live_count: usize,
    /// Cycle that swallowed each collapsed node
    absorbed_into: Vec<Option<NodeId>>,
    files: HashMap<PathBuf, NodeId>,
    dependencies: Vec<BTreeSet<NodeId>>,
    dependents: Vec<BTreeSet<NodeId>>,
    edge_count: usize,
}

impl DependencyGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file node, or return the existing one for this path.
    ///
    /// A path that was absorbed into a cycle still maps to its original id;
    /// it is not re-added, and edges added through that id land on the live
    /// cycle. Adding an existing target-only file as `Source` promotes it.
    pub fn add_file(&mut self, path: PathBuf, kind: FileKind) -> NodeId {
        if let Some(&id) = self.files.get(&path) {
            if kind.is_source()
                && let Node::File(file) = &mut self.nodes[id.0]
            {
                file.kind = FileKind::Source;
            }
            return id;
        }
        let id = self.push(Node::File(FileNode {
            path: path.clone(),
            kind,
        }));
        self.files.insert(path, id);
        id
    }

    /// Add the edge `dependent -> dependency`.
    ///
    /// Collapsed ends are replaced by the live cycle holding them. An edge
    /// between two members of the same collapsed cycle is dropped.
    ///
    /// Returns `false` if the edge was already present or dropped.
    pub fn add_edge(&mut self, dependent: NodeId, dependency: NodeId) -> bool {
        let from = self.representative(dependent);
        let to = self.representative(dependency);
        if from == to && (from != dependent || to != dependency) {
            return false;
        }
        let (dependent, dependency) = (from, to);
        if !self.dependencies[dependent.0].insert(dependency) {
            return false;
        }
        self.dependents[dependency.0].insert(dependent);
        self.edge_count += 1;
        true
    }

    /// Look up a file node by path.
    #[must_use]
    pub fn file_id(&self, path: &Path) -> Option<NodeId> {
        self.files.get(path).copied()
    }

    /// The live node standing for `id`: `id` itself, or the outermost cycle
    /// it was collapsed into.
    #[must_use]
    pub fn representative(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(Some(parent)) = self.absorbed_into.get(current.0) {
            current = *parent;
        }
        current
    }

    /// Whether a file with this path was ever added.
    #[must_use]
    pub fn contains_file(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    /// The node behind an id.
    ///
    /// # Panics
    ///
    /// Panics if `id` did not come from this graph.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Ordering key of a node.
    #[must_use]
    pub fn key(&self, id: NodeId) -> &Path {
        self.nodes[id.0].key()
    }

    /// Whether the node is still part of the graph (not absorbed by a cycle).
    #[must_use]
    pub fn is_live(&self, id: NodeId) -> bool {
        self.live.get(id.0).copied().unwrap_or(false)
    }

    /// Number of live nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.live_count
    }

    /// Number of edges in the live graph.
    ///
    /// Edges of collapsed nodes are not counted; their boundary edges now
    /// start or end at the cycle.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Whether the edge `dependent -> dependency` exists, looking through
    /// collapsed nodes to their cycles.
    #[must_use]
    pub fn has_edge(&self, dependent: NodeId, dependency: NodeId) -> bool {
        let dependency = self.representative(dependency);
        self.dependencies
            .get(self.representative(dependent).0)
            .is_some_and(|deps| deps.contains(&dependency))
    }

    /// Live nodes in key order.
    #[must_use]
    pub fn nodes(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = (0..self.nodes.len())
            .map(NodeId)
            .filter(|&id| self.is_live(id))
            .collect();
        self.sort_by_key(&mut ids);
        ids
    }

    /// Direct dependencies of a node, in key order.
    #[must_use]
    pub fn dependencies(&self, id: NodeId) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.dependencies[id.0].iter().copied().collect();
        self.sort_by_key(&mut ids);
        ids
    }

    /// Direct dependents of a node, in key order.
    #[must_use]
    pub fn dependents(&self, id: NodeId) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.dependents[id.0].iter().copied().collect();
        self.sort_by_key(&mut ids);
        ids
    }

    /// Number of direct dependents.
    #[must_use]
    pub fn dependent_count(&self, id: NodeId) -> usize {
        self.dependents[id.0].len()
    }

    /// All edges as `(dependent, dependency)`, sorted by the keys of both ends.
    #[must_use]
    pub fn edges(&self) -> Vec<(NodeId, NodeId)> {
        self.nodes()
            .into_iter()
            .flat_map(|from| {
                self.dependencies(from)
                    .into_iter()
                    .map(move |to| (from, to))
            })
            .collect()
    }

    /// Leaf files of a node, in recorded order.
    ///
    /// A file node flattens to itself. A cycle flattens to the files of its
    /// members, recursively, each member in the order the cycle recorded it.
    #[must_use]
    pub fn flatten(&self, id: NodeId) -> Vec<PathBuf> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            match &self.nodes[current.0] {
                Node::File(file) => out.push(file.path.clone()),
                // reversed so members pop in recorded order
                Node::Cycle(cycle) => stack.extend(cycle.members.iter().rev()),
            }
        }
        out
    }

    /// Replace `members` with a single cycle node and re-wire boundary edges.
    ///
    /// Edges from outside into any member now point at the cycle; edges from
    /// any member to outside now start at the cycle. Edges between members
    /// disappear with the members.
    pub(crate) fn collapse(&mut self, members: Vec<NodeId>) -> NodeId {
        debug_assert!(!members.is_empty(), "a cycle has at least one member");
        debug_assert!(
            members.iter().all(|&m| self.is_live(m)),
            "cycle members must be live"
        );

        let member_set: BTreeSet<NodeId> = members.iter().copied().collect();
        let key = members
            .iter()
            .map(|&m| self.key(m))
            .min()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let mut outgoing = BTreeSet::new();
        let mut incoming = BTreeSet::new();
        for &member in &members {
            for &dep in &self.dependencies[member.0] {
                if !member_set.contains(&dep) {
                    outgoing.insert(dep);
                }
            }
            for &dependent in &self.dependents[member.0] {
                if !member_set.contains(&dependent) {
                    incoming.insert(dependent);
                }
            }
        }

        for &member in &members {
            self.remove(member);
        }

        let cycle = self.push(Node::Cycle(CycleNode { members, key }));
        if let Node::Cycle(node) = &self.nodes[cycle.0] {
            for &member in &node.members {
                self.absorbed_into[member.0] = Some(cycle);
            }
        }
        for dependency in outgoing {
            self.add_edge(cycle, dependency);
        }
        for dependent in incoming {
            self.add_edge(dependent, cycle);
        }
        cycle
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        self.live.push(true);
        self.absorbed_into.push(None);
        self.dependencies.push(BTreeSet::new());
        self.dependents.push(BTreeSet::new());
        self.live_count += 1;
        id
    }

    /// Forget a file that has no edges, as if it had never been added.
    ///
    /// Returns `false` (and changes nothing) if the file is unknown, already
    /// collapsed, or connected.
    pub(crate) fn discard_file(&mut self, path: &Path) -> bool {
        let Some(id) = self.file_id(path) else {
            return false;
        };
        let connected =
            !self.dependencies[id.0].is_empty() || !self.dependents[id.0].is_empty();
        if !self.is_live(id) || connected {
            return false;
        }
        self.files.remove(path);
        self.remove(id);
        true
    }

    /// Drop a node from the live graph together with all its edges.
    fn remove(&mut self, id: NodeId) {
        let dependencies = std::mem::take(&mut self.dependencies[id.0]);
        let dependents = std::mem::take(&mut self.dependents[id.0]);
        for dep in dependencies.iter().filter(|&&dep| dep != id) {
            self.dependents[dep.0].remove(&id);
        }
        for dependent in dependents.iter().filter(|&&dependent| dependent != id) {
            self.dependencies[dependent.0].remove(&id);
        }
        // a self-edge shows up in both sets but is one edge
        let self_edge = usize::from(dependencies.contains(&id));
        self.edge_count -= dependencies.len() + dependents.len() - self_edge;
        self.live[id.0] = false;
        self.live_count -= 1;
    }

    fn sort_by_key(&self, ids: &mut [NodeId]) {
        ids.sort_by(|a, b| self.key(*a).cmp(self.key(*b)));
    }
}
