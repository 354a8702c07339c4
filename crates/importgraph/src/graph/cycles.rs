//! Cycle detection and collapsing.
//!
//! Collapsing runs one cycle at a time: find a cycle, fold it into a single
//! `CycleNode`, search again. A cycle node is an ordinary node afterwards, so
//! a later pass can fold it into an outer cycle.
//!
//! Detection is an iterative depth-first search. Roots and successors are
//! visited in key order, which makes the sequence of collapsed cycles a pure
//! function of the graph.

use std::collections::HashMap;

use tracing::{debug, trace};

use super::{DependencyGraph, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    OnStack,
    Done,
}

struct Frame {
    node: NodeId,
    successors: Vec<NodeId>,
    next: usize,
}

impl Frame {
    fn new(graph: &DependencyGraph, node: NodeId) -> Self {
        Self {
            node,
            successors: graph.dependencies(node),
            next: 0,
        }
    }
}

/// Find one cycle in the live graph.
///
/// Returns the nodes of the cycle in traversal order, starting at the node
/// the search re-entered. A self-edge is a one-node cycle. Returns `None`
/// for an acyclic graph.
#[must_use]
pub fn find_cycle(graph: &DependencyGraph) -> Option<Vec<NodeId>> {
    let mut marks: HashMap<NodeId, Mark> = HashMap::new();

    for root in graph.nodes() {
        if marks.contains_key(&root) {
            continue;
        }
        marks.insert(root, Mark::OnStack);
        let mut frames = vec![Frame::new(graph, root)];

        while let Some(frame) = frames.last_mut() {
            let Some(&succ) = frame.successors.get(frame.next) else {
                marks.insert(frame.node, Mark::Done);
                frames.pop();
                continue;
            };
            frame.next += 1;

            match marks.get(&succ) {
                None => {
                    marks.insert(succ, Mark::OnStack);
                    frames.push(Frame::new(graph, succ));
                }
                Some(Mark::OnStack) => {
                    if let Some(start) = frames.iter().position(|f| f.node == succ) {
                        return Some(frames[start..].iter().map(|f| f.node).collect());
                    }
                }
                Some(Mark::Done) => {}
            }
        }
    }

    None
}

/// Collapse cycles until the graph is acyclic.
///
/// Returns how many cycle nodes were created. Every pass drops the cycle's
/// internal edges, so the loop ends.
pub fn collapse_cycles(graph: &mut DependencyGraph) -> usize {
    let mut collapsed = 0;
    while let Some(members) = find_cycle(graph) {
        trace!(
            first = %graph.key(members[0]).display(),
            members = members.len(),
            "Found cycle"
        );
        let size = members.len();
        let cycle = graph.collapse(members);
        collapsed += 1;
        debug!(
            pass = collapsed,
            members = size,
            files = graph.flatten(cycle).len(),
            "Collapsed cycle"
        );
    }
    collapsed
}
