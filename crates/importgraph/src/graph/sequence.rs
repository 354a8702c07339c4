//! Build ordering for an acyclic graph.
//!
//! Kahn's algorithm walks the graph along its edges, dependents before
//! dependencies. When several nodes are ready at once, the one with the
//! smallest key (file path, or smallest member path for a cycle) goes first.
//! The build order is that walk reversed, so files with no dependencies come
//! out first.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::path::PathBuf;

use super::{DependencyGraph, Node, NodeId};
use crate::error::{Error, Result};
use crate::types::BuildUnit;

/// Topological order with every dependent ahead of its dependencies.
///
/// Target-only files are included.
///
/// # Errors
///
/// Returns [`Error::GraphNotAcyclic`] if a cycle is left in the graph.
pub fn topological_order(graph: &DependencyGraph) -> Result<Vec<NodeId>> {
    let nodes = graph.nodes();
    let mut pending: HashMap<NodeId, usize> = nodes
        .iter()
        .map(|&id| (id, graph.dependent_count(id)))
        .collect();

    let mut ready: BinaryHeap<Reverse<(PathBuf, NodeId)>> = pending
        .iter()
        .filter(|&(_, &count)| count == 0)
        .map(|(&id, _)| Reverse((graph.key(id).to_path_buf(), id)))
        .collect();

    let mut order = Vec::with_capacity(nodes.len());
    while let Some(Reverse((_, id))) = ready.pop() {
        order.push(id);
        for dep in graph.dependencies(id) {
            if let Some(count) = pending.get_mut(&dep) {
                *count -= 1;
                if *count == 0 {
                    ready.push(Reverse((graph.key(dep).to_path_buf(), dep)));
                }
            }
        }
    }

    if order.len() < nodes.len() {
        return Err(Error::GraphNotAcyclic {
            remaining: nodes.len() - order.len(),
        });
    }
    Ok(order)
}

/// Linearize an acyclic graph into build units, dependencies first.
///
/// For every edge `dependent -> dependency`, the unit holding the dependency
/// comes before the unit holding the dependent. Target-only files take part
/// in the ordering but are not emitted.
///
/// # Errors
///
/// Returns [`Error::GraphNotAcyclic`] if a cycle is left in the graph.
pub fn sequence(graph: &DependencyGraph) -> Result<Vec<BuildUnit>> {
    let order = topological_order(graph)?;

    Ok(order
        .into_iter()
        .rev()
        .filter_map(|id| match graph.node(id) {
            Node::Cycle(_) => Some(BuildUnit::cycle(graph.flatten(id))),
            Node::File(file) if file.kind.is_source() => {
                Some(BuildUnit::single(file.path.clone()))
            }
            Node::File(_) => None,
        })
        .collect())
}
