//! Common root directory of a graph, used to print paths relative to it.

use std::path::{Component, Path, PathBuf};

use crate::graph::DependencyGraph;

/// Longest common leading path of `paths`, compared component by component.
///
/// If the prefix is not an existing directory (a lone file, or a prefix that
/// never existed on disk) it is cut back to its parent. An empty input gives
/// an empty path.
#[must_use]
pub fn common_root<'a>(paths: impl IntoIterator<Item = &'a Path>) -> PathBuf {
    let mut paths = paths.into_iter();
    let Some(first) = paths.next() else {
        return PathBuf::new();
    };

    let mut prefix: Vec<Component<'a>> = first.components().collect();
    for path in paths {
        let shared = prefix
            .iter()
            .zip(path.components())
            .take_while(|(a, b)| *a == b)
            .count();
        prefix.truncate(shared);
    }

    let prefix: PathBuf = prefix.iter().collect();
    if prefix.is_dir() {
        prefix
    } else {
        prefix.parent().map(Path::to_path_buf).unwrap_or_default()
    }
}

/// Root of a dependency graph.
///
/// Computed over the files of every node that has an outgoing edge. A graph
/// without edges falls back to all of its files.
#[must_use]
pub fn graph_root(graph: &DependencyGraph) -> PathBuf {
    let sources: Vec<PathBuf> = graph
        .nodes()
        .into_iter()
        .filter(|&id| !graph.dependencies(id).is_empty())
        .flat_map(|id| graph.flatten(id))
        .collect();

    if !sources.is_empty() {
        return common_root(sources.iter().map(PathBuf::as_path));
    }

    let all: Vec<PathBuf> = graph
        .nodes()
        .into_iter()
        .flat_map(|id| graph.flatten(id))
        .collect();
    common_root(all.iter().map(PathBuf::as_path))
}
