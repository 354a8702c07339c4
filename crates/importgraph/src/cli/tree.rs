//! `importgraph tree` command implementation.

use std::path::PathBuf;

use super::{Options, load_graph};

/// Run the tree command.
pub fn run(options: &Options, files: &[PathBuf]) -> Result<(), importgraph::Error> {
    let mut graph = load_graph(options, files)?;
    graph.collapse_cycles();

    for line in graph.formatter().tree_lines() {
        println!("{}{}", "  ".repeat(line.depth), line.label);
    }

    Ok(())
}
