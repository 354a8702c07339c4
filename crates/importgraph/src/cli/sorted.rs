//! `importgraph sorted` command implementation.

use std::path::PathBuf;

use super::{Options, display, load_graph};

/// Run the sorted command.
pub fn run(options: &Options, files: &[PathBuf]) -> Result<(), importgraph::Error> {
    let mut graph = load_graph(options, files)?;
    graph.collapse_cycles();

    let order = graph.topological_order()?;
    let lines = graph.formatter().order_lines(&order);

    if options.json {
        display::print_json(&lines)?;
    } else {
        for line in lines {
            println!("{line}");
        }
    }

    Ok(())
}
