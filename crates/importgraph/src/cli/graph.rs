//! `importgraph graph` command implementation.

use std::path::PathBuf;

use colored::Colorize;
use serde::Serialize;

use super::{Options, display, load_graph};

#[derive(Serialize)]
struct EdgeJson<'a> {
    from: &'a str,
    to: &'a str,
    broken: bool,
}

/// Run the graph command.
///
/// Shows the raw graph, before any cycle is collapsed.
pub fn run(options: &Options, files: &[PathBuf]) -> Result<(), importgraph::Error> {
    let graph = load_graph(options, files)?;
    let lines = graph.formatter().edge_lines(graph.broken_dependencies());

    if options.json {
        let json: Vec<EdgeJson<'_>> = lines
            .iter()
            .map(|l| EdgeJson {
                from: &l.from,
                to: &l.to,
                broken: l.broken,
            })
            .collect();
        display::print_json(&json)?;
        return Ok(());
    }

    println!("{}", "Source tree:".bold());
    for line in &lines {
        if line.broken {
            println!("  {} -> {}", line.from, format!("<{}>", line.to).red());
        } else {
            println!("  {} -> {}", line.from, line.to);
        }
    }

    Ok(())
}
