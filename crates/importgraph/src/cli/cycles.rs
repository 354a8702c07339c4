//! `importgraph cycles` command implementation.

use std::path::PathBuf;

use colored::Colorize;

use super::{Options, display, load_graph};

/// Run the cycles command.
pub fn run(options: &Options, files: &[PathBuf]) -> Result<(), importgraph::Error> {
    let mut graph = load_graph(options, files)?;
    graph.collapse_cycles();

    let cycles: Vec<_> = graph
        .graph()
        .nodes()
        .into_iter()
        .filter(|&id| graph.graph().node(id).is_cycle())
        .collect();

    if options.json {
        let json: Vec<Vec<PathBuf>> = cycles.iter().map(|&id| graph.graph().flatten(id)).collect();
        display::print_json(&json)?;
        return Ok(());
    }

    if cycles.is_empty() {
        println!("{}", "No circular imports detected.".green());
        return Ok(());
    }

    println!(
        "Found {} import cycles:",
        cycles.len().to_string().red().bold()
    );
    println!();

    let fmt = graph.formatter();
    for (i, &cycle) in cycles.iter().enumerate() {
        println!("  {} {}:", "Cycle".yellow().bold(), i + 1);
        println!("    {}", fmt.format(cycle).dimmed());
    }

    Ok(())
}
