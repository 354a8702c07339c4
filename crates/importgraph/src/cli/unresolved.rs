//! `importgraph unresolved` command implementation.

use std::path::PathBuf;

use colored::Colorize;

use super::{Options, display, load_graph};

/// Run the unresolved command.
pub fn run(options: &Options, files: &[PathBuf]) -> Result<(), importgraph::Error> {
    let graph = load_graph(options, files)?;
    let broken = graph.broken_dependencies();

    if options.json {
        display::print_json(broken)?;
        return Ok(());
    }

    if broken.is_empty() {
        println!("{}", "All imports resolved.".green());
        return Ok(());
    }

    let fmt = graph.formatter();
    for (file, specifiers) in broken {
        println!("  {}:", fmt.format_path(file).white().bold());
        for specifier in specifiers {
            println!("    {} {}", "•".dimmed(), specifier);
        }
    }

    Ok(())
}
