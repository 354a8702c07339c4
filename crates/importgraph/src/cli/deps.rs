//! `importgraph deps` command implementation.

use std::path::PathBuf;

use colored::Colorize;

use super::{Options, display, load_graph};

/// Run the deps command.
pub fn run(options: &Options, files: &[PathBuf]) -> Result<(), importgraph::Error> {
    let mut graph = load_graph(options, files)?;
    let units = graph.build_units()?;

    if options.json {
        display::print_json(&units)?;
        return Ok(());
    }

    let fmt = graph.formatter();
    for unit in &units {
        let names: Vec<String> = unit.files().iter().map(|p| fmt.format_path(p)).collect();
        if unit.is_cycle() {
            println!("{}", format!("[{}]", names.join(" ")).yellow());
        } else {
            println!("{}", names.join(" "));
        }
    }

    Ok(())
}
