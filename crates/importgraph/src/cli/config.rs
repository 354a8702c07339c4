//! `importgraph config` command implementation.

use super::{Options, display};

/// Print the configuration the other commands would run with.
pub fn run(options: &Options) -> Result<(), importgraph::Error> {
    let config = options.resolve_config()?;

    if options.json {
        display::print_json(&config)?;
    } else {
        print!("{}", config.to_yaml()?);
    }

    Ok(())
}
