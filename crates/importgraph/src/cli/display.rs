//! Common display utilities for CLI commands.

use std::io::{self, Write};

use colored::Colorize;
use importgraph::ScanError;
use serde::Serialize;

const MAX_DISPLAY_ERRORS: usize = 10;

/// Report files that could not be scanned, truncated after a few entries.
pub fn print_scan_errors(errors: &[ScanError]) {
    if errors.is_empty() {
        return;
    }

    eprintln!(
        "{}: {} file(s) could not be fully scanned",
        "warning".yellow().bold(),
        errors.len()
    );
    for error in errors.iter().take(MAX_DISPLAY_ERRORS) {
        eprintln!("    {} {}", "•".dimmed(), error);
    }
    if errors.len() > MAX_DISPLAY_ERRORS {
        eprintln!(
            "    {} ... and {} more",
            "•".dimmed(),
            errors.len() - MAX_DISPLAY_ERRORS
        );
    }
}

/// Pretty-print a value as JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
    let output = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{output}")
}
