//! vibe-plugins CLI entry point
//!
//! Parses the command line, runs the command, and turns any failure into a
//! user-friendly message with exit status 1.
//!
//! - `install` - install a plugin into Claude Code, Cursor or qoder
//! - `generate` - scaffold a capability
//! - `generate-batch` - scaffold capabilities from a JSON file
//! - `list-types` - list capability types and categories

use anyhow::Result;
use clap::Parser;
use vibe_plugins::cli;
use vibe_plugins::cli::common::exit_with_error;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let verbose = cli.is_verbose();
    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => exit_with_error(e, verbose),
    }
}
