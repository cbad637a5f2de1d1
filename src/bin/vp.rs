//! vp (vibe-presets) entry point
//!
//! - `install <preset> [target-dir]` - copy a preset into `.rulesync/`
//! - `generate [target]` - run rulesync for one IDE or all of them
//! - `list` - list presets
//! - `tag <entry-file>` - describe a tool from its entry file

use anyhow::Result;
use clap::Parser;
use vibe_plugins::cli::common::exit_with_error;
use vibe_plugins::cli::vp::PresetCli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = PresetCli::parse();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let verbose = cli.is_verbose();
    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => exit_with_error(e, verbose),
    }
}
