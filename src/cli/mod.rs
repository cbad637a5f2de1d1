//! Command-line interface for vibe-plugins.
//!
//! Two binaries share this module:
//!
//! - `vibe-plugins` ([`Cli`]) installs plugins and scaffolds capabilities
//! - `vp` ([`vp::PresetCli`]) installs rulesync presets and drives rulesync
//!
//! # Commands
//!
//! | Command | Aliases | Purpose |
//! |---|---|---|
//! | `install <plugin>` | `add` | install a plugin into Claude Code, Cursor or qoder |
//! | `generate` | `gen`, `new` | scaffold one capability |
//! | `generate-batch <file>` | `gen-batch` | scaffold capabilities from a JSON array |
//! | `list-types` | | list capability types and categories |
//!
//! # Global options
//!
//! - `-v, --verbose` / `-q, --quiet` - log level (`RUST_LOG` overrides)
//! - `--config <PATH>` / `VIBE_PLUGINS_CONFIG` - configuration file
//! - `--plugins-root <PATH>` / `VIBE_PLUGINS_ROOT` - directory holding the plugins
//!
//! Failures are printed with a suggestion and the process exits with status 1; set
//! `VIBE_PLUGINS_DEBUG` (or pass `--verbose`) to also print the full error chain.

pub mod common;
mod generate;
mod install;
mod list_types;
pub mod vp;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use common::{CommandExecutor, GlobalOptions};

/// Universal AI plugin installer.
#[derive(Parser, Debug)]
#[command(
    name = "vibe-plugins",
    about = "Universal AI plugin installer",
    version,
    long_about = "Installs plugins (MCP servers, skills, commands, agents) into Claude Code, Cursor and qoder projects, and scaffolds new capabilities."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Path to the configuration file
    #[arg(long, global = true, env = "VIBE_PLUGINS_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Directory containing the plugins
    #[arg(long, global = true, env = "VIBE_PLUGINS_ROOT", value_name = "PATH")]
    plugins_root: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Install a plugin into the current project
    #[command(visible_alias = "add")]
    Install(install::InstallCommand),

    /// Generate a new capability (prompt/skill/mcp/command/agent/hook)
    #[command(visible_aliases = ["gen", "new"])]
    Generate(generate::GenerateCommand),

    /// Generate multiple capabilities from a JSON file
    #[command(visible_alias = "gen-batch")]
    GenerateBatch(generate::GenerateBatchCommand),

    /// List supported capability types and categories
    ListTypes(list_types::ListTypesCommand),
}

impl Cli {
    /// Initialise logging and run the selected command.
    pub async fn execute(self) -> Result<()> {
        common::init_logging(self.verbose, self.quiet);
        let global = self.global_options();

        match self.command {
            Commands::Install(cmd) => cmd.execute(global).await,
            Commands::Generate(cmd) => cmd.execute(global).await,
            Commands::GenerateBatch(cmd) => cmd.execute(global).await,
            Commands::ListTypes(cmd) => cmd.execute(),
        }
    }

    #[must_use]
    pub const fn is_verbose(&self) -> bool {
        self.verbose
    }

    #[must_use]
    pub fn global_options(&self) -> GlobalOptions {
        GlobalOptions {
            config: self.config.clone(),
            plugins_root: self.plugins_root.clone(),
            presets_root: None,
        }
    }
}
