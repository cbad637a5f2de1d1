//! `vp`: the preset tool.
//!
//! ```bash
//! vp install cross-platform            # presets/cross-platform -> ./.rulesync
//! vp install productivity ../app --dry-run
//! vp generate cursor                   # npx rulesync generate --targets cursor --features *
//! vp list
//! vp tag ./src/index.ts                # ask the agent to describe the tool
//! ```

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use super::common::{self, CommandExecutor, GlobalOptions};
use crate::agent::ClaudeCliExecutor;
use crate::config::ResolvedConfig;
use crate::presets::{
    IDE_TARGETS, PresetInstallReport, TagAnswer, generate_ide_config, install_preset,
    list_presets, tag_entry_file,
};
use crate::utils::resolve_path;

/// vibe-presets: AI IDE configuration manager.
#[derive(Parser, Debug)]
#[command(name = "vp", about = "vibe-presets - AI IDE configuration manager", version)]
pub struct PresetCli {
    #[command(subcommand)]
    command: PresetCommands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Path to the configuration file
    #[arg(long, global = true, env = "VIBE_PLUGINS_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Directory containing the presets
    #[arg(long, global = true, env = "VIBE_PRESETS_ROOT", value_name = "PATH")]
    presets_root: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum PresetCommands {
    /// Install a preset into a project's .rulesync directory
    Install(PresetInstallCommand),

    /// Generate IDE configuration with rulesync (cursor, claudecode, ... or *)
    Generate(PresetGenerateCommand),

    /// List available presets
    List,

    /// Analyse a tool's entry file and print tags for it
    Tag(TagCommand),
}

impl PresetCli {
    pub async fn execute(self) -> Result<()> {
        common::init_logging(self.verbose, self.quiet);
        let global = GlobalOptions {
            config: self.config,
            plugins_root: None,
            presets_root: self.presets_root,
        };

        match self.command {
            PresetCommands::Install(cmd) => cmd.execute(global).await,
            PresetCommands::Generate(cmd) => cmd.execute(global).await,
            PresetCommands::List => {
                print_presets();
                Ok(())
            }
            PresetCommands::Tag(cmd) => cmd.execute(global).await,
        }
    }

    #[must_use]
    pub const fn is_verbose(&self) -> bool {
        self.verbose
    }
}

#[derive(Args, Debug)]
pub struct PresetInstallCommand {
    /// Preset name
    pub preset: String,

    /// Project directory (defaults to the current directory)
    pub target_dir: Option<String>,

    /// Print what would be done without writing anything
    #[arg(long)]
    pub dry_run: bool,
}

impl CommandExecutor for PresetInstallCommand {
    async fn execute_with_config(self, config: ResolvedConfig) -> Result<()> {
        let cwd = std::env::current_dir()?;
        let target_dir = match &self.target_dir {
            Some(dir) => resolve_path(dir, &cwd)?,
            None => cwd,
        };

        let report = install_preset(&config.presets_root, &self.preset, &target_dir, self.dry_run)?;
        print_install_summary(&report);
        Ok(())
    }
}

fn print_install_summary(report: &PresetInstallReport) {
    if report.dry_run {
        println!("\n{}", "Dry run complete. No files were written.".yellow());
        return;
    }

    println!("\n{} Preset \"{}\" installed", "✓".green(), report.preset.bold());
    println!("  {} {}", "into:".dimmed(), report.rulesync_dir.display());
    if !report.mcp_servers.is_empty() {
        let names: Vec<&str> = report.mcp_servers.iter().map(|(name, _)| name.as_str()).collect();
        println!("  {} {}", "mcp servers:".dimmed(), names.join(", "));
    }

    println!("\n{}", "Next: generate IDE configuration".bold());
    println!("  vp generate cursor      # Cursor");
    println!("  vp generate claudecode  # Claude Code");
    println!("  vp generate             # every IDE");
    println!("\nSupported IDEs: {}", IDE_TARGETS.join(", "));
}

#[derive(Args, Debug)]
pub struct PresetGenerateCommand {
    /// rulesync target
    #[arg(default_value = "*")]
    pub target: String,
}

impl CommandExecutor for PresetGenerateCommand {
    async fn execute_with_config(self, config: ResolvedConfig) -> Result<()> {
        let cwd = std::env::current_dir()?;
        generate_ide_config(&config.rulesync.command, &self.target, &cwd).await
    }
}

fn print_presets() {
    println!("{}\n", "Available presets:".bold());
    for preset in list_presets() {
        println!("  {:<20} {}", preset.name, preset.description);
    }
}

#[derive(Args, Debug)]
pub struct TagCommand {
    /// Entry file of the tool to analyse
    pub entry_file: String,
}

impl CommandExecutor for TagCommand {
    async fn execute_with_config(self, config: ResolvedConfig) -> Result<()> {
        let entry = resolve_path(&self.entry_file, &std::env::current_dir()?)?;
        let executor = ClaudeCliExecutor::from_config(&config.agent);

        match tag_entry_file(&entry, &executor, config.agent.max_turns).await? {
            TagAnswer::Tags(tags) => {
                println!("\n{} {}", "name:".bold(), tags.name);
                println!("{} {}", "description:".bold(), tags.description);
                println!("{} {}", "kinds:".bold(), tags.kinds.join(", "));
                println!("{} {}", "stack:".bold(), tags.stack.join(", "));
            }
            TagAnswer::Raw(text) => println!("\n{text}"),
        }
        Ok(())
    }
}
