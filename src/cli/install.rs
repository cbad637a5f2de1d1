//! Install a plugin into a project.
//!
//! Loads the plugin from the plugins root, detects (or takes from `--env`) the target
//! environment, and runs that environment's installer.
//!
//! # Examples
//!
//! ```bash
//! # Detect the environment of the current directory
//! vibe-plugins install cross-platform
//!
//! # Force qoder and preview without writing
//! vibe-plugins install cross-platform --target ../app --env qoder --dry-run
//!
//! # Let the external agent perform a Claude install
//! vibe-plugins install cross-platform --env claude --use-sdk
//! ```

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::sync::Arc;

use super::common::CommandExecutor;
use crate::agent::{AgentExecutor, ClaudeCliExecutor};
use crate::config::ResolvedConfig;
use crate::core::EnvSelection;
use crate::environment::FsProbe;
use crate::installer::{InstallOptions, InstallReport, install_plugin};
use crate::utils::resolve_path;

/// Command to install a plugin.
#[derive(Args, Debug)]
pub struct InstallCommand {
    /// Plugin name (a directory under the plugins root)
    pub plugin: String,

    /// Target project directory (defaults to the current directory)
    #[arg(short, long, value_name = "PATH")]
    pub target: Option<String>,

    /// Environment to install for; `auto` detects it from the target directory
    #[arg(short, long, value_enum, default_value_t = EnvSelection::Auto)]
    pub env: EnvSelection,

    /// Print what would be done without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Hand a Claude install to the external agent instead of copying files directly
    #[arg(long)]
    pub use_sdk: bool,
}

impl CommandExecutor for InstallCommand {
    async fn execute_with_config(self, config: ResolvedConfig) -> Result<()> {
        let cwd = std::env::current_dir()?;
        let target_dir = match &self.target {
            Some(target) => resolve_path(target, &cwd)?,
            None => cwd,
        };

        let options = InstallOptions {
            target_dir,
            env: self.env,
            dry_run: self.dry_run,
            use_sdk: self.use_sdk,
        };
        let probe = FsProbe::new(config.home_dir.clone());
        let executor: Arc<dyn AgentExecutor> =
            Arc::new(ClaudeCliExecutor::from_config(&config.agent));

        let report = install_plugin(&self.plugin, &options, &config, &probe, executor).await?;
        print_summary(&report);
        Ok(())
    }
}

fn print_summary(report: &InstallReport) {
    if report.dry_run {
        println!("\n{}", "Planned actions:".bold());
        for action in &report.actions {
            println!("  {action}");
        }
    }

    for note in &report.notes {
        println!("\n{note}");
    }

    if report.dry_run {
        println!("\n{}", "Dry run complete. No files were written.".yellow());
        return;
    }

    println!("\n{}", "Installation complete.".green().bold());
    println!("  {} {}", "target:".dimmed(), report.target);
    println!("  {} {}", "destination:".dimmed(), report.destination.display());
    println!("  {} copied, {} skipped", report.copied(), report.skipped());
    let registered = report.registered();
    if !registered.is_empty() {
        println!("  registered: {}", registered.join(", "));
    }
}
