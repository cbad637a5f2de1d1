//! Scaffold new capabilities inside category plugins.
//!
//! # Examples
//!
//! ```bash
//! vibe-plugins generate -n lint-fix -d "Lint Fixer" -t mcp -c productivity
//! vibe-plugins gen -n review -d "Code Review" -t command -c 效率提升 --dry-run
//! vibe-plugins generate-batch capabilities.json
//! ```
//!
//! A batch file is a JSON array of objects with `name`, `displayName`, `type` and
//! `category`, plus optional `description`, `author` and `team`.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::common::CommandExecutor;
use crate::config::ResolvedConfig;
use crate::generator::{
    CapabilityType, GenerationOutcome, GenerationRequest, Generator, load_batch_file,
};
use crate::utils::resolve_path;

/// Command to generate one capability.
#[derive(Args, Debug)]
pub struct GenerateCommand {
    /// Capability name, used for file names (e.g. `my-tool`)
    #[arg(short, long)]
    pub name: String,

    /// Human-readable name
    #[arg(short, long)]
    pub display_name: String,

    /// Capability type: prompt, skill, mcp, slash-command (or command), agent, hook
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    pub kind: String,

    /// Category slug or label (see `list-types`)
    #[arg(short, long)]
    pub category: String,

    /// Description (defaults to the display name)
    #[arg(long)]
    pub description: Option<String>,

    /// Author or owner
    #[arg(short, long)]
    pub author: Option<String>,

    /// Team name
    #[arg(long)]
    pub team: Option<String>,

    /// Print what would be done without writing anything
    #[arg(long)]
    pub dry_run: bool,
}

impl GenerateCommand {
    fn into_request(self) -> Result<GenerationRequest> {
        let kind: CapabilityType = self.kind.parse()?;
        let description = self
            .description
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| self.display_name.clone());
        Ok(GenerationRequest {
            name: self.name,
            display_name: self.display_name,
            description,
            kind,
            category: self.category,
            author: self.author,
            team: self.team,
        })
    }
}

impl CommandExecutor for GenerateCommand {
    async fn execute_with_config(self, config: ResolvedConfig) -> Result<()> {
        let dry_run = self.dry_run;
        let request = self.into_request()?;
        let generator = Generator::new(&config.plugins_root)?;

        let outcome = generator.generate(&request, dry_run)?;
        print_outcome(&request, &outcome, dry_run);
        Ok(())
    }
}

fn print_outcome(request: &GenerationRequest, outcome: &GenerationOutcome, dry_run: bool) {
    if dry_run {
        println!("\n{}", "Dry run complete. No files were written.".yellow());
        return;
    }

    println!(
        "\n{} {} \"{}\"",
        "Generated".green().bold(),
        request.kind.label(),
        request.display_name
    );
    for file in &outcome.files {
        println!("  {}", file.display());
    }
    if outcome.descriptor_changed {
        println!("  {} plugin.json", "updated".dimmed());
    }
    if outcome.install_manifest_changed {
        println!("  {} install.json", "updated".dimmed());
    }
}

/// Command to generate capabilities from a JSON batch file.
#[derive(Args, Debug)]
pub struct GenerateBatchCommand {
    /// Path to a JSON file holding an array of capability items
    pub json_file: String,

    /// Print what would be done without writing anything
    #[arg(long)]
    pub dry_run: bool,
}

impl CommandExecutor for GenerateBatchCommand {
    async fn execute_with_config(self, config: ResolvedConfig) -> Result<()> {
        let path = resolve_path(&self.json_file, &std::env::current_dir()?)?;
        tracing::info!("Loading batch data from: {}", path.display());

        let items = load_batch_file(&path)?;
        tracing::info!("Found {} items to generate", items.len());

        let results = Generator::new(&config.plugins_root)?.generate_batch(items, self.dry_run);
        let succeeded = results.iter().filter(|r| r.outcome.is_ok()).count();
        let failed = results.len() - succeeded;

        for result in results.iter().filter(|r| r.outcome.is_err()) {
            if let Err(reason) = &result.outcome {
                println!("  {} {}: {reason}", "✗".red(), result.label);
            }
        }

        let summary = format!("Generated: {succeeded} succeeded, {failed} failed");
        if failed == 0 {
            println!("\n{}", summary.green().bold());
        } else {
            println!("\n{}", summary.yellow().bold());
        }
        if self.dry_run {
            println!("{}", "Dry run complete. No files were written.".yellow());
        }
        Ok(())
    }
}
