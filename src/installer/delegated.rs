//! Claude installer that delegates the work to an external agent (`--use-sdk`).
//!
//! Instead of copying files itself, this installer writes a step-by-step instruction
//! prompt describing what [`super::claude::ClaudeInstaller`] would do and hands it to
//! an [`AgentExecutor`]. The outcome is whatever the agent reports; nothing on disk is
//! checked afterwards.

use anyhow::Result;
use std::fmt::Write as _;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;

use super::shared::sdk_usage_hint;
use super::{InstallAction, InstallContext, InstallReport, TargetInstaller, claude_plugin_dir};
use crate::agent::{AgentExecutor, AgentRequest};
use crate::constants::MCP_ENTRY_FILE;
use crate::core::{InstallTarget, VibeError};
use crate::manifest::PluginManifest;

/// Appended to the agent's system prompt.
pub const SYSTEM_APPEND: &str =
    "You are installing a Claude Code plugin. Follow the installation instructions precisely.";

pub struct DelegatedClaudeInstaller {
    executor: Arc<dyn AgentExecutor>,
    max_turns: u32,
}

impl DelegatedClaudeInstaller {
    pub fn new(executor: Arc<dyn AgentExecutor>, max_turns: u32) -> Self {
        Self {
            executor,
            max_turns,
        }
    }

    async fn install_async(&self, ctx: &InstallContext) -> Result<InstallReport> {
        let manifest = &ctx.manifest;
        let plugin_target = claude_plugin_dir(&ctx.target_dir, &manifest.name);
        let mut report =
            InstallReport::new(InstallTarget::Claude, ctx.dry_run, plugin_target.clone());

        tracing::info!("Installing {} using the external agent", manifest.label());
        tracing::info!("Source: {}", manifest.source_dir.display());
        tracing::info!("Target: {}", plugin_target.display());

        let descriptor = manifest.descriptor_path();
        if !descriptor.is_file() {
            return Err(VibeError::SourceNotFound {
                path: descriptor.display().to_string(),
            }
            .into());
        }

        let prompt = build_installation_prompt(manifest, &plugin_target, ctx.dry_run);
        report.actions.push(InstallAction::Delegate {
            prompt: prompt.clone(),
        });

        if ctx.dry_run {
            tracing::info!(
                "[dry-run] Would hand the following instructions to the agent:\n{prompt}"
            );
            return Ok(report);
        }

        let request = AgentRequest {
            prompt,
            cwd: ctx.target_dir.clone(),
            max_turns: self.max_turns,
            additional_dirs: vec![manifest.source_dir.clone()],
            system_append: Some(SYSTEM_APPEND.to_string()),
        };

        let run = self.executor.run(request).await.map_err(|e| {
            let already_typed = matches!(
                e.downcast_ref::<VibeError>(),
                Some(VibeError::DelegatedExecutionFailed { .. } | VibeError::AgentNotFound { .. })
            );
            if already_typed {
                e
            } else {
                VibeError::DelegatedExecutionFailed {
                    reason: format!("{e:#}"),
                }
                .into()
            }
        })?;

        if let Some(result) = &run.result
            && result.is_error
        {
            return Err(VibeError::DelegatedExecutionFailed {
                reason: result
                    .text
                    .clone()
                    .unwrap_or_else(|| "agent reported an error".to_string()),
            }
            .into());
        }

        tracing::info!("Installation completed by the agent");
        if let Some(answer) = run.answer() {
            report.notes.push(format!("Agent: {answer}"));
        }
        report.notes.push(sdk_usage_hint(&manifest.name));
        Ok(report)
    }
}

impl TargetInstaller for DelegatedClaudeInstaller {
    fn target(&self) -> InstallTarget {
        InstallTarget::Claude
    }

    fn install<'a>(
        &'a self,
        ctx: &'a InstallContext,
    ) -> Pin<Box<dyn Future<Output = Result<InstallReport>> + Send + 'a>> {
        Box::pin(self.install_async(ctx))
    }
}

/// The instructions handed to the agent.
///
/// Lists the copy step, one section per unit kind the manifest declares, the tree the
/// agent should end up with and the MCP launch convention.
#[must_use]
pub fn build_installation_prompt(
    manifest: &PluginManifest,
    plugin_target: &Path,
    dry_run: bool,
) -> String {
    let source = &manifest.source_dir;
    let mut out = String::new();

    // Writing to a String cannot fail.
    let _ = writeln!(
        out,
        "Install the Claude Code plugin \"{}\" (v{}) into: {}",
        manifest.label(),
        manifest.version.as_deref().unwrap_or("0.0.0"),
        plugin_target.display()
    );

    let _ = writeln!(out, "\n## Installation Steps:");
    let _ = writeln!(
        out,
        "1. Copy the entire plugin directory from {} to {}",
        source.display(),
        plugin_target.display()
    );
    let _ = writeln!(out, "   - Keep the .claude-plugin/plugin.json structure intact");

    let sections = [
        ("MCP servers", "mcp", &manifest.mcp),
        ("Skills", "skills", &manifest.skills),
        ("Commands", "commands", &manifest.commands),
        ("Agents", "agents", &manifest.agents),
    ];
    let mut step = 2;
    for (title, dir, names) in sections {
        if names.is_empty() {
            continue;
        }
        let _ = writeln!(out, "\n{step}. {title} to install: {}", names.join(", "));
        let _ = writeln!(out, "   - Source files are in: {}", source.join(dir).display());
        if dir == "mcp" {
            for server in names {
                let _ = writeln!(
                    out,
                    "   - Register \"{server}\" in plugin.json mcpServers with command \"node\" and args [\"./mcp/{server}/{MCP_ENTRY_FILE}\"] unless an entry with that name exists"
                );
            }
        }
        step += 1;
    }

    let _ = writeln!(out, "\n## Plugin Structure:");
    let _ = writeln!(out, "```");
    let _ = writeln!(out, "{}/", plugin_target.display());
    let _ = writeln!(out, "├── .claude-plugin/");
    let _ = writeln!(out, "│   └── plugin.json");
    if !manifest.mcp.is_empty() {
        let _ = writeln!(out, "├── mcp/");
        for server in &manifest.mcp {
            let _ = writeln!(out, "│   └── {server}/");
            let _ = writeln!(out, "│       └── {MCP_ENTRY_FILE}");
        }
    }
    for (_, dir, names) in &sections[1..] {
        if !names.is_empty() {
            let _ = writeln!(out, "├── {dir}/");
        }
    }
    let _ = writeln!(out, "```");

    let _ = writeln!(out, "\n## Important:");
    let _ = writeln!(out, "- Preserve all file permissions and structure");
    let _ = writeln!(out, "- MCP server paths in plugin.json must be relative to the plugin root");
    let _ = writeln!(
        out,
        "- Verify the installation by checking that plugin.json exists at the target"
    );

    if dry_run {
        let _ = writeln!(out, "\n[DRY RUN MODE - Do not actually write files]");
    }

    out
}
