//! Direct Claude Code installer.
//!
//! Copies the whole plugin tree to `<target>/.claude-plugin/<plugin>/` and makes sure
//! every MCP server the manifest declares has an entry in the copied descriptor's
//! `mcpServers` list. Existing entries are left exactly as the plugin author wrote them.

use anyhow::Result;
use serde_json::json;
use std::future::Future;
use std::pin::Pin;

use super::{InstallAction, InstallContext, InstallReport, TargetInstaller, claude_plugin_dir};
use super::shared::{copy_if_present, run_blocking, sdk_usage_hint};
use crate::constants::{MCP_ENTRY_FILE, MCP_LAUNCH_COMMAND};
use crate::core::{InstallTarget, VibeError};
use crate::manifest::descriptor_path;
use crate::registry::{MergePolicy, RegistryFile};

/// Installs into a Claude Code plugin directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClaudeInstaller;

impl ClaudeInstaller {
    fn install_blocking(ctx: &InstallContext) -> Result<InstallReport> {
        let manifest = &ctx.manifest;
        let plugin_target = claude_plugin_dir(&ctx.target_dir, &manifest.name);
        let mut report =
            InstallReport::new(InstallTarget::Claude, ctx.dry_run, plugin_target.clone());

        tracing::info!("Claude Code detected. Installing into {}", plugin_target.display());

        report.actions.push(copy_if_present(
            &manifest.source_dir,
            &plugin_target,
            ctx.dry_run,
            "plugin copy",
        )?);

        let installed_descriptor = descriptor_path(&plugin_target);
        // Under dry-run nothing was copied, so plan from the source descriptor.
        let descriptor_file = if ctx.dry_run {
            manifest.descriptor_path()
        } else {
            installed_descriptor.clone()
        };
        if !descriptor_file.is_file() {
            return Err(VibeError::PostConditionViolation {
                path: descriptor_file.display().to_string(),
                reason: "plugin.json missing after copy".to_string(),
            }
            .into());
        }

        let mut descriptor = RegistryFile::load_required(&descriptor_file)?;
        for server in &manifest.mcp {
            let outcome = descriptor.upsert(
                "mcpServers",
                MergePolicy::APPEND_BY_NAME,
                server,
                json!({
                    "name": server,
                    "description": format!("Installed via vibe-plugins for {}", manifest.label()),
                    "command": MCP_LAUNCH_COMMAND,
                    "args": [format!("./mcp/{server}/{MCP_ENTRY_FILE}")],
                }),
            )?;
            report.actions.push(InstallAction::Register {
                registry: installed_descriptor.clone(),
                section: "mcpServers".to_string(),
                name: server.clone(),
                outcome,
            });
        }

        if !ctx.dry_run && descriptor.needs_save() {
            descriptor.save()?;
        }

        report.notes.push(sdk_usage_hint(&manifest.name));
        Ok(report)
    }
}

impl TargetInstaller for ClaudeInstaller {
    fn target(&self) -> InstallTarget {
        InstallTarget::Claude
    }

    fn install<'a>(
        &'a self,
        ctx: &'a InstallContext,
    ) -> Pin<Box<dyn Future<Output = Result<InstallReport>> + Send + 'a>> {
        Box::pin(run_blocking(ctx, Self::install_blocking))
    }
}
