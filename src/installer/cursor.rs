//! Cursor installer.
//!
//! Cursor has no per-project plugin directory, so the install is per user: each MCP
//! server is copied into `~/.cursor/vibe-plugins/<plugin>/mcp/<server>/` and
//! registered in `~/.cursor/settings.json` with an absolute launch path. Skills,
//! commands and agents have no Cursor equivalent and are reported as unsupported.

use anyhow::Result;
use serde_json::json;
use std::future::Future;
use std::pin::Pin;

use super::shared::{copy_if_present, run_blocking};
use super::{InstallAction, InstallContext, InstallReport, TargetInstaller};
use crate::constants::{
    CURSOR_SETTINGS_FILE, CURSOR_STORE_DIR, MCP_ENTRY_FILE, MCP_LAUNCH_COMMAND,
};
use crate::core::InstallTarget;
use crate::registry::{MergePolicy, RegistryFile};

#[derive(Debug, Clone, Copy, Default)]
pub struct CursorInstaller;

impl CursorInstaller {
    fn install_blocking(ctx: &InstallContext) -> Result<InstallReport> {
        let manifest = &ctx.manifest;
        let cursor_home = ctx.cursor_home.as_deref().ok_or_else(|| {
            anyhow::anyhow!(
                "Could not determine the Cursor home directory. \
                 Set cursor_home in the configuration file."
            )
        })?;

        let store = cursor_home.join(CURSOR_STORE_DIR).join(&manifest.name);
        let mcp_root = store.join("mcp");
        let settings_path = cursor_home.join(CURSOR_SETTINGS_FILE);
        let mut report = InstallReport::new(InstallTarget::Cursor, ctx.dry_run, store);

        tracing::info!("Cursor detected. Installing MCP into {}", mcp_root.display());

        let mut copied = Vec::new();
        for server in &manifest.mcp {
            let destination = mcp_root.join(server);
            let action = copy_if_present(
                &manifest.source_dir.join("mcp").join(server),
                &destination,
                ctx.dry_run,
                &format!("cursor mcp {server}"),
            )?;
            if action.is_copy() {
                copied.push((server, destination));
            }
            report.actions.push(action);
        }

        if !copied.is_empty() {
            let mut settings = RegistryFile::load_or(&settings_path, json!({}))?;
            for (server, destination) in &copied {
                let outcome = settings.upsert(
                    "mcpServers",
                    MergePolicy::ReplaceByKey,
                    server,
                    json!({
                        "command": MCP_LAUNCH_COMMAND,
                        "args": [destination.join(MCP_ENTRY_FILE).display().to_string()],
                    }),
                )?;
                report.actions.push(InstallAction::Register {
                    registry: settings_path.clone(),
                    section: "mcpServers".to_string(),
                    name: (*server).clone(),
                    outcome,
                });
            }
            if !ctx.dry_run && settings.needs_save() {
                settings.save()?;
            }
        }

        for (kind, names) in [
            ("skills", &manifest.skills),
            ("commands", &manifest.commands),
            ("agents", &manifest.agents),
        ] {
            if !names.is_empty() {
                tracing::warn!("Cursor does not support {kind}; skipped: {}", names.join(", "));
                report.actions.push(InstallAction::Unsupported {
                    kind: kind.to_string(),
                    names: names.clone(),
                });
            }
        }

        report.notes.push(if copied.is_empty() {
            "No MCP servers to install".to_string()
        } else {
            format!("Cursor settings updated ({} MCP servers)", copied.len())
        });
        Ok(report)
    }
}

impl TargetInstaller for CursorInstaller {
    fn target(&self) -> InstallTarget {
        InstallTarget::Cursor
    }

    fn install<'a>(
        &'a self,
        ctx: &'a InstallContext,
    ) -> Pin<Box<dyn Future<Output = Result<InstallReport>> + Send + 'a>> {
        Box::pin(run_blocking(ctx, Self::install_blocking))
    }
}
