//! qoder installer.
//!
//! Per-project layout:
//!
//! ```text
//! <target>/
//! ├── qoder.config.json
//! ├── mcp/<plugin>/<server>/index.js
//! ├── skills/<skill>/
//! ├── commands/<command>.md
//! └── agents/<agent>.md
//! ```
//!
//! MCP servers are upserted into `qoder.config.json` by name and may have their fields
//! updated; skills, commands and agents are plain name lists.

use anyhow::Result;
use serde_json::json;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use super::shared::{copy_if_present, run_blocking};
use super::{InstallAction, InstallContext, InstallReport, TargetInstaller};
use crate::constants::{MCP_ENTRY_FILE, MCP_LAUNCH_COMMAND, QODER_CONFIG_FILE};
use crate::core::InstallTarget;
use crate::registry::{MergePolicy, RegistryFile};

#[derive(Debug, Clone, Copy, Default)]
pub struct QoderInstaller;

impl QoderInstaller {
    fn install_blocking(ctx: &InstallContext) -> Result<InstallReport> {
        let manifest = &ctx.manifest;
        let source = &manifest.source_dir;
        let target = &ctx.target_dir;
        let mcp_root = target.join("mcp").join(&manifest.name);
        let config_path = target.join(QODER_CONFIG_FILE);
        let mut report = InstallReport::new(InstallTarget::Qoder, ctx.dry_run, target.clone());

        tracing::info!("qoder detected. Installing into {}", target.display());

        let mut copies: Vec<(String, PathBuf, PathBuf)> = Vec::new();
        for server in &manifest.mcp {
            copies.push((
                format!("qoder mcp {server}"),
                source.join("mcp").join(server),
                mcp_root.join(server),
            ));
        }
        for skill in &manifest.skills {
            copies.push((
                format!("qoder skill {skill}"),
                source.join("skills").join(skill),
                target.join("skills").join(skill),
            ));
        }
        for command in &manifest.commands {
            let file = format!("{command}.md");
            copies.push((
                format!("qoder command {command}"),
                source.join("commands").join(&file),
                target.join("commands").join(&file),
            ));
        }
        for agent in &manifest.agents {
            let file = format!("{agent}.md");
            copies.push((
                format!("qoder agent {agent}"),
                source.join("agents").join(&file),
                target.join("agents").join(&file),
            ));
        }

        for (label, from, to) in &copies {
            report.actions.push(copy_if_present(from, to, ctx.dry_run, label)?);
        }

        let mut config = RegistryFile::load_or(&config_path, json!({}))?;
        config.set_default("mcp", json!([]));

        // Every declared server is registered, copied or not.
        for server in &manifest.mcp {
            let outcome = config.upsert(
                "mcp",
                MergePolicy::UPSERT_BY_NAME,
                server,
                json!({
                    "name": server,
                    "command": MCP_LAUNCH_COMMAND,
                    "args": [format!("./mcp/{}/{server}/{MCP_ENTRY_FILE}", manifest.name)],
                }),
            )?;
            report.actions.push(register(&config_path, "mcp", server, outcome));
        }

        for (section, names) in [
            ("skills", &manifest.skills),
            ("commands", &manifest.commands),
            ("agents", &manifest.agents),
        ] {
            for name in names {
                let outcome =
                    config.upsert(section, MergePolicy::NameSet, name, serde_json::Value::Null)?;
                report.actions.push(register(&config_path, section, name, outcome));
            }
        }

        if !ctx.dry_run && config.needs_save() {
            config.save()?;
        }

        Ok(report)
    }
}

fn register(
    registry: &std::path::Path,
    section: &str,
    name: &str,
    outcome: crate::registry::UpsertOutcome,
) -> InstallAction {
    InstallAction::Register {
        registry: registry.to_path_buf(),
        section: section.to_string(),
        name: name.to_string(),
        outcome,
    }
}

impl TargetInstaller for QoderInstaller {
    fn target(&self) -> InstallTarget {
        InstallTarget::Qoder
    }

    fn install<'a>(
        &'a self,
        ctx: &'a InstallContext,
    ) -> Pin<Box<dyn Future<Output = Result<InstallReport>> + Send + 'a>> {
        Box::pin(run_blocking(ctx, Self::install_blocking))
    }
}
