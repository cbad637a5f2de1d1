//! Helpers shared by the direct installers.

use anyhow::Result;
use std::path::Path;

use super::{InstallAction, InstallContext, InstallReport};
use crate::utils::{copy_path, list_files, remove_path};

/// Copy `source` over `destination`, replacing whatever was there.
///
/// A missing source is not an error: the unit is skipped with a warning and a
/// [`InstallAction::Skip`] is returned. Under dry-run the source is only inspected.
pub fn copy_if_present(
    source: &Path,
    destination: &Path,
    dry_run: bool,
    label: &str,
) -> Result<InstallAction> {
    if !source.exists() {
        tracing::warn!("skip {label}: {} not found", source.display());
        return Ok(InstallAction::Skip {
            unit: label.to_string(),
            source: source.to_path_buf(),
        });
    }

    let files = list_files(source)?.len();

    if dry_run {
        tracing::info!("[dry-run] copy {} -> {}", source.display(), destination.display());
    } else {
        tracing::debug!("Copying {} -> {}", source.display(), destination.display());
        remove_path(destination)?;
        copy_path(source, destination)?;
    }

    Ok(InstallAction::Copy {
        from: source.to_path_buf(),
        to: destination.to_path_buf(),
        files,
    })
}

/// Run a direct installer's filesystem work on tokio's blocking pool.
///
/// The copies walk whole trees with `walkdir` and `std::fs`, so they stay off the
/// runtime thread. The context is cloned into the task.
pub async fn run_blocking<F>(ctx: &InstallContext, install: F) -> Result<InstallReport>
where
    F: FnOnce(&InstallContext) -> Result<InstallReport> + Send + 'static,
{
    let ctx = ctx.clone();
    tokio::task::spawn_blocking(move || install(&ctx))
        .await
        .map_err(|e| anyhow::anyhow!("Installer task failed: {e}"))?
}

/// How to load a Claude-installed plugin from the Agent SDK.
#[must_use]
pub fn sdk_usage_hint(plugin: &str) -> String {
    format!(
        "To use this plugin with the Agent SDK, include it in your query options:\n    \
         plugins: [{{ type: \"local\", path: \"./.claude-plugin/{plugin}\" }}]"
    )
}
