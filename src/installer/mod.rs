//! Installation dispatch and the per-target installers.
//!
//! An install runs in four steps:
//!
//! 1. load the [`PluginManifest`] from the plugins root
//! 2. resolve the [`InstallTarget`] (forced by `--env` or probed)
//! 3. pick exactly one installer with [`get_installer`]
//! 4. let it copy files and update its target's registry
//!
//! Every installer consumes the same [`InstallContext`] and answers an
//! [`InstallReport`] listing the [`InstallAction`]s it took. With `dry_run` set the
//! installers compute the same actions, reading whatever they need, but write nothing.
//!
//! | Installer | Layout | Registry |
//! |---|---|---|
//! | [`claude::ClaudeInstaller`] | `<target>/.claude-plugin/<plugin>/` | the copied `plugin.json` `mcpServers` |
//! | [`cursor::CursorInstaller`] | `~/.cursor/vibe-plugins/<plugin>/mcp/<server>/` | `~/.cursor/settings.json` `mcpServers` |
//! | [`qoder::QoderInstaller`] | `<target>/{mcp/<plugin>,skills,commands,agents}/` | `<target>/qoder.config.json` |
//! | [`delegated::DelegatedClaudeInstaller`] | whatever the agent does | none verified |
//!
//! Filesystem errors propagate as they happen. There is no rollback, so a failure in
//! the middle of an install can leave a partially populated target.

pub mod claude;
pub mod cursor;
pub mod delegated;
pub mod qoder;
mod shared;


pub use shared::{copy_if_present, sdk_usage_hint};

use anyhow::Result;
use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;

use crate::agent::AgentExecutor;
use crate::config::ResolvedConfig;
use crate::core::{EnvSelection, InstallTarget, VibeError};
use crate::environment::{EnvironmentProbe, resolve_target};
use crate::manifest::{PluginManifest, load_manifest};
use crate::registry::UpsertOutcome;

use claude::ClaudeInstaller;
use cursor::CursorInstaller;
use delegated::DelegatedClaudeInstaller;
use qoder::QoderInstaller;

/// What the user asked for on the command line.
#[derive(Debug, Clone)]
pub struct InstallOptions {
    /// Project directory to install into
    pub target_dir: PathBuf,
    pub env: EnvSelection,
    pub dry_run: bool,
    /// Hand the Claude install to the external agent
    pub use_sdk: bool,
}

/// Everything an installer needs; built once per install and never changed.
#[derive(Debug, Clone)]
pub struct InstallContext {
    pub manifest: PluginManifest,
    pub target_dir: PathBuf,
    pub dry_run: bool,
    /// Cursor home directory, when one could be determined
    pub cursor_home: Option<PathBuf>,
}

/// One step an installer took, or would take under dry-run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum InstallAction {
    /// A file or directory tree copied from `from` to `to`
    Copy {
        from: PathBuf,
        to: PathBuf,
        files: usize,
    },
    /// A unit whose source does not exist
    Skip {
        unit: String,
        source: PathBuf,
    },
    /// A registry entry merged into a JSON file
    Register {
        registry: PathBuf,
        section: String,
        name: String,
        outcome: UpsertOutcome,
    },
    /// Units the target cannot install
    Unsupported {
        kind: String,
        names: Vec<String>,
    },
    /// Work handed to the external agent
    Delegate {
        prompt: String,
    },
}

impl InstallAction {
    #[must_use]
    pub const fn is_copy(&self) -> bool {
        matches!(self, Self::Copy { .. })
    }
}

impl fmt::Display for InstallAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Copy {
                from,
                to,
                files,
            } => write!(f, "copy {} -> {} ({files} files)", from.display(), to.display()),
            Self::Skip {
                unit,
                source,
            } => write!(f, "skip {unit}: {} not found", source.display()),
            Self::Register {
                registry,
                section,
                name,
                outcome,
            } => write!(f, "register {section}.{name} in {} ({outcome})", registry.display()),
            Self::Unsupported {
                kind,
                names,
            } => write!(f, "unsupported {kind}: {}", names.join(", ")),
            Self::Delegate {
                prompt,
            } => write!(f, "delegate to agent ({} line prompt)", prompt.lines().count()),
        }
    }
}

/// Result of one installer run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallReport {
    pub target: InstallTarget,
    pub dry_run: bool,
    /// Main install location (plugin directory, Cursor store or project directory)
    pub destination: PathBuf,
    pub actions: Vec<InstallAction>,
    /// Hints for the user, printed after the summary
    pub notes: Vec<String>,
}

impl InstallReport {
    #[must_use]
    pub const fn new(target: InstallTarget, dry_run: bool, destination: PathBuf) -> Self {
        Self {
            target,
            dry_run,
            destination,
            actions: Vec::new(),
            notes: Vec::new(),
        }
    }

    /// Number of copy actions.
    #[must_use]
    pub fn copied(&self) -> usize {
        self.actions.iter().filter(|a| a.is_copy()).count()
    }

    /// Number of skipped units.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.actions.iter().filter(|a| matches!(a, InstallAction::Skip { .. })).count()
    }

    /// Names registered with a changing outcome.
    #[must_use]
    pub fn registered(&self) -> Vec<&str> {
        self.actions
            .iter()
            .filter_map(|a| match a {
                InstallAction::Register {
                    name,
                    outcome,
                    ..
                } if outcome.changed() => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// An installer for one target.
pub trait TargetInstaller: Send + Sync {
    /// The target this installer handles.
    fn target(&self) -> InstallTarget;

    /// Install `ctx.manifest` into the target.
    fn install<'a>(
        &'a self,
        ctx: &'a InstallContext,
    ) -> Pin<Box<dyn Future<Output = Result<InstallReport>> + Send + 'a>>;
}

/// Enum dispatch over the available installers.
pub enum ConcreteInstaller {
    Claude(ClaudeInstaller),
    Cursor(CursorInstaller),
    Qoder(QoderInstaller),
    Delegated(DelegatedClaudeInstaller),
}

impl ConcreteInstaller {
    /// Short name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Claude(_) => "claude",
            Self::Cursor(_) => "cursor",
            Self::Qoder(_) => "qoder",
            Self::Delegated(_) => "claude-sdk",
        }
    }
}

impl TargetInstaller for ConcreteInstaller {
    fn target(&self) -> InstallTarget {
        match self {
            Self::Claude(i) => i.target(),
            Self::Cursor(i) => i.target(),
            Self::Qoder(i) => i.target(),
            Self::Delegated(i) => i.target(),
        }
    }

    fn install<'a>(
        &'a self,
        ctx: &'a InstallContext,
    ) -> Pin<Box<dyn Future<Output = Result<InstallReport>> + Send + 'a>> {
        match self {
            Self::Claude(i) => i.install(ctx),
            Self::Cursor(i) => i.install(ctx),
            Self::Qoder(i) => i.install(ctx),
            Self::Delegated(i) => i.install(ctx),
        }
    }
}

impl fmt::Debug for ConcreteInstaller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConcreteInstaller({})", self.name())
    }
}

/// Pick the installer for `target`.
///
/// `use_sdk` only applies to Claude; for any other target it is ignored with a
/// warning. [`InstallTarget::Unknown`] is [`VibeError::UnknownEnvironment`]; nothing
/// has touched the filesystem at that point.
pub fn get_installer(
    target: InstallTarget,
    use_sdk: bool,
    executor: Arc<dyn AgentExecutor>,
    max_turns: u32,
) -> Result<ConcreteInstaller> {
    if use_sdk && target != InstallTarget::Claude && target != InstallTarget::Unknown {
        tracing::warn!("--use-sdk only applies to Claude; using the {target} installer");
    }

    match target {
        InstallTarget::Claude if use_sdk => Ok(ConcreteInstaller::Delegated(
            DelegatedClaudeInstaller::new(executor, max_turns),
        )),
        InstallTarget::Claude => Ok(ConcreteInstaller::Claude(ClaudeInstaller)),
        InstallTarget::Cursor => Ok(ConcreteInstaller::Cursor(CursorInstaller)),
        InstallTarget::Qoder => Ok(ConcreteInstaller::Qoder(QoderInstaller)),
        InstallTarget::Unknown => Err(VibeError::UnknownEnvironment {
            name: target.to_string(),
        }
        .into()),
    }
}

/// Load, detect, dispatch: the whole `install` command.
pub async fn install_plugin(
    plugin: &str,
    options: &InstallOptions,
    config: &ResolvedConfig,
    probe: &dyn EnvironmentProbe,
    executor: Arc<dyn AgentExecutor>,
) -> Result<InstallReport> {
    let manifest = load_manifest(&config.plugins_root, plugin)?;

    let target = resolve_target(options.env, probe, &options.target_dir);
    if target == InstallTarget::Unknown {
        return Err(VibeError::EnvironmentNotDetected {
            target_dir: options.target_dir.display().to_string(),
        }
        .into());
    }

    tracing::info!(
        "Installing {} v{} for {target} (target: {})",
        manifest.label(),
        manifest.version.as_deref().unwrap_or("0.0.0"),
        options.target_dir.display()
    );

    let installer = get_installer(target, options.use_sdk, executor, config.agent.max_turns)?;
    tracing::debug!("Dispatching to {} installer", installer.name());

    let ctx = InstallContext {
        manifest,
        target_dir: options.target_dir.clone(),
        dry_run: options.dry_run,
        cursor_home: config.cursor_home.clone(),
    };
    installer.install(&ctx).await
}

/// `<target>/.claude-plugin/<plugin>`
#[must_use]
pub fn claude_plugin_dir(target_dir: &Path, plugin: &str) -> PathBuf {
    target_dir.join(crate::constants::CLAUDE_PLUGIN_DIR).join(plugin)
}
