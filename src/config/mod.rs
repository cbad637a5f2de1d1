//! Configuration for vibe-plugins.
//!
//! Settings come from three layers, highest priority first:
//!
//! 1. command-line flags and their environment variables
//!    (`--plugins-root` / `VIBE_PLUGINS_ROOT`, `--presets-root` / `VIBE_PRESETS_ROOT`)
//! 2. the global configuration file ([`GlobalConfig`])
//! 3. built-in defaults (`./plugins`, `./presets`, `~/.cursor`)
//!
//! [`ResolvedConfig`] is the flattened result handed to the library operations, so
//! nothing below the CLI reads process-global state on its own.

mod global;

pub use global::{AgentConfig, GlobalConfig, RulesyncConfig};

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::constants::{CURSOR_HOME_DIR, DEFAULT_PLUGINS_DIR, DEFAULT_PRESETS_DIR};
use crate::utils::resolve_path;

/// Overrides coming from the command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// `--plugins-root`
    pub plugins_root: Option<PathBuf>,
    /// `--presets-root`
    pub presets_root: Option<PathBuf>,
}

/// Fully resolved settings for one invocation.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Directory holding one sub-directory per plugin
    pub plugins_root: PathBuf,
    /// Directory holding one sub-directory per preset
    pub presets_root: PathBuf,
    /// The user's home directory, when known
    pub home_dir: Option<PathBuf>,
    /// Cursor home (`~/.cursor` unless configured)
    pub cursor_home: Option<PathBuf>,
    /// External agent settings
    pub agent: AgentConfig,
    /// rulesync launcher settings
    pub rulesync: RulesyncConfig,
}

impl ResolvedConfig {
    /// Merge overrides, the file configuration and defaults.
    ///
    /// Relative paths are resolved against `cwd`.
    pub fn resolve(
        overrides: ConfigOverrides,
        file: GlobalConfig,
        cwd: &Path,
        home_dir: Option<PathBuf>,
    ) -> Result<Self> {
        let plugins_root = match (overrides.plugins_root, file.plugins_root) {
            (Some(path), _) => cwd.join(path),
            (None, Some(configured)) => resolve_path(&configured, cwd)?,
            (None, None) => cwd.join(DEFAULT_PLUGINS_DIR),
        };

        let presets_root = match (overrides.presets_root, file.presets_root) {
            (Some(path), _) => cwd.join(path),
            (None, Some(configured)) => resolve_path(&configured, cwd)?,
            (None, None) => cwd.join(DEFAULT_PRESETS_DIR),
        };

        let cursor_home = match file.cursor_home {
            Some(configured) => Some(resolve_path(&configured, cwd)?),
            None => home_dir.as_ref().map(|home| home.join(CURSOR_HOME_DIR)),
        };

        Ok(Self {
            plugins_root,
            presets_root,
            home_dir,
            cursor_home,
            agent: file.agent,
            rulesync: file.rulesync,
        })
    }
}
