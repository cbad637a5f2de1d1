//! Global configuration file (`~/.vibe-plugins/config.toml`).
//!
//! Every key is optional. A missing file is the same as an empty one.
//!
//! ```toml
//! plugins_root = "~/work/vibe/plugins"
//! presets_root = "~/work/vibe/presets"
//! cursor_home = "~/.cursor"
//!
//! [agent]
//! command = "claude"
//! max_turns = 5
//!
//! [rulesync]
//! command = "npx"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::constants::{
    CONFIG_DIR, CONFIG_FILE, DEFAULT_AGENT_COMMAND, DEFAULT_AGENT_MAX_TURNS,
    DEFAULT_RULESYNC_COMMAND,
};

/// Parsed contents of the global configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct GlobalConfig {
    /// Directory holding one sub-directory per plugin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugins_root: Option<String>,

    /// Directory holding one sub-directory per rulesync preset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presets_root: Option<String>,

    /// Cursor home directory, normally `~/.cursor`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor_home: Option<String>,

    /// External agent used by `--use-sdk` and `vp tag`.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Launcher for `rulesync generate`.
    #[serde(default)]
    pub rulesync: RulesyncConfig,
}

/// `[agent]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Agent CLI binary
    #[serde(default = "default_agent_command")]
    pub command: String,
    /// Maximum number of agent turns per request
    #[serde(default = "default_max_turns")]
    pub max_turns: u32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            command: default_agent_command(),
            max_turns: default_max_turns(),
        }
    }
}

/// `[rulesync]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesyncConfig {
    /// Launcher binary (`npx` runs the published rulesync package)
    #[serde(default = "default_rulesync_command")]
    pub command: String,
}

impl Default for RulesyncConfig {
    fn default() -> Self {
        Self {
            command: default_rulesync_command(),
        }
    }
}

fn default_agent_command() -> String {
    DEFAULT_AGENT_COMMAND.to_string()
}

const fn default_max_turns() -> u32 {
    DEFAULT_AGENT_MAX_TURNS
}

fn default_rulesync_command() -> String {
    DEFAULT_RULESYNC_COMMAND.to_string()
}

impl GlobalConfig {
    /// Load from `path` when given, otherwise from [`GlobalConfig::default_path`].
    /// A missing file yields the default configuration.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => match Self::default_path() {
                Ok(path) => path,
                Err(e) => {
                    tracing::debug!("No home directory, using default configuration: {e}");
                    return Ok(Self::default());
                }
            },
        };

        if path.exists() {
            Self::load_from(&path).await
        } else {
            tracing::debug!("No configuration file at {}", path.display());
            Ok(Self::default())
        }
    }

    /// Load and parse a specific configuration file.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// `~/.vibe-plugins/config.toml`
    pub fn default_path() -> Result<PathBuf> {
        Ok(crate::utils::get_home_dir()?.join(CONFIG_DIR).join(CONFIG_FILE))
    }
}
