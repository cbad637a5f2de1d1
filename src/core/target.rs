//! Installation targets and the `--env` selection.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The environment a plugin is installed into.
///
/// Chosen once per install invocation, either by detection or by `--env`, and never
/// re-evaluated while the installer runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallTarget {
    /// Claude Code plugin directory (`.claude-plugin/<name>`)
    Claude,
    /// Cursor, installed per user under `~/.cursor`
    Cursor,
    /// qoder, installed per project next to `qoder.config.json`
    Qoder,
    /// Nothing recognizable was found
    Unknown,
}

impl InstallTarget {
    /// Lowercase name as used on the command line and in messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Claude => "claude",
            Self::Cursor => "cursor",
            Self::Qoder => "qoder",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for InstallTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value of the `--env` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum EnvSelection {
    /// Probe the target directory for marker files
    #[default]
    Auto,
    /// Force Claude Code
    Claude,
    /// Force Cursor
    Cursor,
    /// Force qoder
    Qoder,
}

impl EnvSelection {
    /// The forced target, or `None` for [`EnvSelection::Auto`].
    #[must_use]
    pub const fn forced(self) -> Option<InstallTarget> {
        match self {
            Self::Auto => None,
            Self::Claude => Some(InstallTarget::Claude),
            Self::Cursor => Some(InstallTarget::Cursor),
            Self::Qoder => Some(InstallTarget::Qoder),
        }
    }
}
