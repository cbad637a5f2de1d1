//! vibe-plugins - universal AI plugin installer
//!
//! Installs plugins (bundles of MCP servers, skills, slash commands and agents) into
//! the three AI coding environments it knows about, scaffolds new capabilities into
//! category plugins, and manages rulesync presets.
//!
//! # Architecture Overview
//!
//! A plugin lives under the plugins root as:
//!
//! ```text
//! plugins/<plugin>/
//! ├── .claude-plugin/plugin.json   descriptor (name, version, mcpServers, ...)
//! ├── install.json                 optional: which units to install
//! ├── mcp/<server>/index.js
//! ├── skills/<skill>/
//! ├── commands/<command>.md
//! └── agents/<agent>.md
//! ```
//!
//! `install` loads the plugin ([`manifest`]), works out where it is going
//! ([`environment`]), and hands it to one installer ([`installer`]):
//!
//! | Target | Installs to | Registry |
//! |---|---|---|
//! | Claude Code | `<project>/.claude-plugin/<plugin>/` | the copied `plugin.json` |
//! | Cursor | `~/.cursor/vibe-plugins/<plugin>/mcp/` | `~/.cursor/settings.json` |
//! | qoder | `<project>/mcp/<plugin>/`, `skills/`, `commands/`, `agents/` | `qoder.config.json` |
//!
//! Claude installs can instead be delegated to an external coding agent ([`agent`]).
//! Registry files are merged, never overwritten wholesale ([`registry`]).
//!
//! # Core Modules
//!
//! - [`cli`] - command-line front-ends for `vibe-plugins` and `vp`
//! - [`config`] - global configuration file and flag precedence
//! - [`core`] - error types and the install target
//! - [`manifest`] - plugin descriptor and install manifest loading
//! - [`environment`] - target environment detection
//! - [`installer`] - per-target installers and dispatch
//! - [`registry`] - JSON registry read-merge-write
//! - [`agent`] - external agent and subprocess execution
//! - [`generator`] - capability scaffolding
//! - [`presets`] - rulesync preset operations
//! - [`utils`] - file system and platform helpers
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vibe_plugins::agent::ClaudeCliExecutor;
//! use vibe_plugins::config::{ConfigOverrides, GlobalConfig, ResolvedConfig};
//! use vibe_plugins::core::EnvSelection;
//! use vibe_plugins::environment::FsProbe;
//! use vibe_plugins::installer::{InstallOptions, install_plugin};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let cwd = std::env::current_dir()?;
//! let home = vibe_plugins::utils::home_dir();
//! let config = ResolvedConfig::resolve(
//!     ConfigOverrides::default(),
//!     GlobalConfig::default(),
//!     &cwd,
//!     home.clone(),
//! )?;
//!
//! let options = InstallOptions {
//!     target_dir: cwd,
//!     env: EnvSelection::Auto,
//!     dry_run: true,
//!     use_sdk: false,
//! };
//! let report = install_plugin(
//!     "cross-platform",
//!     &options,
//!     &config,
//!     &FsProbe::new(home),
//!     Arc::new(ClaudeCliExecutor::from_config(&config.agent)),
//! )
//! .await?;
//! for action in &report.actions {
//!     println!("{action}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod environment;
pub mod generator;
pub mod installer;
pub mod manifest;
pub mod presets;
pub mod registry;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
