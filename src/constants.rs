//! File names, directory names and defaults shared across the crate.

/// Directory inside a plugin (and inside a Claude target) holding the descriptor.
pub const CLAUDE_PLUGIN_DIR: &str = ".claude-plugin";

/// Plugin descriptor file name, inside [`CLAUDE_PLUGIN_DIR`].
pub const DESCRIPTOR_FILE: &str = "plugin.json";

/// Optional install-manifest at the plugin root.
pub const INSTALL_MANIFEST_FILE: &str = "install.json";

/// Claude markers probed under the target directory, in order.
pub const CLAUDE_MARKERS: &[&str] =
    &[".claude", ".claude-plugin", ".vscode/extensions/claude.code"];

/// Project-level Cursor marker.
pub const CURSOR_PROJECT_MARKER: &str = "cursor.json";

/// Cursor home directory name under the user's home.
pub const CURSOR_HOME_DIR: &str = ".cursor";

/// Global Cursor settings file, inside the Cursor home.
pub const CURSOR_SETTINGS_FILE: &str = "settings.json";

/// Per-plugin store inside the Cursor home.
pub const CURSOR_STORE_DIR: &str = "vibe-plugins";

/// qoder project configuration file.
pub const QODER_CONFIG_FILE: &str = "qoder.config.json";

/// Entry point every MCP server folder is expected to contain.
pub const MCP_ENTRY_FILE: &str = "index.js";

/// Command used to launch MCP servers.
pub const MCP_LAUNCH_COMMAND: &str = "node";

/// Default plugins root, relative to the current directory.
pub const DEFAULT_PLUGINS_DIR: &str = "plugins";

/// Default presets root, relative to the current directory.
pub const DEFAULT_PRESETS_DIR: &str = "presets";

/// Directory of the global configuration under the user's home.
pub const CONFIG_DIR: &str = ".vibe-plugins";

/// Global configuration file name.
pub const CONFIG_FILE: &str = "config.toml";

/// Directory rulesync reads presets from.
pub const RULESYNC_DIR: &str = ".rulesync";

/// Default agent CLI used for delegated installs and tagging.
pub const DEFAULT_AGENT_COMMAND: &str = "claude";

/// Default turn limit handed to the agent.
pub const DEFAULT_AGENT_MAX_TURNS: u32 = 5;

/// Default launcher for rulesync.
pub const DEFAULT_RULESYNC_COMMAND: &str = "npx";

/// Author written into freshly initialised plugin descriptors.
pub const DEFAULT_PLUGIN_AUTHOR: &str = "Vibe Team";

/// Version written into freshly initialised plugin descriptors.
pub const DEFAULT_PLUGIN_VERSION: &str = "1.0.0";
