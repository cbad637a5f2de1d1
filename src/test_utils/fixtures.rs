//! Builder for plugin directories used in tests.

use anyhow::Result;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};

use crate::manifest::{descriptor_path, install_manifest_path};
use crate::utils::{ensure_dir, safe_write, write_json_file};

/// A plugin directory to be written under a plugins root.
///
/// ```rust,no_run
/// use vibe_plugins::test_utils::PluginFixture;
///
/// # fn example(plugins_root: &std::path::Path) -> anyhow::Result<()> {
/// PluginFixture::new("demo")
///     .with_mcp("alpha")
///     .skill_source("fmt")
///     .install_json(serde_json::json!({"mcp": ["alpha"], "skills": ["fmt"]}))
///     .write(plugins_root)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PluginFixture {
    pub name: String,
    descriptor: Value,
    install: Option<Value>,
    files: Vec<(PathBuf, String)>,
}

impl PluginFixture {
    /// A plugin with a minimal descriptor and no units.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            descriptor: json!({
                "name": name,
                "displayName": format!("{name} plugin"),
                "version": "1.0.0",
                "mcpServers": []
            }),
            install: None,
            files: Vec::new(),
        }
    }

    /// Replace the whole descriptor.
    #[must_use]
    pub fn descriptor(mut self, descriptor: Value) -> Self {
        self.descriptor = descriptor;
        self
    }

    /// Write an `install.json`.
    #[must_use]
    pub fn install_json(mut self, install: Value) -> Self {
        self.install = Some(install);
        self
    }

    /// Declare an MCP server in the descriptor only.
    #[must_use]
    pub fn descriptor_mcp(mut self, server: &str) -> Self {
        if let Some(list) = self.descriptor.get_mut("mcpServers").and_then(Value::as_array_mut) {
            list.push(json!({
                "name": server,
                "command": "node",
                "args": [format!("./mcp/{server}/index.js")]
            }));
        }
        self
    }

    /// Create `mcp/<server>/index.js` only.
    #[must_use]
    pub fn mcp_source(self, server: &str) -> Self {
        self.file(&format!("mcp/{server}/index.js"), &format!("// {server} server\n"))
    }

    /// Declare the server in the descriptor and create its source.
    #[must_use]
    pub fn with_mcp(self, server: &str) -> Self {
        self.descriptor_mcp(server).mcp_source(server)
    }

    /// Create `skills/<skill>/SKILL.md`.
    #[must_use]
    pub fn skill_source(self, skill: &str) -> Self {
        self.file(&format!("skills/{skill}/SKILL.md"), &format!("# {skill}\n"))
    }

    /// Create `commands/<command>.md`.
    #[must_use]
    pub fn command_source(self, command: &str) -> Self {
        self.file(&format!("commands/{command}.md"), &format!("# /{command}\n"))
    }

    /// Create `agents/<agent>.md`.
    #[must_use]
    pub fn agent_source(self, agent: &str) -> Self {
        self.file(&format!("agents/{agent}.md"), &format!("# {agent}\n"))
    }

    /// Add an arbitrary file relative to the plugin root.
    #[must_use]
    pub fn file(mut self, relative: &str, content: &str) -> Self {
        self.files.push((PathBuf::from(relative), content.to_string()));
        self
    }

    /// Write the plugin to `<plugins_root>/<name>` and return that directory.
    pub fn write(&self, plugins_root: &Path) -> Result<PathBuf> {
        let dir = plugins_root.join(&self.name);
        ensure_dir(&dir)?;
        write_json_file(&descriptor_path(&dir), &self.descriptor)?;
        if let Some(install) = &self.install {
            write_json_file(&install_manifest_path(&dir), install)?;
        }
        for (relative, content) in &self.files {
            safe_write(&dir.join(relative), content)?;
        }
        Ok(dir)
    }
}
