//! Plugin descriptor and install-manifest loading.
//!
//! A plugin lives in its own directory under the plugins root:
//!
//! ```text
//! plugins/
//! └── ux-optimization/
//!     ├── .claude-plugin/
//!     │   └── plugin.json      # descriptor (required)
//!     ├── install.json         # install-manifest (optional)
//!     ├── mcp/<server>/index.js
//!     ├── skills/<skill>/SKILL.md
//!     ├── commands/<command>.md
//!     └── agents/<agent>.md
//! ```
//!
//! The descriptor carries the canonical metadata and the capability registries the
//! generator maintains. The install-manifest lists the units that should actually be
//! installed. [`load_manifest`] merges both into one [`PluginManifest`]: every list the
//! install-manifest declares wins, every list it omits is derived from the descriptor.
//!
//! ```json
//! // .claude-plugin/plugin.json
//! {
//!   "name": "demo",
//!   "displayName": "Demo",
//!   "mcpServers": [{ "name": "alpha", "command": "node", "args": ["./mcp/alpha/index.js"] }],
//!   "commands": [{ "name": "review", "description": "Review the diff" }]
//! }
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::{CLAUDE_PLUGIN_DIR, DESCRIPTOR_FILE, INSTALL_MANIFEST_FILE};
use crate::core::VibeError;
use crate::utils::{read_json_file, validate_name};

/// The plugin's own `.claude-plugin/plugin.json`.
///
/// Unknown fields are accepted and ignored; the generator edits the file as raw JSON
/// so they survive round-trips.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub skills: Vec<NamedEntry>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub commands: Vec<NamedEntry>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub agents: Vec<NamedEntry>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub hooks: Vec<NamedEntry>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub mcp_servers: Vec<McpServerEntry>,
}

/// `null` reads as an empty list, the same as an absent field.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// A named entry in one of the descriptor's capability lists.
///
/// Accepts both `"review"` and `{ "name": "review", ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "NamedEntryRepr")]
pub struct NamedEntry {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NamedEntryRepr {
    Bare(String),
    Full {
        name: String,
        #[serde(default)]
        description: Option<String>,
    },
}

impl From<NamedEntryRepr> for NamedEntry {
    fn from(repr: NamedEntryRepr) -> Self {
        match repr {
            NamedEntryRepr::Bare(name) => Self {
                name,
                description: None,
            },
            NamedEntryRepr::Full {
                name,
                description,
            } => Self {
                name,
                description,
            },
        }
    }
}

/// One entry of the descriptor's `mcpServers` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct McpServerEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
}

/// The optional `install.json` at the plugin root.
///
/// Every list is optional so an omitted list can be told apart from an empty one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallManifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mcp: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commands: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agents: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hooks: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompts: Option<Vec<String>>,
}

/// The merged installation plan for one plugin.
///
/// Owned by the install call that loaded it and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginManifest {
    /// Descriptor name, or the requested plugin name when the descriptor has none
    pub name: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub version: Option<String>,
    /// MCP servers to install
    pub mcp: Vec<String>,
    pub skills: Vec<String>,
    pub commands: Vec<String>,
    pub agents: Vec<String>,
    pub hooks: Vec<String>,
    pub prompts: Vec<String>,
    /// Plugin directory; always contains a descriptor
    pub source_dir: PathBuf,
}

impl PluginManifest {
    /// Merge a descriptor with an optional install-manifest.
    #[must_use]
    pub fn from_parts(
        requested_name: &str,
        source_dir: PathBuf,
        descriptor: PluginDescriptor,
        install: Option<InstallManifest>,
    ) -> Self {
        let install = install.unwrap_or_default();
        let names = |entries: &[NamedEntry]| -> Vec<String> {
            entries.iter().map(|e| e.name.clone()).collect()
        };

        Self {
            name: descriptor.name.clone().unwrap_or_else(|| requested_name.to_string()),
            mcp: install
                .mcp
                .unwrap_or_else(|| descriptor.mcp_servers.iter().map(|s| s.name.clone()).collect()),
            skills: install.skills.unwrap_or_else(|| names(&descriptor.skills)),
            commands: install.commands.unwrap_or_else(|| names(&descriptor.commands)),
            agents: install.agents.unwrap_or_else(|| names(&descriptor.agents)),
            hooks: install.hooks.unwrap_or_else(|| names(&descriptor.hooks)),
            prompts: install.prompts.unwrap_or_default(),
            display_name: descriptor.display_name,
            description: descriptor.description,
            version: descriptor.version,
            source_dir,
        }
    }

    /// Check that the plugin name and every unit name is a plain path component.
    ///
    /// These names become directory and file names under the target, so a name read
    /// from `plugin.json` or `install.json` gets the same check as the requested one.
    pub fn validate(&self) -> Result<(), VibeError> {
        validate_name(&self.name)?;
        for name in [
            &self.mcp,
            &self.skills,
            &self.commands,
            &self.agents,
            &self.hooks,
            &self.prompts,
        ]
        .into_iter()
        .flatten()
        {
            validate_name(name)?;
        }
        Ok(())
    }

    /// `<source_dir>/.claude-plugin/plugin.json`
    #[must_use]
    pub fn descriptor_path(&self) -> PathBuf {
        descriptor_path(&self.source_dir)
    }

    /// Label for messages: the display name when there is one.
    #[must_use]
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }
}

/// Descriptor location inside a plugin directory.
#[must_use]
pub fn descriptor_path(plugin_dir: &Path) -> PathBuf {
    plugin_dir.join(CLAUDE_PLUGIN_DIR).join(DESCRIPTOR_FILE)
}

/// Install-manifest location inside a plugin directory.
#[must_use]
pub fn install_manifest_path(plugin_dir: &Path) -> PathBuf {
    plugin_dir.join(INSTALL_MANIFEST_FILE)
}

/// Load the plugin `name` from `plugins_root`.
///
/// # Errors
///
/// - [`VibeError::InvalidName`] when `name`, the descriptor name or any unit name is
///   not a plain path component
/// - [`VibeError::PluginNotFound`] when the descriptor does not exist
/// - [`VibeError::ManifestParseError`] when either file is not valid JSON
///
/// Loading never writes to the filesystem.
pub fn load_manifest(plugins_root: &Path, name: &str) -> Result<PluginManifest> {
    validate_name(name)?;

    let source_dir = plugins_root.join(name);
    let descriptor_file = descriptor_path(&source_dir);
    if !descriptor_file.is_file() {
        return Err(VibeError::PluginNotFound {
            name: name.to_string(),
            path: descriptor_file.display().to_string(),
        }
        .into());
    }

    let descriptor: PluginDescriptor = read_json_file(&descriptor_file)?;

    let install_file = install_manifest_path(&source_dir);
    let install = if install_file.is_file() {
        tracing::debug!("Using install-manifest {}", install_file.display());
        Some(read_json_file::<InstallManifest>(&install_file)?)
    } else {
        None
    };

    let manifest = PluginManifest::from_parts(name, source_dir, descriptor, install);
    manifest.validate()?;
    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write(path: &Path, content: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn test_install_manifest_overrides_descriptor() {
        let temp = tempdir().unwrap();
        let plugin = temp.path().join("demo");
        write(&descriptor_path(&plugin), r#"{"name":"demo","mcpServers":[]}"#);
        write(&install_manifest_path(&plugin), r#"{"mcp":["alpha"]}"#);

        let manifest = load_manifest(temp.path(), "demo").unwrap();
        assert_eq!(manifest.mcp, vec!["alpha"]);
        assert_eq!(manifest.source_dir, plugin);
    }

    #[test]
    fn test_lists_derived_from_descriptor() {
        let temp = tempdir().unwrap();
        let plugin = temp.path().join("demo");
        write(
            &descriptor_path(&plugin),
            r#"{
                "name": "demo",
                "displayName": "Demo Plugin",
                "commands": [{"name": "review", "description": "Review"}, "lint"],
                "agents": [{"name": "helper"}],
                "mcpServers": [{"name": "alpha", "command": "node", "args": ["./mcp/alpha/index.js"]}],
                "homepage": "https://example.com"
            }"#,
        );
        write(&install_manifest_path(&plugin), r#"{"skills":["fmt"]}"#);

        let manifest = load_manifest(temp.path(), "demo").unwrap();
        assert_eq!(manifest.mcp, vec!["alpha"]);
        assert_eq!(manifest.commands, vec!["review", "lint"]);
        assert_eq!(manifest.agents, vec!["helper"]);
        assert_eq!(manifest.skills, vec!["fmt"]);
        assert!(manifest.hooks.is_empty());
        assert_eq!(manifest.label(), "Demo Plugin");
    }

    #[test]
    fn test_empty_install_list_wins_over_descriptor() {
        let temp = tempdir().unwrap();
        let plugin = temp.path().join("demo");
        write(&descriptor_path(&plugin), r#"{"mcpServers":[{"name":"alpha"}]}"#);
        write(&install_manifest_path(&plugin), r#"{"mcp":[]}"#);

        let manifest = load_manifest(temp.path(), "demo").unwrap();
        assert!(manifest.mcp.is_empty());
        // Falls back to the requested name
        assert_eq!(manifest.name, "demo");
    }

    #[test]
    fn test_missing_descriptor_is_not_found() {
        let temp = tempdir().unwrap();
        std::fs::create_dir_all(temp.path().join("ghost")).unwrap();

        let err = load_manifest(temp.path(), "ghost").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<VibeError>(),
            Some(VibeError::PluginNotFound { name, .. }) if name == "ghost"
        ));
        // Nothing was created
        assert_eq!(std::fs::read_dir(temp.path().join("ghost")).unwrap().count(), 0);
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let temp = tempdir().unwrap();
        let plugin = temp.path().join("broken");
        write(&descriptor_path(&plugin), "{ not json");

        let err = load_manifest(temp.path(), "broken").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<VibeError>(),
            Some(VibeError::ManifestParseError { .. })
        ));
    }

    #[test]
    fn test_traversal_name_rejected() {
        let temp = tempdir().unwrap();
        let err = load_manifest(temp.path(), "../etc").unwrap_err();
        assert!(matches!(err.downcast_ref::<VibeError>(), Some(VibeError::InvalidName { .. })));
    }

    #[test]
    fn test_descriptor_name_traversal_rejected() {
        let temp = tempdir().unwrap();
        let plugin = temp.path().join("demo");
        write(&descriptor_path(&plugin), r#"{"name":"../../precious","mcpServers":[]}"#);

        let err = load_manifest(temp.path(), "demo").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<VibeError>(),
            Some(VibeError::InvalidName { name }) if name == "../../precious"
        ));
    }

    #[test]
    fn test_install_entry_traversal_rejected() {
        let temp = tempdir().unwrap();
        let plugin = temp.path().join("demo");
        write(&descriptor_path(&plugin), r#"{"name":"demo"}"#);
        write(&install_manifest_path(&plugin), r#"{"skills":["../x"]}"#);

        let err = load_manifest(temp.path(), "demo").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<VibeError>(),
            Some(VibeError::InvalidName { name }) if name == "../x"
        ));
    }

    #[test]
    fn test_descriptor_server_traversal_rejected() {
        let temp = tempdir().unwrap();
        let plugin = temp.path().join("demo");
        write(&descriptor_path(&plugin), r#"{"mcpServers":[{"name":"a/../../b"}]}"#);

        let err = load_manifest(temp.path(), "demo").unwrap_err();
        assert!(matches!(err.downcast_ref::<VibeError>(), Some(VibeError::InvalidName { .. })));
    }

    #[test]
    fn test_null_lists_read_as_empty() {
        let temp = tempdir().unwrap();
        let plugin = temp.path().join("demo");
        write(
            &descriptor_path(&plugin),
            r#"{"name":"demo","mcpServers":null,"skills":null}"#,
        );

        let manifest = load_manifest(temp.path(), "demo").unwrap();
        assert!(manifest.mcp.is_empty());
        assert!(manifest.skills.is_empty());
    }
}
