//! Capability generator.
//!
//! Scaffolds a new capability (prompt, skill, MCP server, slash command, agent or
//! hook) inside a category plugin under the plugins root, then records it in the
//! plugin's descriptor and install manifest so the installers pick it up:
//!
//! ```text
//! plugins/<category>/
//! ├── .claude-plugin/plugin.json   mcpServers / commands / agents / hooks entries
//! ├── install.json                 mcp / skills / commands / agents / hooks / prompts
//! ├── prompts/<name>.md
//! ├── skills/<name>/SKILL.md
//! ├── mcp/<name>/index.js
//! ├── commands/<name>.md
//! ├── agents/<name>.md
//! └── hooks/<name>.js
//! ```
//!
//! Registry updates never duplicate an entry, so generating the same capability twice
//! rewrites the artifact and leaves both registries as they were. Dry runs render and
//! plan everything in memory without touching the disk.

pub mod templates;

use anyhow::Result;
use serde::Deserialize;
use serde_json::{Value, json};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::constants::{
    DEFAULT_PLUGIN_AUTHOR, DEFAULT_PLUGIN_VERSION, MCP_ENTRY_FILE, MCP_LAUNCH_COMMAND,
};
use crate::core::VibeError;
use crate::manifest::{descriptor_path, install_manifest_path};
use crate::registry::{MergePolicy, RegistryFile};
use crate::utils::{read_json_file, safe_write, validate_name};
use templates::Templates;

/// The kinds of capability the generator can scaffold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CapabilityType {
    Prompt,
    Skill,
    Mcp,
    SlashCommand,
    Agent,
    Hook,
}

impl CapabilityType {
    pub const ALL: [Self; 6] =
        [Self::Prompt, Self::Skill, Self::Mcp, Self::SlashCommand, Self::Agent, Self::Hook];

    /// The name used on the command line and in batch files.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Prompt => "prompt",
            Self::Skill => "skill",
            Self::Mcp => "mcp",
            Self::SlashCommand => "slash-command",
            Self::Agent => "agent",
            Self::Hook => "hook",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Prompt => "Prompt",
            Self::Skill => "Skill",
            Self::Mcp => "MCP",
            Self::SlashCommand => "Slash Command",
            Self::Agent => "Agent",
            Self::Hook => "Hook",
        }
    }

    #[must_use]
    pub const fn template_name(self) -> &'static str {
        match self {
            Self::Prompt => "prompt.md",
            Self::Skill => "skill.md",
            Self::Mcp => "mcp.js",
            Self::SlashCommand => "command.md",
            Self::Agent => "agent.md",
            Self::Hook => "hook.js",
        }
    }

    /// The install manifest list this kind is recorded in.
    #[must_use]
    pub const fn install_key(self) -> &'static str {
        match self {
            Self::Prompt => "prompts",
            Self::Skill => "skills",
            Self::Mcp => "mcp",
            Self::SlashCommand => "commands",
            Self::Agent => "agents",
            Self::Hook => "hooks",
        }
    }

    /// The descriptor list this kind is registered in, if any.
    #[must_use]
    pub const fn descriptor_section(self) -> Option<&'static str> {
        match self {
            Self::Prompt | Self::Skill => None,
            Self::Mcp => Some("mcpServers"),
            Self::SlashCommand => Some("commands"),
            Self::Agent => Some("agents"),
            Self::Hook => Some("hooks"),
        }
    }

    /// Where the artifact for `name` lives inside `plugin_dir`.
    #[must_use]
    pub fn artifact_path(self, plugin_dir: &Path, name: &str) -> PathBuf {
        match self {
            Self::Prompt => plugin_dir.join("prompts").join(format!("{name}.md")),
            Self::Skill => plugin_dir.join("skills").join(name).join("SKILL.md"),
            Self::Mcp => plugin_dir.join("mcp").join(name).join(MCP_ENTRY_FILE),
            Self::SlashCommand => plugin_dir.join("commands").join(format!("{name}.md")),
            Self::Agent => plugin_dir.join("agents").join(format!("{name}.md")),
            Self::Hook => plugin_dir.join("hooks").join(format!("{name}.js")),
        }
    }

    fn descriptor_entry(self, request: &GenerationRequest) -> Value {
        match self {
            Self::Mcp => json!({
                "name": request.name,
                "description": request.description,
                "command": MCP_LAUNCH_COMMAND,
                "args": [format!("./mcp/{}/{MCP_ENTRY_FILE}", request.name)],
            }),
            _ => json!({
                "name": request.name,
                "description": request.description,
            }),
        }
    }
}

impl fmt::Display for CapabilityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for CapabilityType {
    type Err = VibeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "prompt" => Ok(Self::Prompt),
            "skill" => Ok(Self::Skill),
            "mcp" => Ok(Self::Mcp),
            "slash-command" | "command" => Ok(Self::SlashCommand),
            "agent" => Ok(Self::Agent),
            "hook" => Ok(Self::Hook),
            _ => Err(VibeError::UnknownCapabilityType {
                name: s.to_string(),
            }),
        }
    }
}

/// A known plugin category: the directory slug and its display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    pub slug: &'static str,
    pub label: &'static str,
}

pub const CATEGORIES: [Category; 5] = [
    Category {
        slug: "cross-platform",
        label: "一码多端",
    },
    Category {
        slug: "ux-optimization",
        label: "体验优化",
    },
    Category {
        slug: "productivity",
        label: "效率提升",
    },
    Category {
        slug: "stability",
        label: "稳定性",
    },
    Category {
        slug: "no-code",
        label: "无码类",
    },
];

impl Category {
    /// Map a category slug or label to its directory slug.
    ///
    /// Unknown categories are used verbatim and must be valid names.
    pub fn resolve(input: &str) -> Result<String, VibeError> {
        let input = input.trim();
        if let Some(known) = CATEGORIES.iter().find(|c| c.slug == input || c.label == input) {
            return Ok(known.slug.to_string());
        }
        validate_name(input)?;
        Ok(input.to_string())
    }
}

/// Everything needed to scaffold one capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Capability name, used for file names and registry entries
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub kind: CapabilityType,
    /// Category slug or label
    pub category: String,
    pub author: Option<String>,
    pub team: Option<String>,
}

impl GenerationRequest {
    fn validate(&self) -> Result<(), VibeError> {
        validate_name(&self.name)?;
        if self.display_name.trim().is_empty() {
            return Err(VibeError::InvalidGenerationRequest {
                field: "displayName".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// What a generation wrote, or would write under dry-run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOutcome {
    pub plugin_dir: PathBuf,
    pub files: Vec<PathBuf>,
    pub descriptor_changed: bool,
    pub install_manifest_changed: bool,
}

/// One entry of a batch file, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItem {
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub category: Option<String>,
    pub author: Option<String>,
    pub team: Option<String>,
}

fn required(value: Option<String>, field: &str) -> Result<String, VibeError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(VibeError::InvalidGenerationRequest {
            field: field.to_string(),
            reason: "is required".to_string(),
        }),
    }
}

impl BatchItem {
    /// Validate required fields. The description defaults to the display name.
    pub fn into_request(self) -> Result<GenerationRequest, VibeError> {
        let name = required(self.name, "name")?;
        let display_name = required(self.display_name, "displayName")?;
        let kind = required(self.kind, "type")?.parse()?;
        let category = required(self.category, "category")?;
        let description = self
            .description
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| display_name.clone());

        Ok(GenerationRequest {
            name,
            display_name,
            description,
            kind,
            category,
            author: self.author,
            team: self.team,
        })
    }

    fn label(&self, index: usize) -> String {
        self.display_name
            .clone()
            .or_else(|| self.name.clone())
            .unwrap_or_else(|| format!("item #{}", index + 1))
    }
}

/// The result of one batch item. Failures carry the rendered error message.
#[derive(Debug)]
pub struct BatchItemResult {
    pub index: usize,
    pub label: String,
    pub outcome: Result<GenerationOutcome, String>,
}

/// Scaffolds capabilities under one plugins root.
pub struct Generator {
    plugins_root: PathBuf,
    templates: Templates,
}

impl Generator {
    pub fn new(plugins_root: &Path) -> Result<Self> {
        Ok(Self {
            plugins_root: plugins_root.to_path_buf(),
            templates: Templates::new()?,
        })
    }

    /// Generate one capability and update the plugin's registries.
    pub fn generate(
        &self,
        request: &GenerationRequest,
        dry_run: bool,
    ) -> Result<GenerationOutcome> {
        request.validate()?;
        let slug = Category::resolve(&request.category)?;
        let plugin_dir = self.plugins_root.join(&slug);

        tracing::info!(
            "Generating {} \"{}\" in category \"{}\"",
            request.kind,
            request.display_name,
            request.category
        );
        tracing::info!("Target directory: {}", plugin_dir.display());

        let artifact = request.kind.artifact_path(&plugin_dir, &request.name);
        let content = self.templates.render(request)?;

        let mut descriptor = RegistryFile::load_or(
            &descriptor_path(&plugin_dir),
            fresh_descriptor(&slug, &request.category),
        )?;
        if let Some(section) = request.kind.descriptor_section() {
            descriptor.upsert(
                section,
                MergePolicy::APPEND_BY_NAME,
                &request.name,
                request.kind.descriptor_entry(request),
            )?;
        }

        let mut install =
            RegistryFile::load_or(&install_manifest_path(&plugin_dir), fresh_install_manifest())?;
        for kind in CapabilityType::ALL {
            install.set_default(kind.install_key(), json!([]));
        }
        install.upsert(
            request.kind.install_key(),
            MergePolicy::NameSet,
            &request.name,
            Value::Null,
        )?;

        let outcome = GenerationOutcome {
            plugin_dir,
            files: vec![artifact.clone()],
            descriptor_changed: descriptor.needs_save(),
            install_manifest_changed: install.needs_save(),
        };

        if dry_run {
            tracing::info!("[dry-run] Would write {}", artifact.display());
            if outcome.descriptor_changed {
                tracing::info!("[dry-run] Would update {}", descriptor.path().display());
            }
            if outcome.install_manifest_changed {
                tracing::info!("[dry-run] Would update {}", install.path().display());
            }
            return Ok(outcome);
        }

        if artifact.exists() {
            tracing::debug!("Overwriting {}", artifact.display());
        }
        safe_write(&artifact, &content)?;
        tracing::info!("  → {}", artifact.display());

        if outcome.descriptor_changed {
            descriptor.save()?;
        }
        if outcome.install_manifest_changed {
            install.save()?;
        }

        Ok(outcome)
    }

    /// Generate every item independently. One item failing does not stop the rest.
    pub fn generate_batch(&self, items: Vec<Value>, dry_run: bool) -> Vec<BatchItemResult> {
        items
            .into_iter()
            .enumerate()
            .map(|(index, raw)| {
                let item = serde_json::from_value::<BatchItem>(raw).map_err(|e| {
                    VibeError::InvalidGenerationRequest {
                        field: "item".to_string(),
                        reason: e.to_string(),
                    }
                });
                let label = item
                    .as_ref()
                    .map_or_else(|_| format!("item #{}", index + 1), |item| item.label(index));

                let outcome = item
                    .and_then(BatchItem::into_request)
                    .map_err(anyhow::Error::from)
                    .and_then(|request| self.generate(&request, dry_run))
                    .map_err(|e| format!("{e:#}"));

                if let Err(reason) = &outcome {
                    tracing::warn!("Failed to generate {label}: {reason}");
                }

                BatchItemResult {
                    index,
                    label,
                    outcome,
                }
            })
            .collect()
    }
}

/// Generate one capability under `plugins_root`.
pub fn generate_capability(
    plugins_root: &Path,
    request: &GenerationRequest,
    dry_run: bool,
) -> Result<GenerationOutcome> {
    Generator::new(plugins_root)?.generate(request, dry_run)
}

/// Generate every item of a batch under `plugins_root`.
pub fn generate_batch(
    plugins_root: &Path,
    items: Vec<Value>,
    dry_run: bool,
) -> Result<Vec<BatchItemResult>> {
    Ok(Generator::new(plugins_root)?.generate_batch(items, dry_run))
}

/// Read a batch file, which must hold a JSON array.
pub fn load_batch_file(path: &Path) -> Result<Vec<Value>> {
    match read_json_file::<Value>(path)? {
        Value::Array(items) => Ok(items),
        _ => Err(VibeError::BatchFormatError {
            file: path.display().to_string(),
            reason: "expected a JSON array of items".to_string(),
        }
        .into()),
    }
}

fn fresh_descriptor(slug: &str, category: &str) -> Value {
    json!({
        "name": slug,
        "displayName": format!("{category} plugin"),
        "description": format!("Tools for {category}"),
        "version": DEFAULT_PLUGIN_VERSION,
        "author": DEFAULT_PLUGIN_AUTHOR,
        "commands": [],
        "agents": [],
        "mcpServers": [],
        "hooks": [],
    })
}

fn fresh_install_manifest() -> Value {
    json!({
        "mcp": [],
        "skills": [],
        "commands": [],
        "agents": [],
        "hooks": [],
        "prompts": [],
    })
}
