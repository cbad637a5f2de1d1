//! Preset tool operations behind the `vp` binary.
//!
//! A preset is a directory of AI IDE configuration sources:
//!
//! ```text
//! presets/<preset>/
//! ├── rules/  commands/  subagents/  skills/
//! ├── .aiignore
//! └── mcp.json          {"mcpServers": {...}}
//! ```
//!
//! [`install_preset`] drops those sources into a project's `.rulesync/` directory,
//! after which [`generate_ide_config`] lets rulesync render per-IDE configuration.
//! [`tag_entry_file`] asks the external agent to describe a tool from its entry file.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};

use crate::agent::command::ToolCommand;
use crate::agent::{AgentExecutor, AgentRequest};
use crate::constants::RULESYNC_DIR;
use crate::core::VibeError;
use crate::registry::{MergePolicy, RegistryFile, UpsertOutcome};
use crate::utils::{copy_path, path_exists, read_json_file, validate_name};

/// Subdirectories copied from a preset into `.rulesync/`.
pub const PRESET_SUBDIRS: [&str; 4] = ["rules", "commands", "subagents", "skills"];

const AIIGNORE_FILE: &str = ".aiignore";
const MCP_FILE: &str = "mcp.json";

/// IDE targets rulesync understands, shown after a preset install.
pub const IDE_TARGETS: [&str; 6] = ["cursor", "claudecode", "copilot", "windsurf", "cline", "roo"];

/// A preset shipped with the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresetInfo {
    pub name: &'static str,
    pub description: &'static str,
}

const PRESETS: [PresetInfo; 3] = [
    PresetInfo {
        name: "cross-platform",
        description: "Cross-platform development setup (MCP servers, rules, commands)",
    },
    PresetInfo {
        name: "productivity",
        description: "Productivity tooling",
    },
    PresetInfo {
        name: "vibe-tools",
        description: "vibe-presets toolchain (tagging, analysis)",
    },
];

/// The known presets.
#[must_use]
pub const fn list_presets() -> &'static [PresetInfo] {
    &PRESETS
}

/// What [`install_preset`] copied and merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetInstallReport {
    pub preset: String,
    /// The `.rulesync/` directory under the target
    pub rulesync_dir: PathBuf,
    pub dry_run: bool,
    /// Copied entries relative to the preset (`rules/`, `.aiignore`, ...)
    pub copied: Vec<String>,
    /// MCP servers merged into `.rulesync/mcp.json`
    pub mcp_servers: Vec<(String, UpsertOutcome)>,
}

/// Presets present under `presets_root`, sorted; the built-in names when it is empty.
fn available_presets(presets_root: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(presets_root)
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .filter(|entry| entry.path().is_dir())
                .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();
    if names.is_empty() {
        names = PRESETS.iter().map(|p| p.name.to_string()).collect();
    }
    names.sort();
    names
}

/// Install `preset` from `presets_root` into `<target_dir>/.rulesync/`.
///
/// Subdirectories and `.aiignore` overwrite what is already there. The preset's
/// `mcpServers` are merged by name into the existing `mcp.json`, keeping servers the
/// preset does not mention.
pub fn install_preset(
    presets_root: &Path,
    preset: &str,
    target_dir: &Path,
    dry_run: bool,
) -> Result<PresetInstallReport> {
    let preset_dir = presets_root.join(preset);
    if validate_name(preset).is_err() || !preset_dir.is_dir() {
        return Err(VibeError::PresetNotFound {
            name: preset.to_string(),
            available: available_presets(presets_root),
        }
        .into());
    }

    let rulesync_dir = target_dir.join(RULESYNC_DIR);
    let mut report = PresetInstallReport {
        preset: preset.to_string(),
        rulesync_dir: rulesync_dir.clone(),
        dry_run,
        copied: Vec::new(),
        mcp_servers: Vec::new(),
    };
    let prefix = if dry_run { "[dry-run] Would copy" } else { "Copied" };

    for subdir in PRESET_SUBDIRS {
        let src = preset_dir.join(subdir);
        if !src.is_dir() {
            continue;
        }
        if !dry_run {
            copy_path(&src, &rulesync_dir.join(subdir))?;
        }
        tracing::info!("{prefix} {subdir}/");
        report.copied.push(format!("{subdir}/"));
    }

    let aiignore = preset_dir.join(AIIGNORE_FILE);
    if aiignore.is_file() {
        if !dry_run {
            copy_path(&aiignore, &rulesync_dir.join(AIIGNORE_FILE))?;
        }
        tracing::info!("{prefix} {AIIGNORE_FILE}");
        report.copied.push(AIIGNORE_FILE.to_string());
    }

    let mcp_src = preset_dir.join(MCP_FILE);
    if mcp_src.is_file() {
        report.mcp_servers = merge_mcp_servers(&mcp_src, &rulesync_dir.join(MCP_FILE), dry_run)?;
    }

    Ok(report)
}

fn merge_mcp_servers(
    source: &Path,
    destination: &Path,
    dry_run: bool,
) -> Result<Vec<(String, UpsertOutcome)>> {
    let preset_mcp: Value = read_json_file(source)?;
    let servers = match preset_mcp.get("mcpServers") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Object(servers)) => servers.clone(),
        Some(_) => {
            return Err(VibeError::ManifestParseError {
                file: source.display().to_string(),
                reason: "mcpServers must be an object".to_string(),
            }
            .into());
        }
    };

    let mut registry = RegistryFile::load_or(destination, json!({"mcpServers": {}}))?;
    let mut merged = Vec::with_capacity(servers.len());
    for (name, server) in servers {
        let outcome = registry.upsert("mcpServers", MergePolicy::ReplaceByKey, &name, server)?;
        merged.push((name, outcome));
    }

    if dry_run {
        tracing::info!("[dry-run] Would merge {MCP_FILE} ({} servers)", merged.len());
    } else {
        if registry.needs_save() {
            registry.save()?;
        }
        tracing::info!("Merged {MCP_FILE}");
    }
    Ok(merged)
}

/// Run `<command> rulesync generate --targets <target> --features *` in `cwd`.
///
/// Output goes straight to the terminal.
pub async fn generate_ide_config(command: &str, target: &str, cwd: &Path) -> Result<()> {
    tracing::info!("Generating {target} configuration...");
    let output = ToolCommand::new(command)
        .args(["rulesync", "generate", "--targets", target, "--features", "*"])
        .current_dir(cwd)
        .inherit_stdio()
        .with_context("rulesync")
        .execute()
        .await?;

    if output.success() {
        Ok(())
    } else {
        Err(VibeError::ExternalToolFailed {
            tool: format!("{command} rulesync"),
            code: output.code,
        }
        .into())
    }
}

/// Tags describing a tool, as answered by the agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolTags {
    pub name: String,
    pub description: String,
    /// Kind tags such as `cli`, `library` or `api`
    #[serde(default)]
    pub kinds: Vec<String>,
    /// Technology stack tags
    #[serde(default)]
    pub stack: Vec<String>,
}

/// The agent's answer: parsed tags, or its text when that is not the expected JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagAnswer {
    Tags(ToolTags),
    Raw(String),
}

const TAG_SYSTEM_APPEND: &str =
    "You are tagging a developer tool. Read files only; do not modify anything.";

fn tag_prompt(entry: &Path) -> String {
    format!(
        "Analyse the tool whose entry file is {}.\n\
         Read the entry file and the modules it imports, then answer with only a JSON object:\n\
         {{\"name\": \"<tool name>\", \"description\": \"<one sentence>\", \
         \"kinds\": [\"cli\" | \"library\" | \"api\" | \"mcp-server\" | ...], \
         \"stack\": [\"<language or framework>\", ...]}}",
        entry.display()
    )
}

/// Parse the first JSON object found in `answer`, tolerating Markdown fences.
fn parse_tags(answer: &str) -> Option<ToolTags> {
    let start = answer.find('{')?;
    let end = answer.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str(&answer[start..=end]).ok()
}

/// Ask `executor` to describe the tool whose entry point is `entry`.
pub async fn tag_entry_file(
    entry: &Path,
    executor: &dyn AgentExecutor,
    max_turns: u32,
) -> Result<TagAnswer> {
    if !path_exists(entry) || !entry.is_file() {
        return Err(VibeError::SourceNotFound {
            path: entry.display().to_string(),
        }
        .into());
    }

    tracing::info!("Analysing tool: {}", entry.display());
    let cwd = entry.parent().map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    let run = executor
        .run(AgentRequest {
            prompt: tag_prompt(entry),
            cwd,
            max_turns,
            additional_dirs: Vec::new(),
            system_append: Some(TAG_SYSTEM_APPEND.to_string()),
        })
        .await?;

    let answer = run.answer().map(str::trim).filter(|a| !a.is_empty()).ok_or_else(|| {
        VibeError::DelegatedExecutionFailed {
            reason: "agent returned no answer".to_string(),
        }
    })?;

    Ok(match parse_tags(answer) {
        Some(tags) => TagAnswer::Tags(tags),
        None => {
            tracing::debug!("Agent answer is not a tag object");
            TagAnswer::Raw(answer.to_string())
        }
    })
}
