//! JSON registry files mutated by read-merge-write.
//!
//! Several files act as registries of installed units: a plugin descriptor's
//! `mcpServers` list, Cursor's global `settings.json`, qoder's `qoder.config.json`,
//! a plugin's `install.json` and rulesync's `mcp.json`. They differ only in how a new
//! entry is merged into a section, which [`MergePolicy`] captures:
//!
//! | Policy | Section shape | On name match | Used by |
//! |---|---|---|---|
//! | [`MergePolicy::AppendIfAbsent`] | array of objects | keep existing | descriptor `mcpServers`, generator lists |
//! | [`MergePolicy::UpsertFields`] | array of objects | merge fields | qoder `mcp` |
//! | [`MergePolicy::ReplaceByKey`] | object map | replace value | Cursor `mcpServers`, rulesync `mcp.json` |
//! | [`MergePolicy::NameSet`] | array of strings | keep existing | qoder skills/commands/agents, `install.json` |
//!
//! Entries are never duplicated and existing entries are never removed. Files are
//! written without locking; concurrent invocations against one file are unsupported.
//!
//! ```rust,no_run
//! use serde_json::json;
//! use std::path::Path;
//! use vibe_plugins::registry::{MergePolicy, RegistryFile};
//!
//! # fn example() -> anyhow::Result<()> {
//! let mut settings = RegistryFile::load_or(Path::new("settings.json"), json!({}))?;
//! settings.upsert(
//!     "mcpServers",
//!     MergePolicy::ReplaceByKey,
//!     "alpha",
//!     json!({"command": "node", "args": ["/abs/alpha/index.js"]}),
//! )?;
//! settings.save()?;
//! # Ok(())
//! # }
//! ```

use anyhow::Result;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::core::VibeError;
use crate::utils::{read_json_file, write_json_file};

/// How an entry is merged into a registry section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePolicy {
    /// Array of objects; an entry whose `key` field matches is left untouched.
    AppendIfAbsent {
        key: &'static str,
    },
    /// Array of objects; a matching entry gets the new fields merged over its own.
    UpsertFields {
        key: &'static str,
    },
    /// Object map; the value under the name is replaced wholesale.
    ReplaceByKey,
    /// Array of strings; the name is appended when absent.
    NameSet,
}

impl MergePolicy {
    /// Keyed by `"name"`, the common case.
    pub const APPEND_BY_NAME: Self = Self::AppendIfAbsent {
        key: "name",
    };
    /// Keyed by `"name"`, the common case.
    pub const UPSERT_BY_NAME: Self = Self::UpsertFields {
        key: "name",
    };

    /// The value a missing section is created with.
    #[must_use]
    pub fn empty_section(self) -> Value {
        match self {
            Self::ReplaceByKey => Value::Object(Map::new()),
            _ => Value::Array(Vec::new()),
        }
    }
}

/// What an upsert did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpsertOutcome {
    Added,
    Updated,
    Unchanged,
}

impl UpsertOutcome {
    /// `true` unless nothing changed.
    #[must_use]
    pub const fn changed(self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

impl fmt::Display for UpsertOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Added => "added",
            Self::Updated => "updated",
            Self::Unchanged => "unchanged",
        })
    }
}

/// Merge `entry` named `name` into `section` according to `policy`.
///
/// Returns a message describing the shape mismatch when `section` is not the shape
/// the policy works on.
pub fn upsert(
    section: &mut Value,
    policy: MergePolicy,
    name: &str,
    entry: Value,
) -> Result<UpsertOutcome, String> {
    match policy {
        MergePolicy::AppendIfAbsent {
            key,
        } => {
            let list = section.as_array_mut().ok_or("expected an array")?;
            if list.iter().any(|item| item.get(key).and_then(Value::as_str) == Some(name)) {
                return Ok(UpsertOutcome::Unchanged);
            }
            list.push(entry);
            Ok(UpsertOutcome::Added)
        }
        MergePolicy::UpsertFields {
            key,
        } => {
            let list = section.as_array_mut().ok_or("expected an array")?;
            let Some(index) =
                list.iter().position(|item| item.get(key).and_then(Value::as_str) == Some(name))
            else {
                list.push(entry);
                return Ok(UpsertOutcome::Added);
            };

            let (Some(fields), Value::Object(new_fields)) = (list[index].as_object_mut(), entry)
            else {
                return Err(format!("entry '{name}' is not an object"));
            };
            let mut outcome = UpsertOutcome::Unchanged;
            for (field, value) in new_fields {
                if fields.get(&field) != Some(&value) {
                    fields.insert(field, value);
                    outcome = UpsertOutcome::Updated;
                }
            }
            Ok(outcome)
        }
        MergePolicy::ReplaceByKey => {
            let map = section.as_object_mut().ok_or("expected an object")?;
            match map.get(name) {
                Some(current) if *current == entry => Ok(UpsertOutcome::Unchanged),
                Some(_) => {
                    map.insert(name.to_string(), entry);
                    Ok(UpsertOutcome::Updated)
                }
                None => {
                    map.insert(name.to_string(), entry);
                    Ok(UpsertOutcome::Added)
                }
            }
        }
        MergePolicy::NameSet => {
            let list = section.as_array_mut().ok_or("expected an array")?;
            if list.iter().any(|item| item.as_str() == Some(name)) {
                return Ok(UpsertOutcome::Unchanged);
            }
            list.push(Value::String(name.to_string()));
            Ok(UpsertOutcome::Added)
        }
    }
}

/// A JSON object file holding one or more registry sections.
#[derive(Debug, Clone)]
pub struct RegistryFile {
    path: PathBuf,
    root: Map<String, Value>,
    existed: bool,
    dirty: bool,
}

impl RegistryFile {
    /// Load `path`, or start from `default` when the file does not exist.
    pub fn load_or(path: &Path, default: Value) -> Result<Self> {
        if path.is_file() {
            return Self::load_required(path);
        }

        let root = match default {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Ok(Self {
            path: path.to_path_buf(),
            root,
            existed: false,
            dirty: false,
        })
    }

    /// Load `path`, which must exist and contain a JSON object.
    pub fn load_required(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(VibeError::SourceNotFound {
                path: path.display().to_string(),
            }
            .into());
        }

        match read_json_file::<Value>(path)? {
            Value::Object(root) => Ok(Self {
                path: path.to_path_buf(),
                root,
                existed: true,
                dirty: false,
            }),
            _ => Err(VibeError::ManifestParseError {
                file: path.display().to_string(),
                reason: "expected a JSON object at the top level".to_string(),
            }
            .into()),
        }
    }

    /// Merge one entry into `section`, creating the section when missing or `null`.
    pub fn upsert(
        &mut self,
        section: &str,
        policy: MergePolicy,
        name: &str,
        entry: Value,
    ) -> Result<UpsertOutcome> {
        let slot = self.root.entry(section.to_string()).or_insert(Value::Null);
        if slot.is_null() {
            *slot = policy.empty_section();
        }
        let outcome = upsert(slot, policy, name, entry).map_err(|reason| {
            VibeError::ManifestParseError {
                file: self.path.display().to_string(),
                reason: format!("section '{section}': {reason}"),
            }
        })?;

        if outcome.changed() {
            tracing::debug!("{} {section}.{name}: {outcome}", self.path.display());
            self.dirty = true;
        }
        Ok(outcome)
    }

    /// Names currently present in `section` (object keys, `"name"` fields or strings).
    #[must_use]
    pub fn names(&self, section: &str) -> Vec<String> {
        match self.root.get(section) {
            Some(Value::Object(map)) => map.keys().cloned().collect(),
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| {
                    item.as_str().or_else(|| item.get("name").and_then(Value::as_str))
                })
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Set a top-level field only when it is not present yet.
    pub fn set_default(&mut self, field: &str, value: Value) {
        if !self.root.contains_key(field) {
            self.root.insert(field.to_string(), value);
            self.dirty = true;
        }
    }

    /// Whether anything changed since loading, or the file does not exist yet.
    #[must_use]
    pub const fn needs_save(&self) -> bool {
        self.dirty || !self.existed
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.root.get(field)
    }

    /// Write the file as pretty JSON with a trailing newline, creating parents.
    pub fn save(&mut self) -> Result<()> {
        write_json_file(&self.path, &self.root)?;
        self.existed = true;
        self.dirty = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_append_if_absent_keeps_existing_entry() {
        let mut section = json!([{"name": "alpha", "command": "python"}]);
        let outcome = upsert(
            &mut section,
            MergePolicy::APPEND_BY_NAME,
            "alpha",
            json!({"name": "alpha", "command": "node"}),
        )
        .unwrap();

        assert_eq!(outcome, UpsertOutcome::Unchanged);
        assert_eq!(section, json!([{"name": "alpha", "command": "python"}]));

        let outcome =
            upsert(&mut section, MergePolicy::APPEND_BY_NAME, "beta", json!({"name": "beta"}))
                .unwrap();
        assert_eq!(outcome, UpsertOutcome::Added);
        assert_eq!(section.as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_upsert_fields_merges() {
        let mut section = json!([{"name": "alpha", "command": "node", "env": {"A": "1"}}]);
        let outcome = upsert(
            &mut section,
            MergePolicy::UPSERT_BY_NAME,
            "alpha",
            json!({"name": "alpha", "args": ["./mcp/p/alpha/index.js"]}),
        )
        .unwrap();

        assert_eq!(outcome, UpsertOutcome::Updated);
        assert_eq!(
            section,
            json!([{"name": "alpha", "command": "node", "env": {"A": "1"}, "args": ["./mcp/p/alpha/index.js"]}])
        );

        let again = upsert(
            &mut section,
            MergePolicy::UPSERT_BY_NAME,
            "alpha",
            json!({"name": "alpha", "args": ["./mcp/p/alpha/index.js"]}),
        )
        .unwrap();
        assert_eq!(again, UpsertOutcome::Unchanged);
    }

    #[test]
    fn test_replace_by_key() {
        let mut section = json!({"alpha": {"command": "python", "env": {}}});
        let outcome =
            upsert(&mut section, MergePolicy::ReplaceByKey, "alpha", json!({"command": "node"}))
                .unwrap();
        assert_eq!(outcome, UpsertOutcome::Updated);
        assert_eq!(section, json!({"alpha": {"command": "node"}}));

        let outcome =
            upsert(&mut section, MergePolicy::ReplaceByKey, "alpha", json!({"command": "node"}))
                .unwrap();
        assert_eq!(outcome, UpsertOutcome::Unchanged);
    }

    #[test]
    fn test_name_set_deduplicates() {
        let mut section = json!(["fmt"]);
        assert_eq!(
            upsert(&mut section, MergePolicy::NameSet, "fmt", Value::Null).unwrap(),
            UpsertOutcome::Unchanged
        );
        assert_eq!(
            upsert(&mut section, MergePolicy::NameSet, "lint", Value::Null).unwrap(),
            UpsertOutcome::Added
        );
        assert_eq!(section, json!(["fmt", "lint"]));
    }

    #[test]
    fn test_shape_mismatch_is_error() {
        let mut section = json!({"not": "a list"});
        assert!(upsert(&mut section, MergePolicy::NameSet, "x", Value::Null).is_err());
    }

    #[test]
    fn test_file_roundtrip_creates_missing_section() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("nested/qoder.config.json");

        let mut file = RegistryFile::load_or(&path, json!({})).unwrap();
        assert!(file.needs_save());
        file.upsert("skills", MergePolicy::NameSet, "fmt", Value::Null).unwrap();
        file.save().unwrap();

        let reloaded = RegistryFile::load_required(&path).unwrap();
        assert_eq!(reloaded.names("skills"), vec!["fmt"]);
        assert!(!reloaded.needs_save());
        assert!(std::fs::read_to_string(&path).unwrap().ends_with("}\n"));
    }

    #[test]
    fn test_wrong_section_type_names_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("settings.json");
        std::fs::write(&path, r#"{"mcpServers": []}"#).unwrap();

        let mut file = RegistryFile::load_required(&path).unwrap();
        let err = file
            .upsert("mcpServers", MergePolicy::ReplaceByKey, "alpha", json!({}))
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("settings.json"));
        assert!(message.contains("mcpServers"));
    }

    #[test]
    fn test_null_section_treated_as_empty() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("plugin.json");
        std::fs::write(&path, r#"{"name": "demo", "mcpServers": null}"#).unwrap();

        let mut file = RegistryFile::load_required(&path).unwrap();
        let outcome = file
            .upsert("mcpServers", MergePolicy::APPEND_BY_NAME, "alpha", json!({"name": "alpha"}))
            .unwrap();
        assert_eq!(outcome, UpsertOutcome::Added);
        assert_eq!(file.get("mcpServers"), Some(&json!([{"name": "alpha"}])));
    }

    #[test]
    fn test_load_required_missing() {
        let temp = tempdir().unwrap();
        let err = RegistryFile::load_required(&temp.path().join("nope.json")).unwrap_err();
        assert!(matches!(err.downcast_ref::<VibeError>(), Some(VibeError::SourceNotFound { .. })));
    }
}
