//! Common test utilities for vibe-plugins integration tests
//!
//! Every test gets its own temporary tree:
//!
//! ```text
//! <tmp>/
//! ├── project/   working directory of the binaries
//! ├── plugins/   VIBE_PLUGINS_ROOT
//! ├── presets/   VIBE_PRESETS_ROOT
//! └── home/      HOME (Cursor settings, config file)
//! ```

// Not every helper is used by every test module
#![allow(dead_code)]

use anyhow::Result;
use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temporary project, plugins root, presets root and home directory.
pub struct TestProject {
    _temp_dir: TempDir, // Keep alive for RAII cleanup
    root: PathBuf,
}

impl TestProject {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path().to_path_buf();
        for dir in ["project", "plugins", "presets", "home"] {
            fs::create_dir_all(root.join(dir))?;
        }
        Ok(Self {
            _temp_dir: temp_dir,
            root,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn project_path(&self) -> PathBuf {
        self.root.join("project")
    }

    pub fn plugins_path(&self) -> PathBuf {
        self.root.join("plugins")
    }

    pub fn presets_path(&self) -> PathBuf {
        self.root.join("presets")
    }

    pub fn home_path(&self) -> PathBuf {
        self.root.join("home")
    }

    /// `vibe-plugins`, isolated from the real home directory and configuration.
    pub fn vibe_plugins(&self) -> Command {
        self.command("vibe-plugins")
    }

    /// `vp`, isolated the same way.
    pub fn vp(&self) -> Command {
        self.command("vp")
    }

    fn command(&self, bin: &str) -> Command {
        let mut cmd = Command::cargo_bin(bin).unwrap();
        cmd.current_dir(self.project_path())
            .env("HOME", self.home_path())
            .env("USERPROFILE", self.home_path())
            .env("VIBE_PLUGINS_ROOT", self.plugins_path())
            .env("VIBE_PRESETS_ROOT", self.presets_path())
            .env("VIBE_PLUGINS_CONFIG", self.home_path().join("config.toml"))
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG")
            .env_remove("VIBE_PLUGINS_DEBUG");
        cmd
    }

    /// Write a file relative to the temporary root.
    pub fn write(&self, relative: &str, content: &str) -> Result<PathBuf> {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;
        Ok(path)
    }

    /// Parse a JSON file relative to the temporary root.
    pub fn read_json(&self, relative: &str) -> Value {
        let path = self.root.join(relative);
        let content = fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("Failed to read {}: {e}", path.display()));
        serde_json::from_str(&content)
            .unwrap_or_else(|e| panic!("Failed to parse {}: {e}", path.display()))
    }
}

/// File assertion helpers
pub struct FileAssert;

impl FileAssert {
    pub fn exists(path: impl AsRef<Path>) {
        let path = path.as_ref();
        assert!(path.exists(), "Expected file to exist: {}", path.display());
    }

    pub fn not_exists(path: impl AsRef<Path>) {
        let path = path.as_ref();
        assert!(!path.exists(), "Expected file to not exist: {}", path.display());
    }

    pub fn contains(path: impl AsRef<Path>, expected: &str) {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .unwrap_or_else(|e| panic!("Failed to read {}: {e}", path.display()));
        assert!(
            content.contains(expected),
            "Expected {} to contain '{expected}'\nActual content:\n{content}",
            path.display()
        );
    }
}
