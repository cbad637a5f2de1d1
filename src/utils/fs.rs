//! File system helpers used by the installers, the generator and the preset tool.
//!
//! Everything here is synchronous: the tool runs one operation per process and the
//! amount of data copied is small. Writes go through [`atomic_write`] so a crashed
//! process never leaves a half-written JSON registry behind, although a crash in the
//! middle of a tree copy can still leave a partially populated target.
//!
//! # Examples
//!
//! ```rust,no_run
//! use vibe_plugins::utils::fs::{copy_path, ensure_dir, write_json_file};
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! ensure_dir(Path::new("out/.claude-plugin"))?;
//! copy_path(Path::new("plugins/demo"), Path::new("out/.claude-plugin/demo"))?;
//! write_json_file(Path::new("out/qoder.config.json"), &serde_json::json!({"mcp": []}))?;
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Returns `true` when something (file, directory or symlink target) exists at `path`.
#[must_use]
pub fn path_exists(path: &Path) -> bool {
    path.exists()
}

/// Ensures a directory exists, creating it and all parent directories if necessary.
///
/// # Errors
///
/// Fails when the path exists but is not a directory, or when creation fails.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
    } else if !path.is_dir() {
        return Err(anyhow::anyhow!("Path exists but is not a directory: {}", path.display()));
    }
    Ok(())
}

/// Ensures that the parent directory of a file path exists.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        ensure_dir(parent)?;
    }
    Ok(())
}

/// Atomically writes bytes to a file using a write-then-rename strategy.
///
/// The content is written to a sibling temporary file, synced, and renamed over the
/// destination. Parent directories are created as needed.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    use std::io::Write;

    ensure_parent_dir(path)?;

    let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let mut temp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temp file in: {}", dir.display()))?;

    temp.write_all(content)
        .with_context(|| format!("Failed to write temp file for: {}", path.display()))?;
    temp.as_file().sync_all().context("Failed to sync file to disk")?;

    temp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to rename temp file to: {}", path.display()))?;

    Ok(())
}

/// Writes a string to a file atomically.
pub fn safe_write(path: &Path, content: &str) -> Result<()> {
    atomic_write(path, content.as_bytes())
}

/// Reads a UTF-8 text file.
pub fn read_text_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path.display()))
}

/// Reads and parses a JSON file.
///
/// Malformed JSON is reported with the offending path; there is no recovery.
pub fn read_json_file<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let content = read_text_file(path)?;
    serde_json::from_str(&content).map_err(|e| {
        anyhow::Error::new(crate::core::VibeError::ManifestParseError {
            file: path.display().to_string(),
            reason: e.to_string(),
        })
    })
}

/// Serializes `data` as pretty JSON (two-space indent, trailing newline) and writes it
/// atomically.
pub fn write_json_file<T>(path: &Path, data: &T) -> Result<()>
where
    T: serde::Serialize,
{
    let mut json = serde_json::to_string_pretty(data)
        .with_context(|| format!("Failed to serialize JSON for: {}", path.display()))?;
    json.push('\n');
    safe_write(path, &json)
        .with_context(|| format!("Failed to write JSON file: {}", path.display()))
}

/// Removes a file or a directory tree. Missing paths are not an error.
pub fn remove_path(path: &Path) -> Result<()> {
    let Ok(metadata) = fs::symlink_metadata(path) else {
        return Ok(());
    };
    if metadata.is_dir() {
        fs::remove_dir_all(path)
            .with_context(|| format!("Failed to remove directory: {}", path.display()))
    } else {
        fs::remove_file(path).with_context(|| format!("Failed to remove file: {}", path.display()))
    }
}

/// Recursively copies a directory. Existing files in `dst` are overwritten; symlinks
/// and special files are skipped.
pub fn copy_dir(src: &Path, dst: &Path) -> Result<()> {
    ensure_dir(dst)?;

    for entry in
        fs::read_dir(src).with_context(|| format!("Failed to read directory: {}", src.display()))?
    {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if file_type.is_dir() {
            copy_dir(&src_path, &dst_path)?;
        } else if file_type.is_file() {
            fs::copy(&src_path, &dst_path).with_context(|| {
                format!("Failed to copy file from {} to {}", src_path.display(), dst_path.display())
            })?;
        }
    }

    Ok(())
}

/// Copies a file or a directory tree to `dst`, creating `dst`'s parent first.
pub fn copy_path(src: &Path, dst: &Path) -> Result<()> {
    if src.is_dir() {
        copy_dir(src, dst)
    } else {
        ensure_parent_dir(dst)?;
        fs::copy(src, dst).with_context(|| {
            format!("Failed to copy file from {} to {}", src.display(), dst.display())
        })?;
        Ok(())
    }
}

/// Lists every regular file below `path` (or `path` itself when it is a file), sorted.
pub fn list_files(path: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(path).follow_links(false) {
        let entry =
            entry.with_context(|| format!("Failed to walk directory: {}", path.display()))?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_ensure_dir_creates_nested() {
        let temp = tempdir().unwrap();
        let dir = temp.path().join("a/b/c");

        ensure_dir(&dir).unwrap();
        assert!(dir.is_dir());
        // Second call is a no-op
        ensure_dir(&dir).unwrap();
    }

    #[test]
    fn test_ensure_dir_on_file() {
        let temp = tempdir().unwrap();
        let file = temp.path().join("file.txt");
        fs::write(&file, "content").unwrap();

        let err = ensure_dir(&file).unwrap_err();
        assert!(err.to_string().contains("not a directory"));
    }

    #[test]
    fn test_write_json_file_is_pretty_with_newline() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("nested/config.json");

        write_json_file(&path, &serde_json::json!({"mcp": ["alpha"]})).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "{\n  \"mcp\": [\n    \"alpha\"\n  ]\n}\n");
    }

    #[test]
    fn test_read_json_file_reports_parse_error() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        let err = read_json_file::<serde_json::Value>(&path).unwrap_err();
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn test_copy_path_replaces_tree_contents() {
        let temp = tempdir().unwrap();
        let src = temp.path().join("src");
        fs::create_dir_all(src.join("mcp/alpha")).unwrap();
        fs::write(src.join("mcp/alpha/index.js"), "// alpha").unwrap();
        fs::write(src.join("README.md"), "# readme").unwrap();

        let dst = temp.path().join("dst");
        copy_path(&src, &dst).unwrap();

        assert_eq!(fs::read_to_string(dst.join("mcp/alpha/index.js")).unwrap(), "// alpha");
        assert_eq!(list_files(&dst).unwrap().len(), 2);
    }

    #[test]
    fn test_copy_path_single_file() {
        let temp = tempdir().unwrap();
        let src = temp.path().join("deploy.md");
        fs::write(&src, "# /deploy").unwrap();

        let dst = temp.path().join("commands/deploy.md");
        copy_path(&src, &dst).unwrap();

        assert_eq!(fs::read_to_string(dst).unwrap(), "# /deploy");
    }

    #[test]
    fn test_remove_path_missing_is_ok() {
        let temp = tempdir().unwrap();
        remove_path(&temp.path().join("nothing-here")).unwrap();
    }
}
