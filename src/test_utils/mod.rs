//! Test utilities for vibe-plugins
//!
//! Available to unit tests and, through the `test-utils` feature, to the integration
//! tests:
//!
//! - [`init_test_logging`] - one-time tracing setup for tests
//! - [`PluginFixture`] - writes plugin directories under a temporary plugins root
//! - [`snapshot_dir`] - captures a directory tree so "nothing was written" can be
//!   asserted by comparing two snapshots
//!
//! # Example
//!
//! ```rust,no_run
//! use vibe_plugins::test_utils::{PluginFixture, snapshot_dir};
//!
//! # fn example() -> anyhow::Result<()> {
//! let temp = tempfile::tempdir()?;
//! PluginFixture::new("demo").with_mcp("alpha").write(&temp.path().join("plugins"))?;
//!
//! let before = snapshot_dir(temp.path())?;
//! // ... run a dry-run install ...
//! assert_eq!(before, snapshot_dir(temp.path())?);
//! # Ok(())
//! # }
//! ```

pub mod fixtures;

pub use fixtures::PluginFixture;

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Uses `level` when given, otherwise `RUST_LOG`; with neither, logging stays off.
///
/// ```bash
/// RUST_LOG=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_ansi(true)
            .try_init();
    });
}

/// Every entry below `root`, keyed by relative path.
///
/// Directories map to `None`, files to their contents. A missing `root` yields an
/// empty snapshot.
pub fn snapshot_dir(root: &Path) -> Result<BTreeMap<PathBuf, Option<Vec<u8>>>> {
    let mut snapshot = BTreeMap::new();
    if !root.exists() {
        return Ok(snapshot);
    }

    for entry in WalkDir::new(root).min_depth(1) {
        let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
        let relative = entry.path().strip_prefix(root)?.to_path_buf();
        let content = if entry.file_type().is_file() {
            Some(
                std::fs::read(entry.path())
                    .with_context(|| format!("Failed to read {}", entry.path().display()))?,
            )
        } else {
            None
        };
        snapshot.insert(relative, content);
    }
    Ok(snapshot)
}
