//! Environment detection.
//!
//! Decides which [`InstallTarget`] applies to a directory by probing for marker files,
//! in a fixed priority order where the first match wins:
//!
//! 1. a Claude marker under the target (`.claude`, `.claude-plugin`,
//!    `.vscode/extensions/claude.code`)
//! 2. `cursor.json` under the target
//! 3. `~/.cursor/settings.json`
//! 4. `qoder.config.json` under the target
//!
//! Workspace-local markers beat the global Cursor settings file, and Claude markers are
//! checked before anything else. Probing is read-only.
//!
//! The probe sits behind [`EnvironmentProbe`] so the dispatch logic can be tested with
//! a canned answer instead of real marker files.

use std::path::{Path, PathBuf};

use crate::constants::{
    CLAUDE_MARKERS, CURSOR_HOME_DIR, CURSOR_PROJECT_MARKER, CURSOR_SETTINGS_FILE,
    QODER_CONFIG_FILE,
};
use crate::core::{EnvSelection, InstallTarget};

/// Something that can tell which environment a directory belongs to.
pub trait EnvironmentProbe: Send + Sync {
    /// Probe `target_dir`; returns [`InstallTarget::Unknown`] when nothing matches.
    fn probe(&self, target_dir: &Path) -> InstallTarget;
}

/// Probes the real filesystem.
#[derive(Debug, Clone, Default)]
pub struct FsProbe {
    /// Home directory for the global Cursor check; `None` skips that step
    pub home_dir: Option<PathBuf>,
}

impl FsProbe {
    #[must_use]
    pub const fn new(home_dir: Option<PathBuf>) -> Self {
        Self {
            home_dir,
        }
    }
}

impl EnvironmentProbe for FsProbe {
    fn probe(&self, target_dir: &Path) -> InstallTarget {
        if let Some(marker) = CLAUDE_MARKERS.iter().find(|m| target_dir.join(m).exists()) {
            tracing::debug!("Found Claude marker {marker} in {}", target_dir.display());
            return InstallTarget::Claude;
        }

        if target_dir.join(CURSOR_PROJECT_MARKER).exists() {
            tracing::debug!("Found {CURSOR_PROJECT_MARKER} in {}", target_dir.display());
            return InstallTarget::Cursor;
        }

        if let Some(home) = &self.home_dir {
            let settings = home.join(CURSOR_HOME_DIR).join(CURSOR_SETTINGS_FILE);
            if settings.exists() {
                tracing::debug!("Found global Cursor settings at {}", settings.display());
                return InstallTarget::Cursor;
            }
        }

        if target_dir.join(QODER_CONFIG_FILE).exists() {
            tracing::debug!("Found {QODER_CONFIG_FILE} in {}", target_dir.display());
            return InstallTarget::Qoder;
        }

        InstallTarget::Unknown
    }
}

/// A probe that always answers the same target.
#[derive(Debug, Clone, Copy)]
pub struct FixedProbe(pub InstallTarget);

impl EnvironmentProbe for FixedProbe {
    fn probe(&self, _target_dir: &Path) -> InstallTarget {
        self.0
    }
}

/// Detect the environment of `target_dir` with the given probe.
pub fn detect_environment(probe: &dyn EnvironmentProbe, target_dir: &Path) -> InstallTarget {
    let target = probe.probe(target_dir);
    tracing::debug!("Detected environment {target} for {}", target_dir.display());
    target
}

/// Resolve the `--env` selection: a forced environment is returned without probing.
pub fn resolve_target(
    selection: EnvSelection,
    probe: &dyn EnvironmentProbe,
    target_dir: &Path,
) -> InstallTarget {
    selection.forced().unwrap_or_else(|| detect_environment(probe, target_dir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "{}").unwrap();
    }

    #[test]
    fn test_empty_dir_is_unknown() {
        let temp = tempdir().unwrap();
        let probe = FsProbe::new(None);
        assert_eq!(probe.probe(temp.path()), InstallTarget::Unknown);
    }

    #[test]
    fn test_each_claude_marker() {
        for marker in CLAUDE_MARKERS {
            let temp = tempdir().unwrap();
            std::fs::create_dir_all(temp.path().join(marker)).unwrap();
            assert_eq!(FsProbe::new(None).probe(temp.path()), InstallTarget::Claude, "{marker}");
        }
    }

    #[test]
    fn test_claude_wins_over_everything() {
        let temp = tempdir().unwrap();
        let home = tempdir().unwrap();
        std::fs::create_dir(temp.path().join(".claude")).unwrap();
        touch(&temp.path().join(CURSOR_PROJECT_MARKER));
        touch(&temp.path().join(QODER_CONFIG_FILE));
        touch(&home.path().join(CURSOR_HOME_DIR).join(CURSOR_SETTINGS_FILE));

        let probe = FsProbe::new(Some(home.path().to_path_buf()));
        assert_eq!(probe.probe(temp.path()), InstallTarget::Claude);
    }

    #[test]
    fn test_global_cursor_beats_qoder() {
        let temp = tempdir().unwrap();
        let home = tempdir().unwrap();
        touch(&temp.path().join(QODER_CONFIG_FILE));

        let probe = FsProbe::new(Some(home.path().to_path_buf()));
        assert_eq!(probe.probe(temp.path()), InstallTarget::Qoder);

        touch(&home.path().join(CURSOR_HOME_DIR).join(CURSOR_SETTINGS_FILE));
        assert_eq!(probe.probe(temp.path()), InstallTarget::Cursor);
    }

    #[test]
    fn test_project_cursor_marker() {
        let temp = tempdir().unwrap();
        touch(&temp.path().join(CURSOR_PROJECT_MARKER));
        assert_eq!(FsProbe::new(None).probe(temp.path()), InstallTarget::Cursor);
    }

    struct CountingProbe(AtomicUsize);

    impl EnvironmentProbe for CountingProbe {
        fn probe(&self, _target_dir: &Path) -> InstallTarget {
            self.0.fetch_add(1, Ordering::SeqCst);
            InstallTarget::Qoder
        }
    }

    #[test]
    fn test_forced_env_skips_probe() {
        let probe = CountingProbe(AtomicUsize::new(0));
        let target = resolve_target(EnvSelection::Cursor, &probe, Path::new("/nowhere"));
        assert_eq!(target, InstallTarget::Cursor);
        assert_eq!(probe.0.load(Ordering::SeqCst), 0);

        let target = resolve_target(EnvSelection::Auto, &probe, Path::new("/nowhere"));
        assert_eq!(target, InstallTarget::Qoder);
        assert_eq!(probe.0.load(Ordering::SeqCst), 1);
    }
}
