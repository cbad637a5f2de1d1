//! Platform helpers: home directory lookup, command discovery and path resolution.

use anyhow::Result;
use std::path::{Path, PathBuf};

/// Returns the current user's home directory, if it can be determined.
///
/// Callers that can cope with a missing home directory (the environment probe)
/// use this directly; the others go through [`get_home_dir`].
#[must_use]
pub fn home_dir() -> Option<PathBuf> {
    dirs::home_dir()
}

/// Returns the current user's home directory or a descriptive error.
pub fn get_home_dir() -> Result<PathBuf> {
    home_dir().ok_or_else(|| {
        let platform_help = if cfg!(windows) {
            "On Windows: Check that the USERPROFILE environment variable is set"
        } else {
            "On Unix/Linux: Check that the HOME environment variable is set"
        };
        anyhow::anyhow!("Could not determine home directory.\n\n{platform_help}")
    })
}

/// Checks whether an executable can be found on `PATH`.
#[must_use]
pub fn command_exists(cmd: &str) -> bool {
    which::which(cmd).is_ok()
}

/// Expands `~` and environment variables in `path` and makes it absolute relative to
/// `base` when it is still relative after expansion.
pub fn resolve_path(path: &str, base: &Path) -> Result<PathBuf> {
    let expanded = shellexpand::full(path)
        .map_err(|e| anyhow::anyhow!("Invalid path '{path}': {e}"))?;
    let expanded = PathBuf::from(expanded.as_ref());
    if expanded.is_absolute() {
        Ok(expanded)
    } else {
        Ok(base.join(expanded))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_path_relative_to_base() {
        let base = Path::new("/work/project");
        assert_eq!(resolve_path("plugins", base).unwrap(), PathBuf::from("/work/project/plugins"));
    }

    #[test]
    fn test_resolve_path_absolute_untouched() {
        let base = Path::new("/work/project");
        assert_eq!(resolve_path("/opt/plugins", base).unwrap(), PathBuf::from("/opt/plugins"));
    }

    #[test]
    #[serial_test::serial]
    fn test_resolve_path_expands_env_vars() {
        // SAFETY: serialised with every other test touching the environment
        unsafe { std::env::set_var("VIBE_TEST_PLUGINS", "/srv/vibe") };
        let resolved = resolve_path("$VIBE_TEST_PLUGINS/plugins", Path::new("/ignored")).unwrap();
        unsafe { std::env::remove_var("VIBE_TEST_PLUGINS") };
        assert_eq!(resolved, PathBuf::from("/srv/vibe/plugins"));

        assert!(resolve_path("$VIBE_TEST_UNSET_VAR/x", Path::new("/")).is_err());
    }

    #[test]
    fn test_resolve_path_expands_tilde() {
        if let Some(home) = home_dir() {
            let resolved = resolve_path("~/presets", Path::new("/ignored")).unwrap();
            assert_eq!(resolved, home.join("presets"));
        }
    }
}
