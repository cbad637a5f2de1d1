//! Name validation shared by the manifest loader and the generator.
//!
//! Plugin names and capability names become path components, so they must not
//! contain separators or start with a dot.

use crate::core::VibeError;
use regex::Regex;
use std::sync::LazyLock;

static NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").expect("name pattern is a valid regex")
});

/// Rejects names that could escape their parent directory when joined onto a path.
pub fn validate_name(name: &str) -> Result<(), VibeError> {
    if NAME_PATTERN.is_match(name) && !name.contains("..") {
        Ok(())
    } else {
        Err(VibeError::InvalidName {
            name: name.to_string(),
        })
    }
}
