//! Cross-platform utilities
//!
//! - [`fs`] - File system operations with atomic writes and recursive copies
//! - [`platform`] - Home directory lookup, command discovery, path resolution
//! - [`names`] - Validation for plugin and capability names

pub mod fs;
pub mod names;
pub mod platform;

pub use fs::{
    copy_path, ensure_dir, ensure_parent_dir, list_files, path_exists, read_json_file,
    read_text_file, remove_path, safe_write, write_json_file,
};
pub use names::validate_name;
pub use platform::{command_exists, get_home_dir, home_dir, resolve_path};
