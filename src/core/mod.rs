//! Core types shared across vibe-plugins.
//!
//! - [`error`] - [`VibeError`], [`ErrorContext`] and [`user_friendly_error`]
//! - [`target`] - [`InstallTarget`] and the `--env` [`EnvSelection`]

pub mod error;
pub mod target;

pub use error::{ErrorContext, VibeError, user_friendly_error};
pub use target::{EnvSelection, InstallTarget};
