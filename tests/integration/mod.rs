//! Integration test suite for vibe-plugins
//!
//! Drives the compiled `vibe-plugins` and `vp` binaries against temporary project,
//! plugins, presets and home directories.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **install**: environment detection and the Claude/Cursor/qoder installers
//! - **generate**: capability generation, batches and `list-types`
//! - **presets**: the `vp` preset tool

// Shared test utilities (from parent tests/ directory)
#[path = "../common/mod.rs"]
mod common;

mod generate;
mod install;
mod presets;
