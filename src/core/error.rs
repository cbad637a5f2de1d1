//! Error handling for vibe-plugins
//!
//! The error system follows two rules:
//! 1. **Strongly-typed errors** ([`VibeError`]) for every failure the tool can name
//! 2. **User-friendly messages** ([`ErrorContext`]) with a suggestion for CLI users
//!
//! Library code returns [`anyhow::Result`] and wraps [`VibeError`] values into it;
//! the binaries convert whatever comes back with [`user_friendly_error`] and print
//! it with [`ErrorContext::display`].
//!
//! # Error Categories
//!
//! - **Not found**: [`VibeError::PluginNotFound`], [`VibeError::SourceNotFound`],
//!   [`VibeError::PresetNotFound`]
//! - **Environment**: [`VibeError::EnvironmentNotDetected`], [`VibeError::UnknownEnvironment`]
//! - **Installation**: [`VibeError::PostConditionViolation`],
//!   [`VibeError::DelegatedExecutionFailed`], [`VibeError::AgentNotFound`]
//! - **Generation**: [`VibeError::InvalidGenerationRequest`],
//!   [`VibeError::UnknownCapabilityType`], [`VibeError::BatchFormatError`]
//! - **Input**: [`VibeError::InvalidName`], [`VibeError::ManifestParseError`]
//!
//! # Examples
//!
//! ```rust,no_run
//! use vibe_plugins::core::{VibeError, user_friendly_error};
//!
//! let error = VibeError::EnvironmentNotDetected {
//!     target_dir: "/work/app".to_string(),
//! };
//! let context = user_friendly_error(anyhow::Error::from(error));
//! context.display(); // error + details + suggestion on stderr
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for vibe-plugins operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VibeError {
    /// The plugin descriptor could not be found under the plugins root.
    #[error("Plugin \"{name}\" not found. Expected at {path}")]
    PluginNotFound {
        /// Requested plugin name
        name: String,
        /// Expected descriptor path
        path: String,
    },

    /// A source file or directory the operation depends on is missing.
    #[error("Source not found: {path}")]
    SourceNotFound {
        /// Missing path
        path: String,
    },

    /// Auto-detection found no marker and no environment was forced.
    #[error("Unable to detect environment in {target_dir}. Pass --env claude|cursor|qoder explicitly.")]
    EnvironmentNotDetected {
        /// Directory that was probed
        target_dir: String,
    },

    /// No installer exists for the resolved environment.
    #[error("Unknown environment: {name}")]
    UnknownEnvironment {
        /// Environment name
        name: String,
    },

    /// An artifact that a completed step should have produced is absent.
    #[error("{reason}: {path}")]
    PostConditionViolation {
        /// Path of the missing artifact
        path: String,
        /// What was expected
        reason: String,
    },

    /// The external agent reported a failure while performing a delegated install.
    #[error("Delegated installation failed: {reason}")]
    DelegatedExecutionFailed {
        /// Failure description reported by the agent or its process
        reason: String,
    },

    /// The agent command used for delegated work is not installed.
    #[error("Agent command '{command}' not found in PATH")]
    AgentNotFound {
        /// Command that was looked up
        command: String,
    },

    /// A generation request is missing a field or carries an invalid one.
    #[error("Invalid generation request: {field} {reason}")]
    InvalidGenerationRequest {
        /// Offending field
        field: String,
        /// Why it was rejected
        reason: String,
    },

    /// The capability type is not one the generator knows.
    #[error("Unknown capability type: {name}")]
    UnknownCapabilityType {
        /// Type name as given
        name: String,
    },

    /// A plugin or capability name is not a safe path component.
    #[error("Invalid name \"{name}\": use letters, digits, '.', '_' or '-', starting with a letter or digit")]
    InvalidName {
        /// Rejected name
        name: String,
    },

    /// A JSON descriptor, manifest or registry file could not be parsed.
    #[error("Failed to parse {file}: {reason}")]
    ManifestParseError {
        /// File that failed to parse
        file: String,
        /// Parser message
        reason: String,
    },

    /// A batch generation file does not have the expected shape.
    #[error("Invalid batch file {file}: {reason}")]
    BatchFormatError {
        /// Batch file path
        file: String,
        /// What is wrong with it
        reason: String,
    },

    /// The requested preset does not exist.
    #[error("Preset \"{name}\" not found")]
    PresetNotFound {
        /// Requested preset
        name: String,
        /// Presets that do exist
        available: Vec<String>,
    },

    /// An external tool exited unsuccessfully.
    #[error("{tool} failed{}", .code.map(|c| format!(" with exit code {c}")).unwrap_or_default())]
    ExternalToolFailed {
        /// Tool name
        tool: String,
        /// Exit code, when the process exited normally
        code: Option<i32>,
    },

    /// A file system operation failed.
    #[error("File system error during {operation}: {path}")]
    FileSystemError {
        /// Operation being performed
        operation: String,
        /// Path involved
        path: String,
    },

    /// Anything else, carrying a preformatted message.
    #[error("{message}")]
    Other {
        /// Message to show
        message: String,
    },
}

/// A [`VibeError`] enriched with optional details and a suggestion for the user.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: VibeError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: VibeError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add details explaining the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr: error in red, details in yellow, suggestion in green.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into a user-friendly [`ErrorContext`].
///
/// Recognizes [`VibeError`] anywhere in the chain, then [`std::io::Error`] and
/// [`serde_json::Error`]; everything else becomes [`VibeError::Other`] with the full
/// cause chain appended.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(vibe_error) = error.chain().find_map(|e| e.downcast_ref::<VibeError>()) {
        return create_error_context(vibe_error.clone());
    }

    if let Some(io_error) = error.chain().find_map(|e| e.downcast_ref::<std::io::Error>()) {
        let message = chain_message(&error);
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(VibeError::Other {
                    message,
                })
                .with_suggestion("Check the ownership and permissions of the target directory")
                .with_details(
                    "The target tree may be partially populated; re-run after fixing permissions",
                );
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(VibeError::Other {
                    message,
                })
                .with_suggestion("Check that the file or directory exists and the path is correct");
            }
            _ => {}
        }
    }

    if let Some(json_error) = error.chain().find_map(|e| e.downcast_ref::<serde_json::Error>()) {
        return ErrorContext::new(VibeError::ManifestParseError {
            file: "JSON input".to_string(),
            reason: json_error.to_string(),
        })
        .with_suggestion("Check the JSON syntax: quotes, commas and brackets");
    }

    ErrorContext::new(VibeError::Other {
        message: chain_message(&error),
    })
}

fn chain_message(error: &anyhow::Error) -> String {
    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }
    message
}

fn create_error_context(error: VibeError) -> ErrorContext {
    match &error {
        VibeError::PluginNotFound { .. } => ErrorContext::new(error)
            .with_suggestion(
                "Check the plugin name, or point --plugins-root (VIBE_PLUGINS_ROOT) at the \
                 directory that contains it",
            )
            .with_details("A plugin is a directory containing .claude-plugin/plugin.json"),

        VibeError::EnvironmentNotDetected { .. } => ErrorContext::new(error)
            .with_suggestion("Pass --env claude, --env cursor or --env qoder")
            .with_details(
                "Detection looks for .claude, .claude-plugin, cursor.json, \
                 ~/.cursor/settings.json and qoder.config.json",
            ),

        VibeError::PostConditionViolation { .. } => ErrorContext::new(error)
            .with_suggestion("Check that the plugin source contains .claude-plugin/plugin.json")
            .with_details("The plugin layout is corrupted or unexpected"),

        VibeError::AgentNotFound { command } => {
            let suggestion = format!(
                "Install the '{command}' CLI or set [agent].command in the config file, \
                 or install without --use-sdk"
            );
            ErrorContext::new(error).with_suggestion(suggestion)
        }

        VibeError::DelegatedExecutionFailed { .. } => ErrorContext::new(error)
            .with_suggestion("Retry without --use-sdk to run the direct installer"),

        VibeError::UnknownCapabilityType { .. } => ErrorContext::new(error)
            .with_suggestion("Run 'vibe-plugins list-types' to see the supported types"),

        VibeError::PresetNotFound { available, .. } => {
            let details = format!("Available presets: {}", available.join(", "));
            ErrorContext::new(error).with_details(details)
        }

        VibeError::ExternalToolFailed { tool, .. } if tool.contains("rulesync") => {
            ErrorContext::new(error)
                .with_suggestion("Make sure rulesync is installed (npm i -g rulesync)")
        }

        VibeError::ManifestParseError { .. } => ErrorContext::new(error)
            .with_suggestion("Check the JSON syntax: quotes, commas and brackets"),

        _ => ErrorContext::new(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_plugin_not_found_message() {
        let err = VibeError::PluginNotFound {
            name: "demo".to_string(),
            path: "/plugins/demo/.claude-plugin/plugin.json".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Plugin \"demo\" not found. Expected at /plugins/demo/.claude-plugin/plugin.json"
        );
    }

    #[test]
    fn test_external_tool_failed_message() {
        let with_code = VibeError::ExternalToolFailed {
            tool: "npx rulesync".to_string(),
            code: Some(2),
        };
        assert_eq!(with_code.to_string(), "npx rulesync failed with exit code 2");

        let killed = VibeError::ExternalToolFailed {
            tool: "claude".to_string(),
            code: None,
        };
        assert_eq!(killed.to_string(), "claude failed");
    }

    #[test]
    fn test_user_friendly_error_finds_wrapped_vibe_error() {
        let err = anyhow::Error::from(VibeError::EnvironmentNotDetected {
            target_dir: "/tmp/x".to_string(),
        })
        .context("while installing demo");

        let ctx = user_friendly_error(err);
        assert!(matches!(ctx.error, VibeError::EnvironmentNotDetected { .. }));
        assert!(ctx.suggestion.unwrap().contains("--env"));
    }

    #[test]
    fn test_user_friendly_error_generic_chain() {
        let err: anyhow::Result<()> = Err(anyhow::anyhow!("root cause"));
        let err = err.context("outer").unwrap_err();

        let ctx = user_friendly_error(err);
        let text = ctx.to_string();
        assert!(text.contains("outer"));
        assert!(text.contains("root cause"));
    }

    #[test]
    fn test_error_context_display_format() {
        let ctx = ErrorContext::new(VibeError::Other {
            message: "boom".to_string(),
        })
        .with_details("d")
        .with_suggestion("s");
        assert_eq!(ctx.to_string(), "boom\nDetails: d\nSuggestion: s");
    }
}
