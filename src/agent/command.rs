//! Fluent builder for running external tools (the agent CLI, `npx rulesync`).
//!
//! Every subprocess the crate starts goes through [`ToolCommand`], so logging,
//! timeouts and failure reporting look the same for all of them.
//!
//! ```rust,no_run
//! use vibe_plugins::agent::command::ToolCommand;
//!
//! # async fn example() -> anyhow::Result<()> {
//! // Interactive run, output goes straight to the terminal
//! ToolCommand::new("npx")
//!     .args(["rulesync", "generate", "--targets", "cursor", "--features", "*"])
//!     .inherit_stdio()
//!     .with_context("rulesync")
//!     .execute_success()
//!     .await?;
//!
//! // Captured run
//! let output = ToolCommand::new("claude").arg("--version").execute().await?;
//! println!("{}", output.stdout.trim());
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};
use tokio::time::timeout;

use crate::core::VibeError;

/// Builder for one external tool invocation.
///
/// Defaults: output captured, no timeout, current process directory, inherited
/// environment.
#[derive(Debug, Clone)]
pub struct ToolCommand {
    /// Program to run, looked up on `PATH`
    program: String,

    /// Arguments in order
    args: Vec<String>,

    /// Working directory (defaults to the current directory)
    current_dir: Option<PathBuf>,

    /// Capture stdout/stderr (true) or inherit the parent's stdio (false)
    capture_output: bool,

    /// Extra environment variables
    env_vars: Vec<(String, String)>,

    /// Maximum time to wait for completion
    timeout_duration: Option<Duration>,

    /// Label used in log lines
    context: Option<String>,
}

/// Captured result of [`ToolCommand::execute`].
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Exit code, `None` when killed by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    #[must_use]
    pub const fn success(&self) -> bool {
        matches!(self.code, Some(0))
    }
}

impl ToolCommand {
    /// Start building an invocation of `program`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            capture_output: true,
            env_vars: Vec::new(),
            timeout_duration: None,
            context: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.push((key.into(), value.into()));
        self
    }

    /// Let the tool write directly to the terminal.
    ///
    /// Use [`execute_success`](Self::execute_success) afterwards; there is nothing to
    /// capture.
    pub const fn inherit_stdio(mut self) -> Self {
        self.capture_output = false;
        self
    }

    /// Set a timeout (None for no timeout).
    pub const fn with_timeout(mut self, duration: Option<Duration>) -> Self {
        self.timeout_duration = duration;
        self
    }

    /// Label included in debug log lines.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// The program name.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// The arguments collected so far.
    #[must_use]
    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    /// The command line as it would be typed, for logs and messages.
    #[must_use]
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn log_start(&self) {
        match &self.context {
            Some(ctx) => tracing::debug!("({ctx}) Executing command: {}", self.display()),
            None => tracing::debug!("Executing command: {}", self.display()),
        }
    }

    fn build(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir);
        }
        for (key, value) in &self.env_vars {
            tracing::trace!("Setting env var: {key}={value}");
            cmd.env(key, value);
        }
        cmd.kill_on_drop(true);
        cmd
    }

    /// Run to completion and return whatever it produced, successful or not.
    pub async fn execute(self) -> Result<ToolOutput> {
        self.log_start();
        let mut cmd = self.build();
        if self.capture_output {
            cmd.stdout(Stdio::piped());
            cmd.stderr(Stdio::piped());
        } else {
            cmd.stdout(Stdio::inherit());
            cmd.stderr(Stdio::inherit());
        }
        cmd.stdin(Stdio::null());

        let output = match self.timeout_duration {
            Some(duration) => match timeout(duration, cmd.output()).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!(
                        "Command timed out after {} seconds: {}",
                        duration.as_secs(),
                        self.display()
                    );
                    return Err(VibeError::ExternalToolFailed {
                        tool: self.program.clone(),
                        code: None,
                    }
                    .into());
                }
            },
            None => cmd.output().await,
        }
        .with_context(|| format!("Failed to execute {}", self.display()))?;

        let result = ToolOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };

        if !result.stderr.is_empty() {
            tracing::debug!("{}", result.stderr.trim());
        }
        tracing::debug!("Command exited with {:?}", result.code);
        Ok(result)
    }

    /// Run to completion; a non-zero exit is [`VibeError::ExternalToolFailed`].
    pub async fn execute_success(self) -> Result<ToolOutput> {
        let program = self.program.clone();
        let output = self.execute().await?;
        if output.success() {
            Ok(output)
        } else {
            Err(VibeError::ExternalToolFailed {
                tool: program,
                code: output.code,
            }
            .into())
        }
    }

    /// Spawn with stdout piped for line-by-line reading; stderr goes to the terminal.
    pub fn spawn_streaming(self) -> Result<Child> {
        self.log_start();
        let mut cmd = self.build();
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::inherit());
        cmd.spawn().with_context(|| format!("Failed to start {}", self.display()))
    }
}
