//! External agent execution.
//!
//! The delegated installer and `vp tag` hand a natural-language prompt to an external
//! coding agent and trust it to do the work. This module is that boundary:
//!
//! - [`AgentExecutor`] - the capability, one prompt in, one [`AgentRun`] out
//! - [`ClaudeCliExecutor`] - runs the `claude` CLI in print mode and decodes its
//!   `stream-json` output into typed [`AgentMessage`]s
//! - [`command::ToolCommand`] - subprocess builder shared with the preset tool
//!
//! Nothing the agent does is verified here; callers only learn whether the run
//! reported success.

pub mod command;

use anyhow::Result;
use serde::Deserialize;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::config::AgentConfig;
use crate::core::VibeError;
use crate::utils::command_exists;
use command::ToolCommand;

/// One prompt for the agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentRequest {
    pub prompt: String,
    /// Directory the agent works in
    pub cwd: PathBuf,
    pub max_turns: u32,
    /// Extra directories the agent may read
    pub additional_dirs: Vec<PathBuf>,
    /// Appended to the agent's system prompt
    pub system_append: Option<String>,
}

/// Summary of a finished agent run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentRun {
    /// Text of the last assistant message, if any
    pub last_assistant_text: Option<String>,
    /// The final `result` message, if the agent sent one
    pub result: Option<AgentResult>,
}

/// The agent's final `result` message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentResult {
    pub is_error: bool,
    pub subtype: Option<String>,
    pub text: Option<String>,
    pub num_turns: Option<u32>,
    pub usage: Option<Usage>,
}

impl AgentRun {
    /// The answer to show or parse: the result text, else the last assistant text.
    #[must_use]
    pub fn answer(&self) -> Option<&str> {
        self.result
            .as_ref()
            .and_then(|r| r.text.as_deref())
            .or(self.last_assistant_text.as_deref())
    }

    /// Fold one streamed message into the run summary.
    pub fn apply(&mut self, message: AgentMessage) {
        match message {
            AgentMessage::System {
                subtype,
                model,
            } => {
                tracing::debug!(
                    "Agent session {} (model {})",
                    subtype.as_deref().unwrap_or("started"),
                    model.as_deref().unwrap_or("default")
                );
            }
            AgentMessage::Assistant {
                message,
            } => {
                let text = message.text();
                if !text.is_empty() {
                    tracing::info!("{}", preview(&text, 200));
                    self.last_assistant_text = Some(text);
                }
            }
            AgentMessage::User {
                ..
            } => tracing::trace!("Agent received tool results"),
            AgentMessage::Result {
                subtype,
                is_error,
                result,
                num_turns,
                usage,
            } => {
                if let Some(usage) = &usage {
                    tracing::info!(
                        "Agent finished: {} input tokens, {} output tokens",
                        usage.input_tokens,
                        usage.output_tokens
                    );
                }
                self.result = Some(AgentResult {
                    is_error,
                    subtype,
                    text: result,
                    num_turns,
                    usage,
                });
            }
            AgentMessage::Other => {}
        }
    }
}

/// Messages in the agent's `stream-json` output, one JSON object per line.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AgentMessage {
    System {
        #[serde(default)]
        subtype: Option<String>,
        #[serde(default)]
        model: Option<String>,
    },
    Assistant {
        message: MessageBody,
    },
    User {
        #[serde(default)]
        message: serde_json::Value,
    },
    Result {
        #[serde(default)]
        subtype: Option<String>,
        #[serde(default)]
        is_error: bool,
        #[serde(default)]
        result: Option<String>,
        #[serde(default)]
        num_turns: Option<u32>,
        #[serde(default)]
        usage: Option<Usage>,
    },
    #[serde(other)]
    Other,
}

/// Body of an assistant message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MessageBody {
    #[serde(default)]
    pub content: Vec<ContentBlock>,
}

impl MessageBody {
    /// All text blocks joined with newlines; tool calls are ignored.
    #[must_use]
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text {
                    text,
                } => Some(text.as_str()),
                ContentBlock::Other => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

/// Token usage reported with the final result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
}

/// Decode one output line; lines that are not agent messages yield `None`.
#[must_use]
pub fn parse_message(line: &str) -> Option<AgentMessage> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    match serde_json::from_str(line) {
        Ok(message) => Some(message),
        Err(e) => {
            tracing::debug!("Ignoring non-message agent output ({e}): {}", preview(line, 80));
            None
        }
    }
}

fn preview(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() { format!("{head}...") } else { head }
}

/// Runs prompts through an external agent.
pub trait AgentExecutor: Send + Sync {
    /// Run one request to completion.
    ///
    /// # Errors
    ///
    /// [`VibeError::AgentNotFound`] when the agent is not installed,
    /// [`VibeError::DelegatedExecutionFailed`] when the run fails or reports an error.
    fn run(
        &self,
        request: AgentRequest,
    ) -> Pin<Box<dyn Future<Output = Result<AgentRun>> + Send + '_>>;
}

/// Executor backed by the `claude` command-line agent.
#[derive(Debug, Clone)]
pub struct ClaudeCliExecutor {
    command: String,
    timeout: Option<Duration>,
}

impl ClaudeCliExecutor {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            timeout: None,
        }
    }

    #[must_use]
    pub fn from_config(config: &AgentConfig) -> Self {
        Self::new(config.command.clone())
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// The command line for `request`.
    #[must_use]
    pub fn build_command(&self, request: &AgentRequest) -> ToolCommand {
        let mut cmd = ToolCommand::new(&self.command)
            .arg("-p")
            .arg(&request.prompt)
            .args(["--output-format", "stream-json", "--verbose"])
            .arg("--max-turns")
            .arg(request.max_turns.to_string())
            .current_dir(&request.cwd)
            .with_context("agent");
        for dir in &request.additional_dirs {
            cmd = cmd.arg("--add-dir").arg(dir.display().to_string());
        }
        if let Some(append) = &request.system_append {
            cmd = cmd.arg("--append-system-prompt").arg(append);
        }
        cmd
    }

    async fn run_inner(&self, request: AgentRequest) -> Result<AgentRun> {
        if !command_exists(&self.command) {
            return Err(VibeError::AgentNotFound {
                command: self.command.clone(),
            }
            .into());
        }

        let mut child = self.build_command(&request).spawn_streaming()?;
        let stdout = child.stdout.take().ok_or_else(|| VibeError::DelegatedExecutionFailed {
            reason: "agent output was not captured".to_string(),
        })?;

        let mut run = AgentRun::default();
        let mut lines = BufReader::new(stdout).lines();
        while let Some(line) = lines.next_line().await? {
            if let Some(message) = parse_message(&line) {
                run.apply(message);
            }
        }

        let status = child.wait().await?;
        if !status.success() {
            return Err(VibeError::DelegatedExecutionFailed {
                reason: format!(
                    "{} exited with {}",
                    self.command,
                    status.code().map_or_else(|| "a signal".to_string(), |c| format!("code {c}"))
                ),
            }
            .into());
        }

        if let Some(result) = &run.result
            && result.is_error
        {
            return Err(VibeError::DelegatedExecutionFailed {
                reason: result
                    .text
                    .clone()
                    .or_else(|| result.subtype.clone())
                    .unwrap_or_else(|| "agent reported an error".to_string()),
            }
            .into());
        }

        Ok(run)
    }
}

impl AgentExecutor for ClaudeCliExecutor {
    fn run(
        &self,
        request: AgentRequest,
    ) -> Pin<Box<dyn Future<Output = Result<AgentRun>> + Send + '_>> {
        Box::pin(async move {
            match self.timeout {
                Some(duration) => tokio::time::timeout(duration, self.run_inner(request))
                    .await
                    .map_err(|_| VibeError::DelegatedExecutionFailed {
                        reason: format!("agent timed out after {} seconds", duration.as_secs()),
                    })?,
                None => self.run_inner(request).await,
            }
        })
    }
}
