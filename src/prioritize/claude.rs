//! Claude Code headless client.
//!
//! `ClaudeHeadless` runs the `claude` CLI in non-interactive mode (`-p`)
//! with JSON output, unwraps the CLI's result envelope, and implements
//! [`Generator`] on top of it.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tokio::process::Command;

use super::generator::{extract_json, Generator};
use crate::config::{Config, DEFAULT_TIMEOUT_SECS};
use crate::{aflog_debug, aflog_warn, Error, Result};

/// Outcome reported by the CLI.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultType {
    Success { output: String },
    Error { message: String },
}

/// A parsed CLI run.
#[derive(Debug, Clone)]
pub struct ClaudeResponse {
    pub session_id: Option<String>,
    pub result: ResultType,
    pub cost_usd: Option<f64>,
    pub duration_ms: Option<u64>,
    pub num_turns: Option<u32>,
}

impl ClaudeResponse {
    fn error(message: String) -> Self {
        Self {
            session_id: None,
            result: ResultType::Error { message },
            cost_usd: None,
            duration_ms: None,
            num_turns: None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.result, ResultType::Success { .. })
    }

    pub fn output(&self) -> Option<&str> {
        match &self.result {
            ResultType::Success { output } => Some(output),
            ResultType::Error { .. } => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.result {
            ResultType::Success { .. } => None,
            ResultType::Error { message } => Some(message),
        }
    }
}

/// The envelope printed by `claude --output-format json`.
#[derive(Debug, Deserialize)]
struct RawClaudeResponse {
    subtype: Option<String>,
    result: Option<String>,
    session_id: Option<String>,
    total_cost_usd: Option<f64>,
    duration_ms: Option<u64>,
    num_turns: Option<u32>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    is_error: bool,
}

#[derive(Debug, Clone)]
pub struct ClaudeHeadless {
    binary: PathBuf,
    model: Option<String>,
    timeout: Duration,
}

impl ClaudeHeadless {
    /// Locate `claude` in PATH.
    ///
    /// # Errors
    /// `Error::ClaudeBinaryNotFound` if it is not installed.
    pub fn new() -> Result<Self> {
        let binary = which::which("claude").map_err(|_| Error::ClaudeBinaryNotFound)?;
        Ok(Self::with_binary(binary))
    }

    pub fn with_binary(binary: PathBuf) -> Self {
        Self {
            binary,
            model: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Build from configuration: explicit binary or PATH lookup, plus model
    /// and timeout.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = match config.claude_binary() {
            Some(binary) => Self::with_binary(binary),
            None => Self::new()?,
        };
        let client = client.with_timeout(config.timeout());
        Ok(match &config.model {
            Some(model) => client.with_model(model),
            None => client,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = Some(model.to_string());
        self
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn args(&self, prompt: &str) -> Vec<String> {
        let mut args = vec![
            "-p".to_string(),
            prompt.to_string(),
            "--output-format".to_string(),
            "json".to_string(),
        ];
        if let Some(model) = &self.model {
            args.push("--model".to_string());
            args.push(model.clone());
        }
        args
    }

    /// Run one prompt.
    ///
    /// # Errors
    /// `Error::Generation` if the process cannot be spawned or exceeds the
    /// timeout. A CLI that runs but reports failure yields
    /// `Ok` with [`ResultType::Error`].
    pub async fn execute(&self, prompt: &str) -> Result<ClaudeResponse> {
        aflog_debug!(
            "ClaudeHeadless::execute binary={} model={:?} prompt_len={}",
            self.binary.display(),
            self.model,
            prompt.len()
        );

        let output = tokio::time::timeout(
            self.timeout,
            Command::new(&self.binary)
                .args(self.args(prompt))
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| Error::Generation(format!("timed out after {:?}", self.timeout)))?
        .map_err(|e| {
            Error::Generation(format!("failed to run {}: {}", self.binary.display(), e))
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if Self::is_envelope(&stdout) {
            if let Ok(response) = Self::parse_json_response(&stdout) {
                aflog_debug!(
                    "Claude finished: success={} cost_usd={:?} duration_ms={:?} turns={:?}",
                    response.is_success(),
                    response.cost_usd,
                    response.duration_ms,
                    response.num_turns
                );
                return Ok(response);
            }
        }

        if !output.status.success() {
            let message = if stderr.trim().is_empty() {
                format!(
                    "claude exited with code {}",
                    output.status.code().unwrap_or(-1)
                )
            } else {
                stderr.trim().to_string()
            };
            aflog_warn!("Claude failed without a JSON envelope: {}", message);
            return Ok(ClaudeResponse::error(message));
        }

        // Anything else on success is the model's answer as printed; older
        // CLIs ignore --output-format.
        Ok(ClaudeResponse {
            session_id: None,
            result: ResultType::Success {
                output: stdout.trim().to_string(),
            },
            cost_usd: None,
            duration_ms: None,
            num_turns: None,
        })
    }

    /// Whether stdout is the CLI's result envelope rather than a model answer
    /// printed as-is.
    fn is_envelope(stdout: &str) -> bool {
        let Ok(Value::Object(fields)) = serde_json::from_str::<Value>(stdout) else {
            return false;
        };
        fields.get("type").and_then(Value::as_str) == Some("result")
            || fields.contains_key("subtype")
            || fields.contains_key("is_error")
    }

    /// Parse the CLI's JSON envelope.
    pub fn parse_json_response(json_str: &str) -> Result<ClaudeResponse> {
        let raw: RawClaudeResponse = serde_json::from_str(json_str)?;

        let result = match raw.subtype.as_deref() {
            Some("success") if !raw.is_error => ResultType::Success {
                output: raw.result.unwrap_or_default(),
            },
            Some(subtype) if subtype.starts_with("error") || raw.is_error => ResultType::Error {
                message: raw
                    .error
                    .or(raw.result)
                    .unwrap_or_else(|| subtype.to_string()),
            },
            _ => {
                if let Some(error) = raw.error {
                    ResultType::Error { message: error }
                } else if raw.is_error {
                    ResultType::Error {
                        message: raw.result.unwrap_or_else(|| "unknown error".to_string()),
                    }
                } else if let Some(result) = raw.result {
                    ResultType::Success { output: result }
                } else {
                    ResultType::Error {
                        message: "Unknown response format".to_string(),
                    }
                }
            }
        };

        Ok(ClaudeResponse {
            session_id: raw.session_id,
            result,
            cost_usd: raw.total_cost_usd,
            duration_ms: raw.duration_ms,
            num_turns: raw.num_turns,
        })
    }
}

#[async_trait]
impl Generator for ClaudeHeadless {
    async fn generate(&self, prompt: &str, _schema: &Value) -> Result<Option<Value>> {
        // The schema is already spelled out in the prompt; the CLI has no
        // separate channel for it.
        let response = self.execute(prompt).await?;
        match response.result {
            ResultType::Success { output } => extract_json(&output),
            ResultType::Error { message } => Err(Error::Generation(message)),
        }
    }
}
