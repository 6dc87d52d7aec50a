//! Test fixtures for integration tests.
//!
//! Provides helpers for:
//! - Mock generators with canned answers
//! - A fake `claude` executable
//! - Temporary file-backed workspaces

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use tempfile::TempDir;

use agileflow::prioritize::{
    ClaudeHeadless, Generator, PrioritizationRequest, Prioritizer, TaskDescriptor,
};
use agileflow::store::Workspace;
use agileflow::{Error, Result};

/// One canned generator answer.
#[derive(Debug, Clone)]
pub enum MockResponse {
    Json(Value),
    Empty,
    Fail(String),
}

impl MockResponse {
    /// A well-formed answer built from `(id, priority, reason)` triples.
    pub fn prioritized(entries: &[(&str, &str, &str)]) -> Self {
        let tasks: Vec<Value> = entries
            .iter()
            .map(|(id, priority, reason)| json!({"id": id, "priority": priority, "reason": reason}))
            .collect();
        MockResponse::Json(json!({ "prioritizedTasks": tasks }))
    }
}

/// Generator that replays canned answers in order and records every prompt.
pub struct MockGenerator {
    responses: Vec<MockResponse>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl MockGenerator {
    pub fn new(responses: Vec<MockResponse>) -> Arc<Self> {
        Arc::new(Self {
            responses,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn answering(response: MockResponse) -> Arc<Self> {
        Self::new(vec![response])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Generator for MockGenerator {
    async fn generate(&self, prompt: &str, _schema: &Value) -> Result<Option<Value>> {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.responses[index % self.responses.len()] {
            MockResponse::Json(value) => Ok(Some(value.clone())),
            MockResponse::Empty => Ok(None),
            MockResponse::Fail(message) => Err(Error::Generation(message.clone())),
        }
    }
}

pub fn prioritizer(generator: &Arc<MockGenerator>) -> Prioritizer {
    Prioritizer::new(generator.clone())
}

/// A claude client pointing at a binary that does not exist.
pub fn unreachable_claude() -> ClaudeHeadless {
    ClaudeHeadless::with_binary(PathBuf::from("/nonexistent/agileflow-test/claude"))
}

/// The single-task request used throughout the docs.
pub fn ship_v2_request() -> PrioritizationRequest {
    PrioritizationRequest::new(vec![TaskDescriptor::new(
        "t1",
        "Write tests",
        "2025-01-10T00:00:00Z",
        "Ship v2",
    )])
}

pub fn request_with_ids(ids: &[&str]) -> PrioritizationRequest {
    PrioritizationRequest::new(
        ids.iter()
            .map(|id| TaskDescriptor::new(id, &format!("Task {}", id), "2025-03-01T00:00:00Z", "Ship v2"))
            .collect(),
    )
}

/// A file-backed workspace seeded with demo data in a temp dir.
pub struct TestWorkspace {
    pub dir: TempDir,
    pub workspace: Workspace,
}

impl TestWorkspace {
    pub fn seeded() -> Self {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let workspace = Workspace::open(dir.path(), true).expect("Failed to open workspace");
        Self { dir, workspace }
    }

    /// Open the same directory again, as a new process would.
    pub fn reopen(&self) -> Workspace {
        Workspace::open(self.dir.path(), true).expect("Failed to reopen workspace")
    }
}

/// Write an executable shell script standing in for the `claude` CLI.
#[cfg(unix)]
pub fn fake_claude_script(dir: &TempDir, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.path().join("claude");
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).expect("Failed to write fake claude");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .expect("Failed to chmod fake claude");
    path
}

/// A fake `claude` that prints `stdout` and exits 0.
#[cfg(unix)]
pub fn fake_claude(dir: &TempDir, stdout: &str) -> PathBuf {
    fake_claude_script(dir, &format!("cat <<'AGILEFLOW_EOF'\n{}\nAGILEFLOW_EOF", stdout))
}

/// A fake `claude` that never answers in time.
#[cfg(unix)]
pub fn slow_claude(dir: &TempDir) -> PathBuf {
    fake_claude_script(dir, "sleep 5")
}

/// Wrap model output in the CLI's JSON envelope.
pub fn claude_envelope(result: &str) -> String {
    json!({
        "type": "result",
        "subtype": "success",
        "is_error": false,
        "result": result,
        "session_id": "test-session",
        "total_cost_usd": 0.001,
        "duration_ms": 42,
        "num_turns": 1
    })
    .to_string()
}
