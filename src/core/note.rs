//! Markdown notes, optionally linked to a task.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::task::TaskId;
use crate::store::Record;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(pub String);

impl NoteId {
    pub fn generate() -> Self {
        Self(format!("note-{}", Uuid::new_v4().simple()))
    }
}

impl std::fmt::Display for NoteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NoteId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    /// Raw markdown.
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<TaskId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    pub const UNTITLED: &'static str = "Untitled Note";

    pub fn new(title: &str, content: &str) -> Self {
        let now = Utc::now();
        Self {
            id: NoteId::generate(),
            title: title.to_string(),
            content: content.to_string(),
            task_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            Self::UNTITLED
        } else {
            &self.title
        }
    }
}

impl Record for Note {
    type Id = NoteId;
    const KIND: &'static str = "Note";

    fn id(&self) -> &NoteId {
        &self.id
    }
}
