//! Markdown notes, optionally linked to a task.

use std::sync::Arc;

use chrono::Utc;

use crate::core::{Note, NoteId, TaskId};
use crate::store::{Repository, Workspace};
use crate::{aflog, Error, Result};

#[derive(Clone)]
pub struct Notebook {
    notes: Arc<dyn Repository<Note>>,
}

impl Notebook {
    pub fn new(workspace: &Workspace) -> Self {
        Self {
            notes: Arc::clone(&workspace.notes),
        }
    }

    /// Newest first.
    pub fn list(&self) -> Result<Vec<Note>> {
        let mut notes = self.notes.list()?;
        notes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(notes)
    }

    pub fn get(&self, id: &NoteId) -> Result<Note> {
        self.notes
            .get(id)?
            .ok_or_else(|| Error::not_found("Note", id))
    }

    pub fn create(&self, title: &str, content: &str, task_id: Option<TaskId>) -> Result<Note> {
        let mut note = Note::new(title.trim(), content);
        note.task_id = task_id;
        self.notes.save(note.clone())?;
        aflog!("Created note {} ({})", note.id, note.display_title());
        Ok(note)
    }

    pub fn update(&self, id: &NoteId, title: &str, content: &str) -> Result<Note> {
        self.notes.update(id, &mut |note: &mut Note| {
            note.title = title.trim().to_string();
            note.content = content.to_string();
            note.updated_at = Utc::now();
        })
    }

    pub fn delete(&self, id: &NoteId) -> Result<()> {
        if !self.notes.delete(id)? {
            return Err(Error::not_found("Note", id));
        }
        aflog!("Deleted note {}", id);
        Ok(())
    }
}
