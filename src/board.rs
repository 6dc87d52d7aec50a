//! Kanban board over the task repository.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::core::{Priority, Project, ProjectId, Task, TaskId, TaskStatus, UserId};
use crate::prioritize::PrioritizationResponse;
use crate::store::{Repository, Workspace};
use crate::{aflog, aflog_debug, Error, Result};

/// One board column.
#[derive(Debug, Clone)]
pub struct Column {
    pub status: TaskStatus,
    pub title: &'static str,
    pub tasks: Vec<Task>,
}

/// Editable task fields, as entered in a task form.
#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: Option<Priority>,
    pub assignee_id: Option<UserId>,
    pub due_date: Option<DateTime<Utc>>,
    pub project_id: Option<ProjectId>,
    pub project_goals: Option<String>,
}

impl TaskDraft {
    pub fn titled(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..Self::default()
        }
    }

    /// Draft pre-filled from an existing task, for editing.
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.status,
            priority: task.priority.clone(),
            assignee_id: task.assignee_id.clone(),
            due_date: task.due_date,
            project_id: task.project_id.clone(),
            project_goals: task.project_goals.clone(),
        }
    }
}

#[derive(Clone)]
pub struct Board {
    tasks: Arc<dyn Repository<Task>>,
    projects: Arc<dyn Repository<Project>>,
}

impl Board {
    pub fn new(workspace: &Workspace) -> Self {
        Self {
            tasks: Arc::clone(&workspace.tasks),
            projects: Arc::clone(&workspace.projects),
        }
    }

    /// All tasks grouped by status, in column order.
    pub fn columns(&self) -> Result<Vec<Column>> {
        let tasks = self.tasks.list()?;
        Ok(TaskStatus::ALL
            .iter()
            .map(|status| Column {
                status: *status,
                title: status.title(),
                tasks: tasks.iter().filter(|t| t.status == *status).cloned().collect(),
            })
            .collect())
    }

    pub fn get(&self, id: &TaskId) -> Result<Task> {
        self.tasks
            .get(id)?
            .ok_or_else(|| Error::not_found("Task", id))
    }

    /// Tasks belonging to `project`, in board order.
    pub fn project_tasks(&self, project: &ProjectId) -> Result<Vec<Task>> {
        Ok(self
            .tasks
            .list()?
            .into_iter()
            .filter(|t| t.project_id.as_ref() == Some(project))
            .collect())
    }

    /// Create a task from a draft.
    ///
    /// # Errors
    /// `Error::Validation` if the title is blank, `Error::NotFound` if the
    /// draft names a project that does not exist.
    pub fn add(&self, draft: TaskDraft) -> Result<Task> {
        let draft = self.normalize(draft)?;
        let mut task = Task::new(draft.title.trim());
        apply_draft(&mut task, draft);
        task.priority.get_or_insert_with(Priority::default);
        task.updated_at = task.created_at;

        self.tasks.save(task.clone())?;
        aflog!("Added task {} ({})", task.id, task.title);
        Ok(task)
    }

    /// Replace the editable fields of an existing task.
    pub fn edit(&self, id: &TaskId, draft: TaskDraft) -> Result<Task> {
        let draft = self.normalize(draft)?;
        let mut draft = Some(draft);
        let task = self.tasks.update(id, &mut |task: &mut Task| {
            if let Some(draft) = draft.take() {
                apply_draft(task, draft);
                task.touch();
            }
        })?;
        aflog_debug!("Edited task {}", task.id);
        Ok(task)
    }

    pub fn move_task(&self, id: &TaskId, status: TaskStatus) -> Result<Task> {
        let task = self.tasks.update(id, &mut |task: &mut Task| task.set_status(status))?;
        aflog_debug!("Moved task {} to {}", task.id, status);
        Ok(task)
    }

    pub fn delete(&self, id: &TaskId) -> Result<()> {
        if !self.tasks.delete(id)? {
            return Err(Error::not_found("Task", id));
        }
        aflog!("Deleted task {}", id);
        Ok(())
    }

    /// Write prioritization results onto the matching board tasks.
    ///
    /// Ids that are not on the board (ad-hoc batch rows) are skipped. All
    /// matching tasks are stored in one `save_all`, so either every priority
    /// lands or none does. Returns the number of tasks updated.
    pub fn apply_priorities(&self, response: &PrioritizationResponse) -> Result<usize> {
        let by_id: HashMap<&str, &Priority> = response
            .prioritized_tasks
            .iter()
            .map(|r| (r.id.as_str(), &r.priority))
            .collect();

        let updated: Vec<Task> = self
            .tasks
            .list()?
            .into_iter()
            .filter_map(|mut task| {
                let priority = by_id.get(task.id.as_str())?;
                task.set_priority((*priority).clone());
                Some(task)
            })
            .collect();

        let applied = updated.len();
        self.tasks.save_all(updated)?;
        aflog!("Applied priorities to {} board task(s)", applied);
        Ok(applied)
    }

    fn normalize(&self, mut draft: TaskDraft) -> Result<TaskDraft> {
        if draft.title.trim().is_empty() {
            return Err(Error::Validation("Title is required".to_string()));
        }
        draft.title = draft.title.trim().to_string();

        let goals_blank = draft
            .project_goals
            .as_deref()
            .map_or(true, |g| g.trim().is_empty());
        if let Some(project_id) = &draft.project_id {
            let project = self
                .projects
                .get(project_id)?
                .ok_or_else(|| Error::not_found("Project", project_id))?;
            if goals_blank {
                draft.project_goals = Some(project.goals);
            }
        }
        Ok(draft)
    }
}

fn apply_draft(task: &mut Task, draft: TaskDraft) {
    task.title = draft.title;
    task.description = draft.description.filter(|d| !d.trim().is_empty());
    task.status = draft.status;
    task.priority = draft.priority.or_else(|| task.priority.take());
    task.assignee_id = draft.assignee_id;
    task.due_date = draft.due_date;
    task.project_id = draft.project_id;
    task.project_goals = draft.project_goals;
}
