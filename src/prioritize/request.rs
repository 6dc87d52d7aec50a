//! Prioritization input: task descriptors, the request batch, and a builder.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::{Project, Task};
use crate::{Error, Result};

/// Deadline placeholder for board tasks that have no due date.
pub const NO_DEADLINE: &str = "none";

/// How the batch-level goal statement is derived from the descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalsPolicy {
    /// Every descriptor must carry identical goals.
    #[default]
    Uniform,
    /// Use the first descriptor's goals and ignore the rest.
    FirstTask,
}

/// One task as the model sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDescriptor {
    pub id: String,
    pub description: String,
    /// Forwarded verbatim into the prompt; expected to be ISO-8601.
    pub deadline: String,
    pub project_goals: String,
}

impl TaskDescriptor {
    pub fn new(id: &str, description: &str, deadline: &str, project_goals: &str) -> Self {
        Self {
            id: id.to_string(),
            description: description.to_string(),
            deadline: deadline.to_string(),
            project_goals: project_goals.to_string(),
        }
    }

    /// Describe a board task. The description falls back to the title and a
    /// missing due date becomes [`NO_DEADLINE`].
    pub fn from_task(task: &Task, project_goals: &str) -> Self {
        Self {
            id: task.id.to_string(),
            description: task.summary().to_string(),
            deadline: task
                .due_date
                .map(|d| d.to_rfc3339())
                .unwrap_or_else(|| NO_DEADLINE.to_string()),
            project_goals: project_goals.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrioritizationRequest {
    pub tasks: Vec<TaskDescriptor>,
}

impl PrioritizationRequest {
    pub fn new(tasks: Vec<TaskDescriptor>) -> Self {
        Self { tasks }
    }

    /// Check the batch before anything is sent out.
    ///
    /// # Errors
    /// `Error::Validation` for an empty batch, a blank or duplicated id, or
    /// (under [`GoalsPolicy::Uniform`]) descriptors that disagree on goals.
    pub fn validate(&self, policy: GoalsPolicy) -> Result<()> {
        if self.tasks.is_empty() {
            return Err(Error::Validation(
                "at least one task is required".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for (index, task) in self.tasks.iter().enumerate() {
            if task.id.trim().is_empty() {
                return Err(Error::Validation(format!(
                    "task #{} has an empty id",
                    index + 1
                )));
            }
            if !seen.insert(task.id.as_str()) {
                return Err(Error::Validation(format!(
                    "duplicate task id: {}",
                    task.id
                )));
            }
        }

        if policy == GoalsPolicy::Uniform {
            let first = &self.tasks[0].project_goals;
            if let Some(other) = self.tasks.iter().find(|t| &t.project_goals != first) {
                return Err(Error::Validation(format!(
                    "task {} has different project goals than task {}",
                    other.id, self.tasks[0].id
                )));
            }
        }

        Ok(())
    }

    /// The goal statement the prompt is built around.
    ///
    /// Both policies read the first descriptor; `validate` is what enforces
    /// that the others agree under `Uniform`.
    pub fn project_goals(&self) -> &str {
        self.tasks
            .first()
            .map(|t| t.project_goals.as_str())
            .unwrap_or_default()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.tasks.iter().map(|t| t.id.as_str())
    }
}

/// One row of a batch being assembled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchEntry {
    pub id: String,
    pub description: String,
    pub deadline: String,
}

impl BatchEntry {
    fn blank() -> Self {
        Self {
            id: format!("temp-{}", Uuid::new_v4().simple()),
            description: String::new(),
            deadline: String::new(),
        }
    }
}

/// Assembles a request from a goal statement and a list of task rows.
///
/// The builder always holds at least one row. Goals are set once for the
/// whole batch and stamped onto every descriptor by [`BatchBuilder::build`].
#[derive(Debug, Clone)]
pub struct BatchBuilder {
    goals: String,
    entries: Vec<BatchEntry>,
}

impl Default for BatchBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchBuilder {
    pub fn new() -> Self {
        Self {
            goals: String::new(),
            entries: vec![BatchEntry::blank()],
        }
    }

    /// Start from a project's goals and its open board tasks.
    pub fn from_tasks<'a>(project: &Project, tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        let entries: Vec<BatchEntry> = tasks
            .into_iter()
            .filter(|t| t.status.is_open())
            .map(|t| {
                let d = TaskDescriptor::from_task(t, &project.goals);
                BatchEntry {
                    id: d.id,
                    description: d.description,
                    deadline: d.deadline,
                }
            })
            .collect();

        let mut builder = Self::new().goals(&project.goals);
        if !entries.is_empty() {
            builder.entries = entries;
        }
        builder
    }

    pub fn goals(mut self, goals: &str) -> Self {
        self.goals = goals.to_string();
        self
    }

    /// Fill the first blank row, or append a new one.
    pub fn add(mut self, description: &str, deadline: &str) -> Self {
        let index = match self
            .entries
            .iter()
            .position(|e| e.description.is_empty() && e.deadline.is_empty())
        {
            Some(index) => index,
            None => {
                self.entries.push(BatchEntry::blank());
                self.entries.len() - 1
            }
        };
        let slot = &mut self.entries[index];
        slot.description = description.to_string();
        slot.deadline = deadline.to_string();
        self
    }

    /// Drop a row. The last remaining row is never removed.
    pub fn remove(mut self, index: usize) -> Self {
        if self.entries.len() > 1 && index < self.entries.len() {
            self.entries.remove(index);
        }
        self
    }

    pub fn entries(&self) -> &[BatchEntry] {
        &self.entries
    }

    /// Build, rejecting what a task form would not submit: blank goals and
    /// rows missing a description or deadline.
    ///
    /// # Errors
    /// `Error::Validation` naming the first incomplete field.
    pub fn try_build(self) -> Result<PrioritizationRequest> {
        if self.goals.trim().is_empty() {
            return Err(Error::Validation("project goals are required".to_string()));
        }
        for (index, entry) in self.entries.iter().enumerate() {
            if entry.description.trim().is_empty() {
                return Err(Error::Validation(format!(
                    "task #{} needs a description",
                    index + 1
                )));
            }
            if entry.deadline.trim().is_empty() {
                return Err(Error::Validation(format!(
                    "task #{} needs a deadline",
                    index + 1
                )));
            }
        }
        Ok(self.build())
    }

    pub fn build(self) -> PrioritizationRequest {
        let goals = self.goals;
        PrioritizationRequest::new(
            self.entries
                .into_iter()
                .map(|e| TaskDescriptor {
                    id: e.id,
                    description: e.description,
                    deadline: e.deadline,
                    project_goals: goals.clone(),
                })
                .collect(),
        )
    }
}
