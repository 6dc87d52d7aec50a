//! Aggregate statistics over the board.

use std::fmt;

use crate::core::{Priority, Task, TaskStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub high_priority: usize,
    /// Whole percent of tasks done, 0 for an empty board.
    pub completion_rate: u32,
    /// Every status in column order, including empty ones.
    pub by_status: Vec<(TaskStatus, usize)>,
    /// Known priorities only, zero counts dropped.
    pub by_priority: Vec<(Priority, usize)>,
}

impl DashboardStats {
    pub fn compute(tasks: &[Task]) -> Self {
        let count = |status: TaskStatus| tasks.iter().filter(|t| t.status == status).count();

        let total = tasks.len();
        let completed = count(TaskStatus::Done);
        let pending = count(TaskStatus::Todo) + count(TaskStatus::InProgress);
        let high_priority = tasks.iter().filter(|t| t.is_high_priority()).count();
        let completion_rate = if total == 0 {
            0
        } else {
            ((completed as f64 / total as f64) * 100.0).round() as u32
        };

        let by_status = TaskStatus::ALL.iter().map(|s| (*s, count(*s))).collect();
        let by_priority = Priority::KNOWN
            .iter()
            .map(|p| {
                let n = tasks
                    .iter()
                    .filter(|t| t.priority.as_ref() == Some(p))
                    .count();
                (p.clone(), n)
            })
            .filter(|(_, n)| *n > 0)
            .collect();

        Self {
            total,
            completed,
            pending,
            high_priority,
            completion_rate,
            by_status,
            by_priority,
        }
    }
}

impl fmt::Display for DashboardStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total tasks:     {}", self.total)?;
        writeln!(
            f,
            "Completed:       {} ({}% completion rate)",
            self.completed, self.completion_rate
        )?;
        writeln!(f, "Pending:         {}", self.pending)?;
        writeln!(f, "High priority:   {}", self.high_priority)?;
        writeln!(f)?;
        writeln!(f, "By status:")?;
        for (status, n) in &self.by_status {
            writeln!(f, "  {:<13} {}", status.title(), n)?;
        }
        writeln!(f, "By priority:")?;
        if self.by_priority.is_empty() {
            writeln!(f, "  (none)")?;
        }
        for (priority, n) in &self.by_priority {
            writeln!(f, "  {:<13} {}", priority.as_str(), n)?;
        }
        Ok(())
    }
}
