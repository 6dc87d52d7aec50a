//! Prioritization output and its reconciliation with the request.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::request::PrioritizationRequest;
use crate::core::Priority;
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrioritizedResult {
    pub id: String,
    pub priority: Priority,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrioritizationResponse {
    pub prioritized_tasks: Vec<PrioritizedResult>,
}

impl PrioritizationResponse {
    /// Check that the response answers exactly the tasks that were asked about.
    ///
    /// Order is irrelevant. Duplicate ids are rejected because they cannot be
    /// matched back to a single task.
    ///
    /// # Errors
    /// `Error::Generation` naming the duplicated, missing, or unknown ids.
    pub fn reconcile(&self, request: &PrioritizationRequest) -> Result<()> {
        let mut seen = HashSet::new();
        let duplicates: Vec<&str> = self
            .prioritized_tasks
            .iter()
            .map(|r| r.id.as_str())
            .filter(|id| !seen.insert(*id))
            .collect();
        if !duplicates.is_empty() {
            return Err(Error::Generation(format!(
                "response lists tasks more than once: {}",
                duplicates.join(", ")
            )));
        }

        let requested: HashSet<&str> = request.ids().collect();
        let missing: Vec<&str> = request.ids().filter(|id| !seen.contains(id)).collect();
        if !missing.is_empty() {
            return Err(Error::Generation(format!(
                "response is missing tasks: {}",
                missing.join(", ")
            )));
        }

        let unknown: Vec<&str> = self
            .prioritized_tasks
            .iter()
            .map(|r| r.id.as_str())
            .filter(|id| !requested.contains(id))
            .collect();
        if !unknown.is_empty() {
            return Err(Error::Generation(format!(
                "response contains unknown tasks: {}",
                unknown.join(", ")
            )));
        }

        Ok(())
    }

    /// Results joined with their descriptions, highest priority first.
    ///
    /// The sort is stable, so equal priorities keep the model's order.
    pub fn ranked(&self, request: &PrioritizationRequest) -> Vec<RankedTask> {
        let descriptions: HashMap<&str, &str> = request
            .tasks
            .iter()
            .map(|t| (t.id.as_str(), t.description.as_str()))
            .collect();

        let mut ranked: Vec<RankedTask> = self
            .prioritized_tasks
            .iter()
            .map(|r| RankedTask {
                title: descriptions
                    .get(r.id.as_str())
                    .filter(|d| !d.trim().is_empty())
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| format!("Task ID: {}", r.id)),
                result: r.clone(),
            })
            .collect();
        ranked.sort_by(|a, b| a.result.priority.cmp_rank(&b.result.priority));
        ranked
    }
}

/// A result ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedTask {
    pub title: String,
    pub result: PrioritizedResult,
}

impl fmt::Display for RankedTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}\n    Reason: {}",
            self.result.priority, self.title, self.result.reason
        )
    }
}
