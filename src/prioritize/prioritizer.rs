use std::sync::Arc;

use super::generator::{check_schema, Generator};
use super::prompt;
use super::request::{GoalsPolicy, PrioritizationRequest};
use super::response::PrioritizationResponse;
use crate::{aflog, aflog_debug, aflog_error, aflog_warn, Error, Result};

/// Runs one prioritization request against a [`Generator`].
///
/// A request is validated before the generator is touched, and the answer
/// is only returned once every requested id appears in it exactly once.
#[derive(Clone)]
pub struct Prioritizer {
    generator: Arc<dyn Generator>,
    goals_policy: GoalsPolicy,
}

impl Prioritizer {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self {
            generator,
            goals_policy: GoalsPolicy::default(),
        }
    }

    pub fn with_goals_policy(mut self, policy: GoalsPolicy) -> Self {
        self.goals_policy = policy;
        self
    }

    pub fn goals_policy(&self) -> GoalsPolicy {
        self.goals_policy
    }

    /// # Errors
    /// - `Error::Validation` for a malformed request; no call is made.
    /// - `Error::Generation` if the generator fails or answers with the
    ///   wrong shape or the wrong set of ids.
    /// - `Error::EmptyResult` if it answers with nothing.
    pub async fn prioritize(
        &self,
        request: &PrioritizationRequest,
    ) -> Result<PrioritizationResponse> {
        request.validate(self.goals_policy)?;

        let schema = prompt::output_schema();
        let prompt = prompt::render(request, &schema);
        aflog!(
            "Prioritizing {} task(s), goals_policy={:?}",
            request.tasks.len(),
            self.goals_policy
        );
        aflog_debug!("Prompt:\n{}", prompt);

        let value = match self.generator.generate(&prompt, &schema).await {
            Ok(Some(value)) => value,
            Ok(None) => {
                aflog_error!("Generator returned no output");
                return Err(Error::EmptyResult);
            }
            Err(e) => {
                aflog_error!("Generator failed: {}", e);
                return Err(match e {
                    Error::Generation(_) | Error::EmptyResult => e,
                    other => Error::Generation(other.to_string()),
                });
            }
        };

        check_schema(&schema, &value)?;
        let response: PrioritizationResponse = serde_json::from_value(value)
            .map_err(|e| Error::Generation(format!("malformed prioritization output: {}", e)))?;

        if let Err(e) = response.reconcile(request) {
            aflog_error!("Rejected prioritization output: {}", e);
            return Err(e);
        }

        for result in response
            .prioritized_tasks
            .iter()
            .filter(|r| !r.priority.is_known())
        {
            aflog_warn!(
                "Task {} has unrecognized priority {:?}; ranking it last",
                result.id,
                result.priority.as_str()
            );
        }

        aflog!(
            "Prioritized {} task(s)",
            response.prioritized_tasks.len()
        );
        Ok(response)
    }
}
