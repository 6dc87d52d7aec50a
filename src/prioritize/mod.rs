//! AI-assisted task prioritization.
//!
//! A [`PrioritizationRequest`] is validated, rendered into a prompt, sent to
//! a [`Generator`], and the answer is checked against the request before it
//! is handed back as a [`PrioritizationResponse`].

pub mod claude;
pub mod generator;
pub mod prioritizer;
pub mod prompt;
pub mod request;
pub mod response;

pub use claude::ClaudeHeadless;
pub use generator::{check_schema, extract_json, Generator};
pub use prioritizer::Prioritizer;
pub use request::{BatchBuilder, BatchEntry, GoalsPolicy, PrioritizationRequest, TaskDescriptor, NO_DEADLINE};
pub use response::{PrioritizationResponse, PrioritizedResult, RankedTask};
