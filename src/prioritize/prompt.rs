//! Prompt template and output schema for the prioritization call.

use serde_json::{json, Value};

use super::request::PrioritizationRequest;

const PREAMBLE: &str = "You are a project management assistant. \
Prioritize the following tasks based on their deadlines and project goals.";

const INSTRUCTIONS: &str = "Prioritize the tasks considering the project goals and deadlines. \
Return a priority (High, Medium, or Low) and a reason for each task.
Make sure that ALL tasks are returned, each exactly once, using the IDs given above.";

/// Render the prompt for a validated request.
///
/// Goals are stated once, every task is listed by id, description and
/// deadline, and the answer is pinned to the JSON shape of
/// [`output_schema`].
pub fn render(request: &PrioritizationRequest, schema: &Value) -> String {
    let mut prompt = String::new();
    prompt.push_str(PREAMBLE);
    prompt.push_str("\n\nProject Goals: ");
    prompt.push_str(request.project_goals());
    prompt.push_str("\n\nTasks:\n");
    for task in &request.tasks {
        prompt.push_str(&format!(
            "- ID: {}\n  Description: {}\n  Deadline: {}\n",
            task.id, task.description, task.deadline
        ));
    }
    prompt.push('\n');
    prompt.push_str(INSTRUCTIONS);
    prompt.push_str(
        "\n\nOutput should be a single JSON object and nothing else, \
         matching this JSON Schema:\n",
    );
    // A json! value always serializes; fall back to compact form regardless.
    let schema_text = serde_json::to_string_pretty(schema).unwrap_or_else(|_| schema.to_string());
    prompt.push_str(&schema_text);
    prompt.push('\n');
    prompt
}

/// JSON Schema of [`super::PrioritizationResponse`].
///
/// `priority` is deliberately an open string; the enumeration is only a hint
/// in the description.
pub fn output_schema() -> Value {
    json!({
        "type": "object",
        "required": ["prioritizedTasks"],
        "properties": {
            "prioritizedTasks": {
                "type": "array",
                "description": "List of tasks with assigned priorities and reasons.",
                "items": {
                    "type": "object",
                    "required": ["id", "priority", "reason"],
                    "properties": {
                        "id": {
                            "type": "string",
                            "description": "The id of the task"
                        },
                        "priority": {
                            "type": "string",
                            "description": "The priority of the task, which could be High, Medium, or Low. Consider project goals and deadlines."
                        },
                        "reason": {
                            "type": "string",
                            "description": "The reason for the assigned priority."
                        }
                    }
                }
            }
        }
    })
}
