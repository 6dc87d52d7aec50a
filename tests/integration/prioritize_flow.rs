//! Prioritization flow tests.
//!
//! A request goes through validation, prompt rendering and the generator,
//! and the answer must cover exactly the requested ids.

use std::collections::HashSet;
use std::sync::Arc;

use agileflow::core::Priority;
use agileflow::prioritize::{
    GoalsPolicy, PrioritizationRequest, PrioritizationResponse, PrioritizedResult, Prioritizer,
    TaskDescriptor,
};
use agileflow::Error;

use crate::fixtures::{
    prioritizer, request_with_ids, ship_v2_request, unreachable_claude, MockGenerator,
    MockResponse,
};

/// Test: Round trip
/// Given one task and a model answering High for it
/// When the batch is prioritized
/// Then the answer comes back exactly as the model gave it
#[tokio::test]
async fn test_round_trip_returns_answer_unchanged() {
    let generator = MockGenerator::answering(MockResponse::prioritized(&[(
        "t1",
        "High",
        "Near deadline, blocks release",
    )]));

    let response = prioritizer(&generator)
        .prioritize(&ship_v2_request())
        .await
        .unwrap();

    assert_eq!(
        response,
        PrioritizationResponse {
            prioritized_tasks: vec![PrioritizedResult {
                id: "t1".to_string(),
                priority: Priority::High,
                reason: "Near deadline, blocks release".to_string(),
            }],
        }
    );
    assert_eq!(
        serde_json::to_value(&response).unwrap(),
        serde_json::json!({"prioritizedTasks": [
            {"id": "t1", "priority": "High", "reason": "Near deadline, blocks release"}
        ]})
    );
    assert_eq!(generator.calls(), 1);
}

#[tokio::test]
async fn test_prompt_carries_goals_and_every_task() {
    let generator = MockGenerator::answering(MockResponse::prioritized(&[("t1", "High", "r")]));
    prioritizer(&generator)
        .prioritize(&ship_v2_request())
        .await
        .unwrap();

    let prompt = generator.last_prompt().unwrap();
    assert_eq!(prompt.matches("Ship v2").count(), 1);
    assert!(prompt.contains("ID: t1"));
    assert!(prompt.contains("Description: Write tests"));
    assert!(prompt.contains("Deadline: 2025-01-10T00:00:00Z"));
}

/// Test: Id set
/// Given five tasks and an answer listing them in a different order
/// Then the result ids equal the request ids
#[tokio::test]
async fn test_result_ids_equal_request_ids() {
    let request = request_with_ids(&["a", "b", "c", "d", "e"]);
    let generator = MockGenerator::answering(MockResponse::prioritized(&[
        ("e", "Low", "r"),
        ("c", "High", "r"),
        ("a", "medium", "r"),
        ("d", "Someday", "r"),
        ("b", "HIGH", "r"),
    ]));

    let response = prioritizer(&generator).prioritize(&request).await.unwrap();

    let requested: HashSet<&str> = request.ids().collect();
    let answered: HashSet<&str> = response
        .prioritized_tasks
        .iter()
        .map(|r| r.id.as_str())
        .collect();
    assert_eq!(requested, answered);

    let ranked: Vec<_> = response
        .ranked(&request)
        .into_iter()
        .map(|r| r.result.id)
        .collect();
    assert_eq!(ranked, vec!["c", "b", "a", "e", "d"]);
}

/// Test: Priority strings
/// Given an answer with padded or oddly cased known priorities and one unknown
/// Then known priorities come back canonical and the unknown one verbatim
#[tokio::test]
async fn test_known_priorities_are_canonicalized() {
    let generator = MockGenerator::answering(MockResponse::prioritized(&[
        ("a", " high ", "r"),
        ("b", "LOW", "r"),
        ("c", "Whenever ", "r"),
    ]));

    let response = prioritizer(&generator)
        .prioritize(&request_with_ids(&["a", "b", "c"]))
        .await
        .unwrap();

    assert_eq!(
        serde_json::to_value(&response).unwrap(),
        serde_json::json!({"prioritizedTasks": [
            {"id": "a", "priority": "High", "reason": "r"},
            {"id": "b", "priority": "Low", "reason": "r"},
            {"id": "c", "priority": "Whenever ", "reason": "r"}
        ]})
    );
}

#[tokio::test]
async fn test_missing_ids_are_generation_errors() {
    let generator = MockGenerator::answering(MockResponse::prioritized(&[("a", "High", "r")]));
    let err = prioritizer(&generator)
        .prioritize(&request_with_ids(&["a", "b"]))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Generation(ref m) if m.contains("missing tasks: b")));
}

#[tokio::test]
async fn test_unknown_ids_are_generation_errors() {
    let generator = MockGenerator::answering(MockResponse::prioritized(&[
        ("a", "High", "r"),
        ("made-up", "Low", "r"),
    ]));
    let err = prioritizer(&generator)
        .prioritize(&request_with_ids(&["a"]))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Generation(ref m) if m.contains("unknown tasks: made-up")));
}

#[tokio::test]
async fn test_duplicate_response_ids_are_generation_errors() {
    let generator = MockGenerator::answering(MockResponse::prioritized(&[
        ("a", "High", "r"),
        ("a", "Low", "r"),
    ]));
    let err = prioritizer(&generator)
        .prioritize(&request_with_ids(&["a"]))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Generation(_)));
}

/// Test: Unreachable service
/// Given a claude binary that does not exist
/// Then prioritization fails with a generation error and no result
#[tokio::test]
async fn test_unreachable_service_is_generation_error() {
    let prioritizer = Prioritizer::new(Arc::new(unreachable_claude()));
    let err = prioritizer
        .prioritize(&ship_v2_request())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Generation(_)));
}

#[tokio::test]
async fn test_generator_failure_is_passed_through() {
    let generator = MockGenerator::answering(MockResponse::Fail("rate limited".to_string()));
    let err = prioritizer(&generator)
        .prioritize(&ship_v2_request())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Generation(ref m) if m == "rate limited"));
}

#[tokio::test]
async fn test_empty_answer_is_empty_result() {
    let generator = MockGenerator::answering(MockResponse::Empty);
    let err = prioritizer(&generator)
        .prioritize(&ship_v2_request())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::EmptyResult));
}

#[tokio::test]
async fn test_wrongly_typed_answer_is_generation_error() {
    let generator = MockGenerator::answering(MockResponse::Json(serde_json::json!({
        "prioritizedTasks": [{"id": "t1", "priority": "High"}]
    })));
    let err = prioritizer(&generator)
        .prioritize(&ship_v2_request())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Generation(ref m) if m.contains("reason")));
}

/// Test: Empty batch
/// Given no tasks
/// Then validation fails and the generator is never called
#[tokio::test]
async fn test_empty_batch_never_reaches_generator() {
    let generator = MockGenerator::answering(MockResponse::Empty);
    let err = prioritizer(&generator)
        .prioritize(&PrioritizationRequest::new(vec![]))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn test_duplicate_request_ids_never_reach_generator() {
    let generator = MockGenerator::answering(MockResponse::Empty);
    let request = PrioritizationRequest::new(vec![
        TaskDescriptor::new("t1", "a", "2025-01-10", "Ship v2"),
        TaskDescriptor::new("t1", "b", "2025-01-11", "Ship v2"),
    ]);
    let err = prioritizer(&generator)
        .prioritize(&request)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn test_mixed_goals_depend_on_policy() {
    let request = PrioritizationRequest::new(vec![
        TaskDescriptor::new("t1", "a", "2025-01-10", "Ship v2"),
        TaskDescriptor::new("t2", "b", "2025-01-11", "Cut costs"),
    ]);
    let generator = MockGenerator::answering(MockResponse::prioritized(&[
        ("t1", "High", "r"),
        ("t2", "Low", "r"),
    ]));

    let uniform = prioritizer(&generator).prioritize(&request).await;
    assert!(matches!(uniform, Err(Error::Validation(_))));
    assert_eq!(generator.calls(), 0);

    let first_task = prioritizer(&generator)
        .with_goals_policy(GoalsPolicy::FirstTask)
        .prioritize(&request)
        .await
        .unwrap();
    assert_eq!(first_task.prioritized_tasks.len(), 2);
    let prompt = generator.last_prompt().unwrap();
    assert!(prompt.contains("Project Goals: Ship v2"));
    assert!(!prompt.contains("Cut costs"));
}

#[cfg(unix)]
mod claude_cli {
    use super::*;
    use std::time::Duration;

    use crate::fixtures::{claude_envelope, fake_claude, slow_claude};
    use agileflow::prioritize::ClaudeHeadless;
    use tempfile::TempDir;

    /// Test: Fenced output through the CLI
    /// Given a claude CLI whose result wraps the JSON in a ```json fence
    /// Then the fenced payload is extracted and reconciled
    #[tokio::test]
    async fn test_fenced_output_from_cli() {
        let dir = TempDir::new().unwrap();
        let output = "Here is the prioritization:\n```json\n{\"prioritizedTasks\": [{\"id\": \"t1\", \"priority\": \"High\", \"reason\": \"Near deadline, blocks release\"}]}\n```";
        let binary = fake_claude(&dir, &claude_envelope(output));

        let prioritizer = Prioritizer::new(Arc::new(ClaudeHeadless::with_binary(binary)));
        let response = prioritizer.prioritize(&ship_v2_request()).await.unwrap();

        assert_eq!(response.prioritized_tasks.len(), 1);
        assert_eq!(response.prioritized_tasks[0].priority, Priority::High);
        assert_eq!(
            response.prioritized_tasks[0].reason,
            "Near deadline, blocks release"
        );
    }

    #[tokio::test]
    async fn test_cli_error_envelope_is_generation_error() {
        let dir = TempDir::new().unwrap();
        let envelope = r#"{"type": "result", "subtype": "error_during_execution", "is_error": true, "result": "API overloaded"}"#;
        let binary = fake_claude(&dir, envelope);

        let prioritizer = Prioritizer::new(Arc::new(ClaudeHeadless::with_binary(binary)));
        let err = prioritizer
            .prioritize(&ship_v2_request())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Generation(ref m) if m == "API overloaded"));
    }

    #[tokio::test]
    async fn test_cli_prose_answer_is_generation_error() {
        let dir = TempDir::new().unwrap();
        let binary = fake_claude(&dir, &claude_envelope("Sorry, I can't help with that."));

        let prioritizer = Prioritizer::new(Arc::new(ClaudeHeadless::with_binary(binary)));
        let err = prioritizer
            .prioritize(&ship_v2_request())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Generation(_)));
    }

    /// Test: Bare JSON answer
    /// Given a claude CLI that prints the model's JSON without an envelope
    /// Then the payload itself is used as the answer
    #[tokio::test]
    async fn test_bare_json_output_from_cli() {
        let dir = TempDir::new().unwrap();
        let binary = fake_claude(
            &dir,
            r#"{"prioritizedTasks":[{"id":"t1","priority":"High","reason":"r"}]}"#,
        );

        let prioritizer = Prioritizer::new(Arc::new(ClaudeHeadless::with_binary(binary)));
        let response = prioritizer.prioritize(&ship_v2_request()).await.unwrap();

        assert_eq!(response.prioritized_tasks.len(), 1);
        assert_eq!(response.prioritized_tasks[0].id, "t1");
        assert_eq!(response.prioritized_tasks[0].priority, Priority::High);
    }

    /// Test: Timeout
    /// Given a claude CLI that sleeps past the client's timeout
    /// Then prioritization fails with a generation error naming the timeout
    #[tokio::test]
    async fn test_slow_cli_times_out() {
        let dir = TempDir::new().unwrap();
        let claude =
            ClaudeHeadless::with_binary(slow_claude(&dir)).with_timeout(Duration::from_millis(200));

        let prioritizer = Prioritizer::new(Arc::new(claude));
        let err = prioritizer
            .prioritize(&ship_v2_request())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Generation(ref m) if m == "timed out after 200ms"));
    }
}
