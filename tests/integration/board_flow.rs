//! Board, notes and dashboard over a file-backed workspace.

use agileflow::board::{Board, TaskDraft};
use agileflow::core::{NoteId, Priority, ProjectId, TaskId, TaskStatus};
use agileflow::dashboard::DashboardStats;
use agileflow::notes::Notebook;
use agileflow::prioritize::{BatchBuilder, PrioritizationResponse, PrioritizedResult};
use agileflow::Error;

use crate::fixtures::{prioritizer, MockGenerator, MockResponse, TestWorkspace};

#[test]
fn test_board_changes_survive_reopen() {
    let ws = TestWorkspace::seeded();
    let board = Board::new(&ws.workspace);

    let added = board
        .add(TaskDraft {
            project_id: Some(ProjectId::from("project-2")),
            priority: Some(Priority::Low),
            ..TaskDraft::titled("Rotate API keys")
        })
        .unwrap();
    board
        .move_task(&TaskId::from("task-2"), TaskStatus::Done)
        .unwrap();
    board.delete(&TaskId::from("task-5")).unwrap();

    let reopened = Board::new(&ws.reopen());
    let stored = reopened.get(&added.id).unwrap();
    assert_eq!(stored, added);
    assert_eq!(
        reopened.get(&TaskId::from("task-2")).unwrap().status,
        TaskStatus::Done
    );
    assert!(matches!(
        reopened.get(&TaskId::from("task-5")),
        Err(Error::NotFound { .. })
    ));

    let columns = reopened.columns().unwrap();
    let counts: Vec<_> = columns.iter().map(|c| c.tasks.len()).collect();
    assert_eq!(counts, vec![3, 0, 2]);
}

/// Test: Prioritize the board and apply
/// Given project-2's open board tasks
/// When the model answers for all of them and the result is applied
/// Then every task carries the new priority after a reopen
#[tokio::test]
async fn test_prioritize_board_and_apply() {
    let ws = TestWorkspace::seeded();
    let board = Board::new(&ws.workspace);
    let project = ws
        .workspace
        .projects
        .get(&ProjectId::from("project-2"))
        .unwrap()
        .unwrap();

    let tasks = board.project_tasks(&project.id).unwrap();
    let request = BatchBuilder::from_tasks(&project, &tasks).try_build().unwrap();
    let ids: Vec<_> = request.ids().collect();
    assert_eq!(ids, vec!["task-2", "task-3", "task-5"]);

    let generator = MockGenerator::answering(MockResponse::prioritized(&[
        ("task-5", "High", "Client demo is the release gate"),
        ("task-3", "Medium", "Auth can slip a week"),
        ("task-2", "Low", "UI polish"),
    ]));
    let response = prioritizer(&generator).prioritize(&request).await.unwrap();
    assert_eq!(board.apply_priorities(&response).unwrap(), 3);

    let reopened = Board::new(&ws.reopen());
    let priority = |id: &str| reopened.get(&TaskId::from(id)).unwrap().priority;
    assert_eq!(priority("task-5"), Some(Priority::High));
    assert_eq!(priority("task-3"), Some(Priority::Medium));
    assert_eq!(priority("task-2"), Some(Priority::Low));
    // Other project untouched.
    assert_eq!(priority("task-1"), Some(Priority::High));
}

/// Test: Apply is all or nothing
/// Given a board whose tasks file cannot be rewritten
/// When a result for three tasks is applied
/// Then the apply fails and no task changes priority, in memory or on disk
#[test]
fn test_failed_apply_changes_no_priority() {
    let ws = TestWorkspace::seeded();
    let board = Board::new(&ws.workspace);
    let before = ws.workspace.tasks.list().unwrap();

    std::fs::create_dir(ws.dir.path().join("tasks.json.tmp")).unwrap();
    let response = PrioritizationResponse {
        prioritized_tasks: ["task-2", "task-3", "task-5"]
            .iter()
            .map(|id| PrioritizedResult {
                id: id.to_string(),
                priority: Priority::Other("Urgent".to_string()),
                reason: "r".to_string(),
            })
            .collect(),
    };

    assert!(matches!(board.apply_priorities(&response), Err(Error::Io(_))));
    assert_eq!(ws.workspace.tasks.list().unwrap(), before);
    assert_eq!(ws.reopen().tasks.list().unwrap(), before);
}

#[tokio::test]
async fn test_failed_prioritization_leaves_board_untouched() {
    let ws = TestWorkspace::seeded();
    let board = Board::new(&ws.workspace);
    let before = board.columns().unwrap();

    let project = ws
        .workspace
        .projects
        .get(&ProjectId::from("project-2"))
        .unwrap()
        .unwrap();
    let tasks = board.project_tasks(&project.id).unwrap();
    let request = BatchBuilder::from_tasks(&project, &tasks).build();

    let generator = MockGenerator::answering(MockResponse::prioritized(&[(
        "task-5", "High", "only one",
    )]));
    let result = prioritizer(&generator).prioritize(&request).await;
    assert!(matches!(result, Err(Error::Generation(_))));

    let after = Board::new(&ws.reopen()).columns().unwrap();
    for (b, a) in before.iter().zip(after.iter()) {
        assert_eq!(b.tasks, a.tasks);
    }
}

#[test]
fn test_dashboard_tracks_board() {
    let ws = TestWorkspace::seeded();
    let board = Board::new(&ws.workspace);
    for id in ["task-1", "task-2", "task-3"] {
        board.move_task(&TaskId::from(id), TaskStatus::Done).unwrap();
    }

    let stats = DashboardStats::compute(&ws.reopen().tasks.list().unwrap());
    assert_eq!(stats.completed, 4);
    assert_eq!(stats.pending, 1);
    assert_eq!(stats.completion_rate, 80);
}

#[test]
fn test_notes_survive_reopen() {
    let ws = TestWorkspace::seeded();
    let notebook = Notebook::new(&ws.workspace);

    let note = notebook
        .create("Retro", "## What went well", Some(TaskId::from("task-4")))
        .unwrap();
    notebook.delete(&NoteId::from("note-2")).unwrap();

    let reopened = Notebook::new(&ws.reopen());
    let notes = reopened.list().unwrap();
    assert_eq!(notes.len(), 2);
    assert_eq!(notes[0].id, note.id);
    assert_eq!(notes[0].task_id, Some(TaskId::from("task-4")));
    assert!(matches!(
        reopened.get(&NoteId::from("note-2")),
        Err(Error::NotFound { .. })
    ));
}
