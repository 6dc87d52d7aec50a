//! Demo data for fresh workspaces.

use chrono::{Duration, Utc};

use crate::core::{Note, NoteId, Priority, Project, Task, TaskId, TaskStatus, User};

pub fn users() -> Vec<User> {
    [
        ("user-1", "Alice Wonderland"),
        ("user-2", "Bob The Builder"),
        ("user-3", "Charlie Chaplin"),
    ]
    .into_iter()
    .map(|(id, name)| User {
        id: id.into(),
        name: name.to_string(),
        avatar_url: Some("https://placehold.co/100x100.png".to_string()),
    })
    .collect()
}

pub fn projects() -> Vec<Project> {
    vec![
        Project {
            id: "project-1".into(),
            name: "DevOps Pipeline Enhancement".to_string(),
            goals: "Streamline CI/CD, reduce deployment time by 20%, improve monitoring."
                .to_string(),
        },
        Project {
            id: "project-2".into(),
            name: "Q4 Feature Release".to_string(),
            goals: "Launch new user authentication, revamp dashboard UI, integrate third-party API."
                .to_string(),
        },
    ]
}

struct SeedTask {
    id: &'static str,
    title: &'static str,
    description: &'static str,
    status: TaskStatus,
    priority: Priority,
    assignee: Option<&'static str>,
    due_in_days: Option<i64>,
    project: usize,
}

/// Demo tasks. Due dates are relative to now, one of them already overdue.
pub fn tasks() -> Vec<Task> {
    let projects = projects();
    let now = Utc::now();
    let seeds = [
        SeedTask {
            id: "task-1",
            title: "Setup Jenkins CI Server",
            description: "Install and configure Jenkins on a new EC2 instance for project Alpha.",
            status: TaskStatus::Todo,
            priority: Priority::High,
            assignee: Some("user-1"),
            due_in_days: Some(7),
            project: 0,
        },
        SeedTask {
            id: "task-2",
            title: "Design New Dashboard UI",
            description: "Create Figma mockups for the revamped user dashboard.",
            status: TaskStatus::InProgress,
            priority: Priority::Medium,
            assignee: Some("user-2"),
            due_in_days: Some(14),
            project: 1,
        },
        SeedTask {
            id: "task-3",
            title: "Write Unit Tests for Auth Module",
            description: "Ensure 90% test coverage for the new authentication service.",
            status: TaskStatus::Todo,
            priority: Priority::High,
            assignee: Some("user-3"),
            due_in_days: Some(5),
            project: 1,
        },
        SeedTask {
            id: "task-4",
            title: "Deploy Staging Environment",
            description: "Push the latest build to the staging servers for QA testing.",
            status: TaskStatus::Done,
            priority: Priority::Medium,
            assignee: Some("user-1"),
            due_in_days: Some(-2),
            project: 0,
        },
        SeedTask {
            id: "task-5",
            title: "Client Demo Preparation",
            description: "Prepare slides and demo script for Q4 feature presentation.",
            status: TaskStatus::Todo,
            priority: Priority::Low,
            assignee: None,
            due_in_days: None,
            project: 1,
        },
    ];

    seeds
        .into_iter()
        .map(|s| {
            let project = &projects[s.project];
            Task {
                id: TaskId::from(s.id),
                title: s.title.to_string(),
                description: Some(s.description.to_string()),
                status: s.status,
                priority: Some(s.priority),
                assignee_id: s.assignee.map(Into::into),
                due_date: s.due_in_days.map(|d| now + Duration::days(d)),
                project_id: Some(project.id.clone()),
                project_goals: Some(project.goals.clone()),
                created_at: now,
                updated_at: now,
            }
        })
        .collect()
}

pub fn notes() -> Vec<Note> {
    let now = Utc::now();
    vec![
        Note {
            id: NoteId::from("note-1"),
            title: "Jenkins Setup Checklist".to_string(),
            content: "# Jenkins Setup Steps\n\
                      - [ ] Provision EC2 instance (t3.medium)\n\
                      - [ ] Install Java JDK 11\n\
                      - [ ] Install Jenkins\n\
                      - [ ] Configure security groups\n\
                      - [ ] Setup initial admin user\n\
                      - [ ] Install necessary plugins (Git, Docker, Blue Ocean)\n"
                .to_string(),
            task_id: Some(TaskId::from("task-1")),
            created_at: now,
            updated_at: now,
        },
        Note {
            id: NoteId::from("note-2"),
            title: "Dashboard UI Ideas".to_string(),
            content: "# Dashboard UI Brainstorm\n\
                      - Key Metrics: Active Users, Task Completion Rate, Error Rate\n\
                      - Charts: Line chart for trends, Pie chart for status distribution\n\
                      - Layout: Customizable widgets\n"
                .to_string(),
            task_id: None,
            created_at: now,
            updated_at: now,
        },
    ]
}
