use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};

use agileflow::board::{Board, TaskDraft};
use agileflow::config::Config;
use agileflow::core::{NoteId, Priority, Project, ProjectId, TaskId, TaskStatus, UserId};
use agileflow::dashboard::DashboardStats;
use agileflow::notes::Notebook;
use agileflow::prioritize::{
    BatchBuilder, ClaudeHeadless, PrioritizationRequest, Prioritizer, NO_DEADLINE,
};
use agileflow::store::Workspace;
use agileflow::{aflog, util, Error, Result};

/// AgileFlow - Kanban board, notes, and AI task prioritization
#[derive(Parser, Debug)]
#[command(name = "agileflow")]
#[command(version, about, long_about = None)]
#[command(after_help = "ENVIRONMENT:\n    AGILEFLOW_DEBUG=1      Enable debug logging (alternative to --debug)\n    AGILEFLOW_LOG=<level>  error, warn, info, debug or trace")]
pub struct Cli {
    /// Enable debug logging (writes to ~/.agileflow/agileflow.log)
    #[arg(short = 'd', long, global = true)]
    pub debug: bool,

    /// Use a throwaway in-memory workspace with demo data
    #[arg(long, global = true)]
    pub memory: bool,

    /// Config file (default: ~/.agileflow/agileflow.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Show the Kanban board
    Board,

    /// Show task statistics
    Dashboard,

    /// List projects and their goals
    Projects,

    /// Create, edit, move or delete board tasks
    #[command(subcommand)]
    Task(TaskCommand),

    /// Manage markdown notes
    #[command(subcommand)]
    Notes(NotesCommand),

    /// Ask the model to prioritize a batch of tasks
    Prioritize {
        /// Project whose goals (and, with --board, tasks) to use
        #[arg(long)]
        project: Option<String>,

        /// Project goals; overrides the project's goals
        #[arg(long)]
        goals: Option<String>,

        /// Ad-hoc task as "DESCRIPTION|DEADLINE" (repeatable)
        #[arg(long = "task", value_name = "DESC|DEADLINE")]
        tasks: Vec<String>,

        /// Prioritize the project's open board tasks
        #[arg(long, requires = "project", conflicts_with = "tasks")]
        board: bool,

        /// Write the resulting priorities back onto the board
        #[arg(long, requires = "board")]
        apply: bool,

        /// Print the raw JSON response
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum TaskCommand {
    /// Add a task
    Add {
        title: String,
        #[command(flatten)]
        fields: TaskFields,
    },

    /// Edit a task; omitted fields keep their value
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[command(flatten)]
        fields: TaskFields,
    },

    /// Move a task to another column
    Move {
        id: String,
        /// todo, in-progress or done
        status: TaskStatus,
    },

    /// Delete a task
    Delete { id: String },
}

#[derive(clap::Args, Debug, Clone, PartialEq)]
pub struct TaskFields {
    #[arg(long)]
    description: Option<String>,
    /// todo, in-progress or done
    #[arg(long)]
    status: Option<TaskStatus>,
    /// High, Medium or Low
    #[arg(long)]
    priority: Option<Priority>,
    #[arg(long)]
    assignee: Option<String>,
    /// RFC 3339 timestamp or YYYY-MM-DD
    #[arg(long, value_parser = parse_due_date)]
    due: Option<DateTime<Utc>>,
    #[arg(long)]
    project: Option<String>,
    #[arg(long)]
    goals: Option<String>,
}

impl TaskFields {
    fn apply_to(self, draft: &mut TaskDraft) {
        if let Some(description) = self.description {
            draft.description = Some(description);
        }
        if let Some(status) = self.status {
            draft.status = status;
        }
        if let Some(priority) = self.priority {
            draft.priority = Some(priority);
        }
        if let Some(assignee) = self.assignee {
            draft.assignee_id = Some(UserId(assignee));
        }
        if let Some(due) = self.due {
            draft.due_date = Some(due);
        }
        if let Some(project) = self.project {
            if draft.project_id.as_ref().map(|p| p.0.as_str()) != Some(project.as_str()) {
                // Goals follow the new project unless given explicitly.
                draft.project_goals = None;
            }
            draft.project_id = Some(ProjectId(project));
        }
        if let Some(goals) = self.goals {
            draft.project_goals = Some(goals);
        }
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum NotesCommand {
    /// List notes, newest first
    List,

    /// Print a note
    Show { id: String },

    /// Create a note
    Add {
        title: String,
        #[arg(long, default_value = "")]
        content: String,
        /// Link the note to a task
        #[arg(long)]
        task: Option<String>,
    },

    /// Edit a note; omitted fields keep their value
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
    },

    /// Delete a note
    Delete { id: String },
}

fn parse_due_date(raw: &str) -> std::result::Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| format!("invalid date '{}': use RFC 3339 or YYYY-MM-DD", raw))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    agileflow::log::init(cli.debug);
    aflog!("agileflow starting: {:?}", cli.command);

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let rt = tokio::runtime::Runtime::new()?;
    let workspace = rt.block_on(open_workspace(&config, cli.memory))?;

    match cli.command {
        Command::Board => run_board(&workspace),
        Command::Dashboard => run_dashboard(&workspace),
        Command::Projects => run_projects(&workspace),
        Command::Task(cmd) => run_task(&workspace, cmd),
        Command::Notes(cmd) => run_notes(&workspace, cmd),
        Command::Prioritize {
            project,
            goals,
            tasks,
            board,
            apply,
            json,
        } => {
            let request = build_request(&workspace, project, goals, tasks, board)?;
            rt.block_on(run_prioritize(&config, &workspace, request, apply, json))
        }
    }
}

async fn open_workspace(config: &Config, memory: bool) -> Result<Workspace> {
    if memory {
        return Ok(Workspace::seeded());
    }
    let dir = config.data_dir()?;
    let seed = config.seed_demo_data;
    util::blocking(move || Workspace::open(&dir, seed)).await
}

fn find_project(workspace: &Workspace, id: &str) -> Result<Project> {
    let id = ProjectId::from(id);
    workspace
        .projects
        .get(&id)?
        .ok_or_else(|| Error::not_found("Project", &id))
}

fn run_board(workspace: &Workspace) -> Result<()> {
    let users = workspace.users.list()?;
    for column in Board::new(workspace).columns()? {
        println!("── {} ({}) ──", column.title, column.tasks.len());
        if column.tasks.is_empty() {
            println!("  No tasks in this column.");
        }
        for task in &column.tasks {
            let priority = task.priority.as_ref().map(|p| p.as_str()).unwrap_or("-");
            println!("  [{}] {}  ({})", priority, task.title, task.id);
            if let Some(due) = task.due_date {
                println!("        Due: {}", due.format("%b %d, %Y"));
            }
            if let Some(user) = task
                .assignee_id
                .as_ref()
                .and_then(|a| users.iter().find(|u| &u.id == a))
            {
                println!("        Assignee: {}", user.name);
            }
        }
        println!();
    }
    Ok(())
}

fn run_dashboard(workspace: &Workspace) -> Result<()> {
    let tasks = workspace.tasks.list()?;
    print!("{}", DashboardStats::compute(&tasks));
    Ok(())
}

fn run_projects(workspace: &Workspace) -> Result<()> {
    for project in workspace.projects.list()? {
        println!("{}  {}", project.id, project.name);
        println!("    Goals: {}", project.goals);
    }
    Ok(())
}

fn run_task(workspace: &Workspace, cmd: TaskCommand) -> Result<()> {
    let board = Board::new(workspace);
    match cmd {
        TaskCommand::Add { title, fields } => {
            let mut draft = TaskDraft::titled(&title);
            fields.apply_to(&mut draft);
            let task = board.add(draft)?;
            println!("Added {} ({})", task.id, task.title);
        }
        TaskCommand::Edit { id, title, fields } => {
            let id = TaskId(id);
            let mut draft = TaskDraft::from_task(&board.get(&id)?);
            if let Some(title) = title {
                draft.title = title;
            }
            fields.apply_to(&mut draft);
            let task = board.edit(&id, draft)?;
            println!("Updated {} ({})", task.id, task.title);
        }
        TaskCommand::Move { id, status } => {
            let task = board.move_task(&TaskId(id), status)?;
            println!("Moved {} to {}", task.id, task.status.title());
        }
        TaskCommand::Delete { id } => {
            let id = TaskId(id);
            board.delete(&id)?;
            println!("Deleted {}", id);
        }
    }
    Ok(())
}

fn run_notes(workspace: &Workspace, cmd: NotesCommand) -> Result<()> {
    let notebook = Notebook::new(workspace);
    match cmd {
        NotesCommand::List => {
            let notes = notebook.list()?;
            if notes.is_empty() {
                println!("No notes yet.");
            }
            for note in notes {
                println!(
                    "{}  {}  ({})",
                    note.id,
                    note.display_title(),
                    note.created_at.format("%Y-%m-%d")
                );
            }
        }
        NotesCommand::Show { id } => {
            let note = notebook.get(&NoteId(id))?;
            println!("# {}", note.display_title());
            if let Some(task_id) = &note.task_id {
                println!("Linked task: {}", task_id);
            }
            println!();
            println!("{}", note.content);
        }
        NotesCommand::Add {
            title,
            content,
            task,
        } => {
            let note = notebook.create(&title, &content, task.map(TaskId))?;
            println!("Created {} ({})", note.id, note.display_title());
        }
        NotesCommand::Edit { id, title, content } => {
            let id = NoteId(id);
            let current = notebook.get(&id)?;
            let note = notebook.update(
                &id,
                title.as_deref().unwrap_or(&current.title),
                content.as_deref().unwrap_or(&current.content),
            )?;
            println!("Updated {} ({})", note.id, note.display_title());
        }
        NotesCommand::Delete { id } => {
            let id = NoteId(id);
            notebook.delete(&id)?;
            println!("Deleted {}", id);
        }
    }
    Ok(())
}

fn build_request(
    workspace: &Workspace,
    project: Option<String>,
    goals: Option<String>,
    tasks: Vec<String>,
    from_board: bool,
) -> Result<PrioritizationRequest> {
    let project = project.map(|id| find_project(workspace, &id)).transpose()?;

    let builder = match (&project, from_board) {
        (Some(project), true) => {
            let tasks = Board::new(workspace).project_tasks(&project.id)?;
            BatchBuilder::from_tasks(project, &tasks)
        }
        _ => tasks.iter().fold(BatchBuilder::new(), |builder, raw| {
            let (description, deadline) = raw.split_once('|').unwrap_or((raw.as_str(), NO_DEADLINE));
            builder.add(description.trim(), deadline.trim())
        }),
    };

    let goals = goals
        .or_else(|| project.map(|p| p.goals))
        .unwrap_or_default();
    builder.goals(&goals).try_build()
}

async fn run_prioritize(
    config: &Config,
    workspace: &Workspace,
    request: PrioritizationRequest,
    apply: bool,
    json: bool,
) -> Result<()> {
    // Reject a bad batch before looking for the claude binary.
    request.validate(config.goals_policy)?;
    let generator = ClaudeHeadless::from_config(config)?;
    let prioritizer =
        Prioritizer::new(Arc::new(generator)).with_goals_policy(config.goals_policy);

    if !json {
        println!("Prioritizing {} task(s)...", request.tasks.len());
    }
    let response = prioritizer.prioritize(&request).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        println!();
        println!("AI Prioritized Tasks");
        println!("─────────────────────────────────────────────────────────────");
        for ranked in response.ranked(&request) {
            println!("{}", ranked);
        }
    }

    if apply {
        let board = Board::new(workspace);
        let applied = util::blocking(move || board.apply_priorities(&response)).await?;
        if !json {
            println!();
            println!("Applied priorities to {} board task(s).", applied);
        }
    }
    Ok(())
}
