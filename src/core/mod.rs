//! Core domain models: board tasks, priorities, projects, users, and notes.

pub mod note;
pub mod priority;
pub mod project;
pub mod task;

pub use note::{Note, NoteId};
pub use priority::Priority;
pub use project::{Project, ProjectId, User, UserId};
pub use task::{Task, TaskId, TaskStatus};
