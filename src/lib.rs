pub mod board;
pub mod config;
pub mod core;
pub mod dashboard;
pub mod error;
pub mod log;
pub mod notes;
pub mod prioritize;
pub mod store;
pub mod util;

pub use error::{Error, Result};
