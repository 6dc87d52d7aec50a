use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("No home directory")]
    NoHomeDir,

    /// The input was rejected before anything was sent out.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The generation service failed, timed out, or answered with something
    /// that does not match the requested shape.
    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Generation service returned no result")]
    EmptyResult,

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Claude binary not found in PATH")]
    ClaudeBinaryNotFound,

    #[error("Task join error: {0}")]
    TaskJoin(String),
}

impl Error {
    pub fn not_found(kind: &'static str, id: impl std::fmt::Display) -> Self {
        Error::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
