//! Error types for projectpro
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad args, unknown ids, invalid form input)
//! - 4: Operation failed (io, serialization, lock contention, watcher)
//!
//! The derived views (deadline index, progress, ordering) have no error path;
//! malformed inputs degrade to "absent" there instead of surfacing here.

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the projectpro CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for projectpro operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Store not initialized at {0}")]
    NotInitialized(PathBuf),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Validation failed for {field}: {message}")]
    Validation { field: &'static str, message: String },

    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Ambiguous id '{input}' matches {}", matches.join(", "))]
    AmbiguousId { input: String, matches: Vec<String> },

    // Operation failures (exit code 4)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Lock acquisition failed: {0}")]
    LockFailed(PathBuf),

    #[error("Watch error: {0}")]
    Watch(#[from] notify::Error),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::NotInitialized(_)
            | Error::InvalidConfig(_)
            | Error::InvalidArgument(_)
            | Error::Validation { .. }
            | Error::ProjectNotFound(_)
            | Error::TaskNotFound(_)
            | Error::AmbiguousId { .. } => exit_codes::USER_ERROR,

            Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::TomlSerialize(_)
            | Error::LockFailed(_)
            | Error::Watch(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Structured details for JSON error envelopes.
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::Validation { field, .. } => Some(serde_json::json!({ "field": field })),
            Error::AmbiguousId { input, matches } => Some(serde_json::json!({
                "input": input,
                "matches": matches,
            })),
            Error::NotInitialized(path) | Error::LockFailed(path) => {
                Some(serde_json::json!({ "path": path.display().to_string() }))
            }
            _ => None,
        }
    }
}

/// Result type alias for projectpro operations
pub type Result<T> = std::result::Result<T, Error>;
