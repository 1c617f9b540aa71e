//! Tracker-specific error types

use shared::SharedError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("State storage failed: {operation} on {path}")]
    Storage {
        operation: &'static str,
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt state file: {path}")]
    CorruptState {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Configuration error")]
    Config(#[from] SharedError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TrackerError {
    pub fn storage(operation: &'static str, path: impl Into<String>, source: std::io::Error) -> Self {
        TrackerError::Storage {
            operation,
            path: path.into(),
            source,
        }
    }
}

pub type TrackerResult<T> = Result<T, TrackerError>;
