//! Structured error types for scopetrace
//!
//! Using thiserror for automatic Display implementation and error chaining.
//! None of these should ever take the host process down: callers either
//! propagate them or, on drop paths, log and move on.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InstrumentError {
    #[error("Failed to open trace output {}: {source}", path.display())]
    StreamOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Trace session \"{active}\" is already open")]
    SessionAlreadyOpen { active: String },

    #[error("No trace session open, dropped record \"{record}\"")]
    WriteAfterClose { record: String },

    #[error("No trace session open")]
    NoActiveSession,

    #[error("Failed to read session config: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, InstrumentError>;
