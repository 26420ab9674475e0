//! Synthesis error types

use thiserror::Error;

/// Errors surfaced by stack graph construction and synthesis
#[derive(Error, Debug)]
pub enum SynthError {
    #[error("Dependency cycle detected: {0}")]
    Cycle(String),

    #[error("Unknown stack: {0}")]
    UnknownStack(String),

    #[error("Duplicate stack: {0}")]
    DuplicateStack(String),

    #[error("Duplicate resource '{resource}' in stack '{stack}'")]
    DuplicateResource { stack: String, resource: String },

    #[error("Unresolved reference {reference} (referenced from stack '{stack}')")]
    Reference { stack: String, reference: String },

    #[error("Invalid resource '{resource}' in stack '{stack}': {message}")]
    Validation {
        stack: String,
        resource: String,
        message: String,
    },

    #[error("Assembly error: {0}")]
    Assembly(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SynthError>;
