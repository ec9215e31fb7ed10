// src/collaborators/error.rs
use thiserror::Error;

use crate::domain::error::DomainError;

#[derive(Error, Debug)]
pub enum CollaboratorError {
    #[error("editor not found: {0}")]
    EditorNotFound(String),

    #[error("buffer unchanged")]
    BufferUnchanged,

    #[error("action aborted")]
    ActionAborted,

    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CollaboratorResult<T> = Result<T, CollaboratorError>;

impl From<CollaboratorError> for DomainError {
    fn from(e: CollaboratorError) -> Self {
        DomainError::Other(e.to_string())
    }
}
