// src/mirror/error.rs
use thiserror::Error;

use crate::domain::error::DomainError;

#[derive(Error, Debug)]
pub enum MirrorError {
    #[error("file already exists: {0}")]
    FileExists(String),

    #[error("checksum mismatch: {0}")]
    InvalidChecksum(String),

    #[error("gpg not found on PATH")]
    GpgNotFound,

    #[error("gpg exited with failure: {0}")]
    GpgFailed(String),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type MirrorResult<T> = Result<T, MirrorError>;

impl From<MirrorError> for DomainError {
    fn from(e: MirrorError) -> Self {
        match e {
            MirrorError::Domain(inner) => inner,
            MirrorError::InvalidChecksum(what) => DomainError::InvalidChecksum(what),
            other => DomainError::Other(other.to_string()),
        }
    }
}
