// src/cli/error.rs
use std::io;
use thiserror::Error;

use crate::backup::BackupError;
use crate::collaborators::CollaboratorError;
use crate::domain::error::DomainError;
use crate::mirror::MirrorError;
use crate::store::StoreError;

/// Converges every layer's error enum at the command boundary, the same
/// upward-funneling shape store/backup/mirror/collaborator errors
/// already use to reach `DomainError`.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("operation aborted by user")]
    OperationAborted,

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Backup(#[from] BackupError),

    #[error(transparent)]
    Mirror(#[from] MirrorError),

    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("{0}")]
    Other(String),
}

pub type CliResult<T> = Result<T, CliError>;
