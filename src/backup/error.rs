// src/backup/error.rs
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackupError {
    #[error("backup already exists: {0}")]
    Exists(String),

    #[error("backups are disabled (retention limit <= 0)")]
    Disabled,

    #[error("backup not found: {0}")]
    NotFound(String),

    #[error("nothing to purge")]
    NoPurge,

    #[error("backup directory not set")]
    PathNotSet,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type BackupResult<T> = Result<T, BackupError>;
