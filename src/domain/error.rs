// src/domain/error.rs
use thiserror::Error;

/// Validation and record-level errors shared by every component in §4.
///
/// Lower layers (store, backup, mirror, collaborators) define their own
/// error enums and convert into this one at the boundary where a
/// repository/manager method returns to its caller.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("url must not be empty")]
    UrlEmpty,

    #[error("tags must not be empty")]
    TagsEmpty,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("duplicate record: url={0}")]
    Duplicate(String),

    #[error("no record found: {0}")]
    NotFound(String),

    #[error("no match for query: {0}")]
    NoMatch(String),

    #[error("id not provided")]
    IdNotProvided,

    #[error("insert failed: {0}")]
    InsertFailed(String),

    #[error("scan failed: {0}")]
    ScanFailed(String),

    #[error("checksum mismatch: {0}")]
    InvalidChecksum(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type DomainResult<T> = Result<T, DomainError>;
