// src/store/error.rs
use thiserror::Error;

use crate::domain::error::DomainError;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database connection error: {0}")]
    Connection(#[from] diesel::r2d2::Error),

    #[error("connection pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),

    #[error("query error: {0}")]
    Query(#[from] diesel::result::Error),

    #[error("migration error: {0}")]
    Migration(String),

    #[error("bookmark not found: {0}")]
    NotFound(String),

    #[error("bookmark already exists: {0}")]
    Duplicate(String),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("vacuum failed: {0}")]
    VacuumFailed(String),

    #[error("other store error: {0}")]
    Other(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for DomainError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(what) => DomainError::NotFound(what),
            StoreError::Duplicate(url) => DomainError::Duplicate(url),
            StoreError::Domain(inner) => inner,
            other => DomainError::Other(other.to_string()),
        }
    }
}
