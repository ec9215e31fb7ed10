// src/store/mod.rs
pub mod connection;
pub mod error;
pub mod migration;
pub mod models;
pub mod repository;
pub mod schema;

pub use connection::{init_pool, ConnectionPool, PooledConnection};
pub use error::{StoreError, StoreResult};
pub use repository::SqliteStore;
