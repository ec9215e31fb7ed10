#![crate_type = "lib"]
#![crate_name = "gomarks"]

pub mod backup;
pub mod cli;
pub mod collaborators;
pub mod concurrency;
pub mod config;
pub mod domain;
pub mod error_tracker;
pub mod import;
pub mod mirror;
pub mod status;
pub mod store;
