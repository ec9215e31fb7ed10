// src/domain/ports/mod.rs
pub mod collaborators;
pub mod repository;

pub use collaborators::{Browser, Editor, GitProvider, Prompt, ScrapedMetadata, Scraper};
pub use repository::BookmarkRepository;
