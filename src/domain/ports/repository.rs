// src/domain/ports/repository.rs
use std::collections::HashMap;

use crate::concurrency::CancellationToken;
use crate::domain::bookmark::Bookmark;
use crate::domain::error::DomainResult;

/// The store's public contract (§4.D). Implemented by
/// [`crate::store::repository::SqliteStore`]; kept as a trait so
/// higher layers (import/merge, status pipeline, CLI) depend on the
/// contract rather than the SQLite-specific type.
pub trait BookmarkRepository: Send + Sync {
    fn init(&self) -> DomainResult<()>;
    fn is_initialized(&self) -> DomainResult<bool>;

    fn insert_one(&self, bookmark: &Bookmark) -> DomainResult<Bookmark>;
    fn insert_many(&self, bookmarks: &[Bookmark]) -> DomainResult<Vec<Bookmark>>;

    fn delete_one(&self, url: &str) -> DomainResult<()>;
    fn delete_many(&self, urls: &[String]) -> DomainResult<()>;

    fn update(&self, new: &Bookmark, old: &Bookmark) -> DomainResult<Bookmark>;

    fn all(&self) -> DomainResult<Vec<Bookmark>>;
    fn by_id(&self, id: i32) -> DomainResult<Bookmark>;
    fn by_id_list(&self, ids: &[i32]) -> DomainResult<Vec<Bookmark>>;
    fn by_url(&self, url: &str) -> DomainResult<Bookmark>;
    fn by_tag(&self, pattern: &str) -> DomainResult<Vec<Bookmark>>;
    fn by_query(&self, query: &str) -> DomainResult<Vec<Bookmark>>;
    fn has(&self, url: &str) -> DomainResult<(Option<Bookmark>, bool)>;

    fn reorder_ids(&self, cancel: &CancellationToken) -> DomainResult<()>;
    fn drop_secure(&self) -> DomainResult<()>;
    fn vacuum(&self) -> DomainResult<()>;

    fn update_visit(&self, url: &str) -> DomainResult<()>;
    fn set_favorite(&self, url: &str, favorite: bool) -> DomainResult<()>;
    fn set_status(&self, url: &str, code: i32, text: &str, is_active: bool) -> DomainResult<()>;

    fn tags_counter(&self) -> DomainResult<HashMap<String, i64>>;
}
