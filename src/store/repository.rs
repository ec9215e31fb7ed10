// src/store/repository.rs
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{Integer, Text};
use diesel::sqlite::SqliteConnection;
use diesel::QueryableByName;
use tracing::{debug, instrument, warn};

use crate::concurrency::CancellationToken;
use crate::domain::bookmark::Bookmark;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::ports::repository::BookmarkRepository;
use crate::domain::tag;

use super::connection::{ConnectionPool, PooledConnection};
use super::error::{StoreError, StoreResult};
use super::models::{BookmarkWithTags, TagCountRow};

const BASE_SELECT: &str = "
    SELECT b.id, b.url, b.title, b.desc, b.created_at, b.last_visit, b.updated_at,
           b.visit_count, b.favorite, b.checksum, b.http_status_code, b.http_status_text,
           b.is_active, b.last_status_checked,
           (SELECT GROUP_CONCAT(t.name, ',')
              FROM bookmark_tags bt JOIN tags t ON t.id = bt.tag_id
             WHERE bt.bookmark_url = b.url
             ORDER BY t.name) AS tags
      FROM bookmarks b
";

const DROP_TAG_TRIGGER: &str = "DROP TRIGGER IF EXISTS trg_bookmarks_tag_cleanup";

const CREATE_TAG_TRIGGER: &str = "
    CREATE TRIGGER trg_bookmarks_tag_cleanup
    AFTER DELETE ON bookmarks
    FOR EACH ROW
    BEGIN
        DELETE FROM bookmark_tags WHERE bookmark_url = OLD.url;
        DELETE FROM tags WHERE id NOT IN (SELECT DISTINCT tag_id FROM bookmark_tags);
    END;
";

#[derive(QueryableByName, Debug)]
struct CountRow {
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    n: i64,
}

/// The SQLite-backed implementation of the store's contract (§4.D/§4.E).
///
/// Built on a `diesel` r2d2 pool, following the same wrapper shape the
/// teacher uses: a thin `pool: ConnectionPool` struct whose methods each
/// grab a pooled connection and run a transaction or a handful of
/// `sql_query`s. The normalized `bookmarks`/`tags`/`bookmark_tags` shape
/// (rather than the teacher's single denormalized `tags` text column)
/// follows directly from this spec's schema; tag lifecycle is enforced
/// by `trg_bookmarks_tag_cleanup`, installed by the migration and
/// reinstalled by `reorder_ids` after a delete-based renumbering pass.
#[derive(Clone, Debug)]
pub struct SqliteStore {
    pool: ConnectionPool,
}

impl SqliteStore {
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    #[instrument(skip_all, level = "debug")]
    pub fn from_url(database_url: &str) -> StoreResult<Self> {
        let pool = super::connection::init_pool(database_url)?;
        Ok(Self { pool })
    }

    fn conn(&self) -> StoreResult<PooledConnection> {
        self.pool.get().map_err(StoreError::Pool)
    }

    fn row_to_bookmark(row: BookmarkWithTags) -> StoreResult<Bookmark> {
        let created_at = parse_ts(&row.created_at)?;
        let last_visit = parse_ts(&row.last_visit)?;
        let updated_at = parse_ts(&row.updated_at)?;
        let tags = tag::parse_tags(&row.tags.unwrap_or_default());

        Ok(Bookmark {
            id: Some(row.id),
            url: row.url,
            title: row.title,
            desc: row.desc,
            tags,
            created_at,
            last_visit,
            updated_at,
            visit_count: row.visit_count,
            favorite: row.favorite,
            checksum: row.checksum,
            http_status_code: row.http_status_code,
            http_status_text: row.http_status_text,
            is_active: row.is_active,
            last_status_checked: row.last_status_checked,
        })
    }

    fn load_one(conn: &mut SqliteConnection, where_clause: &str, bind_url: Option<&str>, bind_id: Option<i32>) -> StoreResult<Option<Bookmark>> {
        let sql = format!("{BASE_SELECT} WHERE {where_clause}");
        let mut q = sql_query(sql).into_boxed();
        if let Some(u) = bind_url {
            q = q.bind::<Text, _>(u.to_string());
        }
        if let Some(i) = bind_id {
            q = q.bind::<Integer, _>(i);
        }
        let rows: Vec<BookmarkWithTags> = q.load(conn)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(Self::row_to_bookmark(row)?)),
            None => Ok(None),
        }
    }

    fn insert_tag_associations(conn: &mut SqliteConnection, url: &str, normalized_tags: &str) -> StoreResult<()> {
        for name in tag::split_tags(normalized_tags) {
            sql_query("INSERT OR IGNORE INTO tags (name) VALUES (?)")
                .bind::<Text, _>(&name)
                .execute(conn)?;

            #[derive(QueryableByName)]
            struct TagId {
                #[diesel(sql_type = Integer)]
                id: i32,
            }
            let tag_id: TagId = sql_query("SELECT id FROM tags WHERE name = ?")
                .bind::<Text, _>(&name)
                .get_result(conn)?;

            sql_query("INSERT OR IGNORE INTO bookmark_tags (bookmark_url, tag_id) VALUES (?, ?)")
                .bind::<Text, _>(url)
                .bind::<Integer, _>(tag_id.id)
                .execute(conn)?;
        }
        Ok(())
    }

    fn clear_tag_associations(conn: &mut SqliteConnection, url: &str) -> StoreResult<()> {
        sql_query("DELETE FROM bookmark_tags WHERE bookmark_url = ?")
            .bind::<Text, _>(url)
            .execute(conn)?;
        sql_query("DELETE FROM tags WHERE id NOT IN (SELECT DISTINCT tag_id FROM bookmark_tags)")
            .execute(conn)?;
        Ok(())
    }

    fn insert_row(conn: &mut SqliteConnection, b: &Bookmark) -> StoreResult<i32> {
        sql_query(
            "INSERT INTO bookmarks
                (id, url, title, desc, created_at, last_visit, updated_at, visit_count,
                 favorite, checksum, http_status_code, http_status_text, is_active, last_status_checked)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind::<diesel::sql_types::Nullable<Integer>, _>(b.id)
        .bind::<Text, _>(&b.url)
        .bind::<Text, _>(&b.title)
        .bind::<Text, _>(&b.desc)
        .bind::<Text, _>(b.created_at.to_rfc3339())
        .bind::<Text, _>(b.last_visit.to_rfc3339())
        .bind::<Text, _>(b.updated_at.to_rfc3339())
        .bind::<Integer, _>(b.visit_count)
        .bind::<diesel::sql_types::Bool, _>(b.favorite)
        .bind::<Text, _>(&b.checksum)
        .bind::<diesel::sql_types::Nullable<Integer>, _>(b.http_status_code)
        .bind::<diesel::sql_types::Nullable<Text>, _>(b.http_status_text.clone())
        .bind::<diesel::sql_types::Nullable<diesel::sql_types::Bool>, _>(b.is_active)
        .bind::<diesel::sql_types::Nullable<Text>, _>(b.last_status_checked.clone())
        .execute(conn)
        .map_err(|e| match e {
            diesel::result::Error::DatabaseError(diesel::result::DatabaseErrorKind::UniqueViolation, _) => {
                StoreError::Duplicate(b.url.clone())
            }
            other => StoreError::from(other),
        })?;

        let id_row: super::models::IdRow = sql_query("SELECT id FROM bookmarks WHERE url = ?")
            .bind::<Text, _>(&b.url)
            .get_result(conn)?;

        Self::insert_tag_associations(conn, &b.url, &b.tags)?;
        Ok(id_row.id)
    }
}

fn parse_ts(s: &str) -> StoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Other(format!("bad timestamp {s:?}: {e}")))
}

impl BookmarkRepository for SqliteStore {
    #[instrument(skip_all, level = "debug")]
    fn init(&self) -> DomainResult<()> {
        // Migrations already ran in `from_url`/`init_pool`; this just
        // confirms the connection is usable.
        self.conn()?;
        Ok(())
    }

    fn is_initialized(&self) -> DomainResult<bool> {
        let mut conn = self.conn()?;
        let rows: Vec<CountRow> = sql_query(
            "SELECT COUNT(*) AS n FROM sqlite_master WHERE type = 'table' AND name = 'bookmarks'",
        )
        .load(&mut conn)
        .map_err(StoreError::from)?;
        Ok(rows.first().map(|r| r.n > 0).unwrap_or(false))
    }

    #[instrument(skip_all, level = "debug")]
    fn insert_one(&self, bookmark: &Bookmark) -> DomainResult<Bookmark> {
        bookmark.validate()?;
        let mut conn = self.conn()?;
        let id = conn
            .transaction::<_, StoreError, _>(|conn| Self::insert_row(conn, bookmark))
            .map_err(DomainError::from)?;

        let mut inserted = bookmark.clone();
        inserted.id = Some(id);
        Ok(inserted)
    }

    #[instrument(skip_all, level = "debug")]
    fn insert_many(&self, bookmarks: &[Bookmark]) -> DomainResult<Vec<Bookmark>> {
        let mut sorted: Vec<&Bookmark> = bookmarks.iter().collect();
        sorted.sort_by_key(|b| b.id.unwrap_or(i32::MAX));

        let mut conn = self.conn()?;
        let mut out = Vec::with_capacity(sorted.len());
        for b in sorted {
            b.validate()?;
            let id = conn
                .transaction::<_, StoreError, _>(|conn| Self::insert_row(conn, b))
                .map_err(DomainError::from)?;
            let mut inserted = b.clone();
            inserted.id = Some(id);
            out.push(inserted);
        }
        Ok(out)
    }

    #[instrument(skip_all, level = "debug")]
    fn delete_one(&self, url: &str) -> DomainResult<()> {
        let mut conn = self.conn()?;
        let affected = sql_query("DELETE FROM bookmarks WHERE url = ?")
            .bind::<Text, _>(url)
            .execute(&mut conn)
            .map_err(StoreError::from)?;
        if affected == 0 {
            return Err(DomainError::NotFound(url.to_string()));
        }
        Ok(())
    }

    #[instrument(skip_all, level = "debug")]
    fn delete_many(&self, urls: &[String]) -> DomainResult<()> {
        let mut conn = self.conn()?;
        conn.transaction::<_, StoreError, _>(|conn| {
            for url in urls {
                sql_query("DELETE FROM bookmarks WHERE url = ?")
                    .bind::<Text, _>(url)
                    .execute(conn)?;
            }
            Ok(())
        })
        .map_err(DomainError::from)
    }

    #[instrument(skip_all, level = "debug")]
    fn update(&self, new: &Bookmark, old: &Bookmark) -> DomainResult<Bookmark> {
        let id = old.id.ok_or(DomainError::IdNotProvided)?;
        let mut updated = new.clone();
        updated.id = Some(id);
        updated.generate_checksum();
        updated.validate()?;

        let mut conn = self.conn()?;
        conn.transaction::<_, StoreError, _>(|conn| {
            Self::clear_tag_associations(conn, &old.url)?;

            let affected = sql_query(
                "UPDATE bookmarks
                    SET url = ?, title = ?, desc = ?, checksum = ?, updated_at = ?,
                        created_at = ?, last_visit = ?, visit_count = ?, favorite = ?,
                        http_status_code = ?, http_status_text = ?, is_active = ?,
                        last_status_checked = ?
                  WHERE id = ?",
            )
            .bind::<Text, _>(&updated.url)
            .bind::<Text, _>(&updated.title)
            .bind::<Text, _>(&updated.desc)
            .bind::<Text, _>(&updated.checksum)
            .bind::<Text, _>(updated.updated_at.to_rfc3339())
            .bind::<Text, _>(updated.created_at.to_rfc3339())
            .bind::<Text, _>(updated.last_visit.to_rfc3339())
            .bind::<Integer, _>(updated.visit_count)
            .bind::<diesel::sql_types::Bool, _>(updated.favorite)
            .bind::<diesel::sql_types::Nullable<Integer>, _>(updated.http_status_code)
            .bind::<diesel::sql_types::Nullable<Text>, _>(updated.http_status_text.clone())
            .bind::<diesel::sql_types::Nullable<diesel::sql_types::Bool>, _>(updated.is_active)
            .bind::<diesel::sql_types::Nullable<Text>, _>(updated.last_status_checked.clone())
            .bind::<Integer, _>(id)
            .execute(conn)?;

            if affected == 0 {
                return Err(StoreError::NotFound(updated.url.clone()));
            }

            Self::insert_tag_associations(conn, &updated.url, &updated.tags)?;
            Ok(())
        })
        .map_err(DomainError::from)?;

        Ok(updated)
    }

    #[instrument(skip_all, level = "trace")]
    fn all(&self) -> DomainResult<Vec<Bookmark>> {
        let mut conn = self.conn()?;
        let rows: Vec<BookmarkWithTags> = sql_query(format!("{BASE_SELECT} ORDER BY b.id ASC"))
            .load(&mut conn)
            .map_err(StoreError::from)?;
        rows.into_iter()
            .map(Self::row_to_bookmark)
            .collect::<StoreResult<Vec<_>>>()
            .map_err(DomainError::from)
    }

    fn by_id(&self, id: i32) -> DomainResult<Bookmark> {
        let mut conn = self.conn()?;
        Self::load_one(&mut conn, "b.id = ?", None, Some(id))
            .map_err(DomainError::from)?
            .ok_or_else(|| DomainError::NotFound(id.to_string()))
    }

    fn by_id_list(&self, ids: &[i32]) -> DomainResult<Vec<Bookmark>> {
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            out.push(self.by_id(*id)?);
        }
        Ok(out)
    }

    fn by_url(&self, url: &str) -> DomainResult<Bookmark> {
        let mut conn = self.conn()?;
        Self::load_one(&mut conn, "b.url = ?", Some(url), None)
            .map_err(DomainError::from)?
            .ok_or_else(|| DomainError::NotFound(url.to_string()))
    }

    #[instrument(skip_all, level = "debug")]
    fn by_tag(&self, pattern: &str) -> DomainResult<Vec<Bookmark>> {
        let mut conn = self.conn()?;
        let sql = format!(
            "{BASE_SELECT}
             WHERE b.url IN (
                 SELECT bt.bookmark_url FROM bookmark_tags bt
                 JOIN tags t ON t.id = bt.tag_id
                 WHERE LOWER(t.name) LIKE LOWER(?)
             )
             ORDER BY b.id ASC"
        );
        let like = format!("%{pattern}%");
        let rows: Vec<BookmarkWithTags> = sql_query(sql)
            .bind::<Text, _>(like)
            .load(&mut conn)
            .map_err(StoreError::from)?;
        rows.into_iter()
            .map(Self::row_to_bookmark)
            .collect::<StoreResult<Vec<_>>>()
            .map_err(DomainError::from)
    }

    #[instrument(skip_all, level = "debug")]
    fn by_query(&self, query: &str) -> DomainResult<Vec<Bookmark>> {
        let mut conn = self.conn()?;
        let sql = format!(
            "{BASE_SELECT}
             WHERE LOWER(b.title || ' ' || b.url || ' ' || b.desc) LIKE LOWER(?)
                OR b.url IN (
                    SELECT bt.bookmark_url FROM bookmark_tags bt
                    JOIN tags t ON t.id = bt.tag_id
                    WHERE LOWER(t.name) LIKE LOWER(?)
                )
             ORDER BY b.id ASC"
        );
        let like = format!("%{query}%");
        let rows: Vec<BookmarkWithTags> = sql_query(sql)
            .bind::<Text, _>(like.clone())
            .bind::<Text, _>(like)
            .load(&mut conn)
            .map_err(StoreError::from)?;
        rows.into_iter()
            .map(Self::row_to_bookmark)
            .collect::<StoreResult<Vec<_>>>()
            .map_err(DomainError::from)
    }

    fn has(&self, url: &str) -> DomainResult<(Option<Bookmark>, bool)> {
        let mut conn = self.conn()?;
        match Self::load_one(&mut conn, "b.url = ?", Some(url), None).map_err(DomainError::from)? {
            Some(b) => {
                if let Err(e) = b.verify_checksum() {
                    warn!(url, error = %e, "stored checksum does not match on read");
                }
                Ok((Some(b), true))
            }
            None => Ok((None, false)),
        }
    }

    /// Renumber `bookmarks.id` to a dense `1..=N` sequence, preserving
    /// ascending order. Runs as delete-then-reinsert under the hood, so
    /// the tag-cleanup trigger is dropped first (else it would wipe every
    /// bookmark's own tag associations as each row is momentarily
    /// deleted) and reinstated once renumbering finishes or is cancelled.
    #[instrument(skip_all, level = "debug")]
    fn reorder_ids(&self, cancel: &CancellationToken) -> DomainResult<()> {
        let mut conn = self.conn()?;

        let result = conn.transaction::<_, StoreError, _>(|conn| {
            sql_query(DROP_TAG_TRIGGER).execute(conn)?;

            let ids: Vec<super::models::IdRow> =
                sql_query("SELECT id FROM bookmarks ORDER BY id ASC").load(conn)?;

            const OFFSET: i32 = 1_000_000_000;
            sql_query("UPDATE bookmarks SET id = id + ?")
                .bind::<Integer, _>(OFFSET)
                .execute(conn)?;

            for (new_id, row) in ids.into_iter().enumerate() {
                if cancel.is_cancelled() {
                    debug!("reorder_ids cancelled midway");
                    return Ok(());
                }
                sql_query("UPDATE bookmarks SET id = ? WHERE id = ?")
                    .bind::<Integer, _>(new_id as i32 + 1)
                    .bind::<Integer, _>(row.id + OFFSET)
                    .execute(conn)?;
            }
            Ok(())
        });

        sql_query(DROP_TAG_TRIGGER)
            .execute(&mut conn)
            .map_err(StoreError::from)?;
        sql_query(CREATE_TAG_TRIGGER)
            .execute(&mut conn)
            .map_err(StoreError::from)?;

        result.map_err(DomainError::from)
    }

    #[instrument(skip_all, level = "info")]
    fn drop_secure(&self) -> DomainResult<()> {
        let mut conn = self.conn()?;
        sql_query("DELETE FROM bookmarks")
            .execute(&mut conn)
            .map_err(StoreError::from)?;
        drop(conn);
        self.vacuum()
    }

    #[instrument(skip_all, level = "info")]
    fn vacuum(&self) -> DomainResult<()> {
        let mut conn = self.conn()?;
        sql_query("VACUUM")
            .execute(&mut conn)
            .map_err(|e| StoreError::VacuumFailed(e.to_string()))?;
        Ok(())
    }

    fn update_visit(&self, url: &str) -> DomainResult<()> {
        let mut conn = self.conn()?;
        let now = Utc::now().to_rfc3339();
        let affected = sql_query(
            "UPDATE bookmarks SET visit_count = visit_count + 1, last_visit = ? WHERE url = ?",
        )
        .bind::<Text, _>(now)
        .bind::<Text, _>(url)
        .execute(&mut conn)
        .map_err(StoreError::from)?;
        if affected == 0 {
            return Err(DomainError::NotFound(url.to_string()));
        }
        Ok(())
    }

    fn set_favorite(&self, url: &str, favorite: bool) -> DomainResult<()> {
        let mut conn = self.conn()?;
        let affected = sql_query("UPDATE bookmarks SET favorite = ? WHERE url = ?")
            .bind::<diesel::sql_types::Bool, _>(favorite)
            .bind::<Text, _>(url)
            .execute(&mut conn)
            .map_err(StoreError::from)?;
        if affected == 0 {
            return Err(DomainError::NotFound(url.to_string()));
        }
        Ok(())
    }

    fn set_status(&self, url: &str, code: i32, text: &str, is_active: bool) -> DomainResult<()> {
        let mut conn = self.conn()?;
        let stamp = Utc::now().format("%Y%m%d%H%M%S").to_string();
        let affected = sql_query(
            "UPDATE bookmarks
                SET http_status_code = ?, http_status_text = ?, is_active = ?, last_status_checked = ?
              WHERE url = ?",
        )
        .bind::<Integer, _>(code)
        .bind::<Text, _>(text)
        .bind::<diesel::sql_types::Bool, _>(is_active)
        .bind::<Text, _>(stamp)
        .bind::<Text, _>(url)
        .execute(&mut conn)
        .map_err(StoreError::from)?;
        if affected == 0 {
            return Err(DomainError::NotFound(url.to_string()));
        }
        Ok(())
    }

    #[instrument(skip_all, level = "trace")]
    fn tags_counter(&self) -> DomainResult<HashMap<String, i64>> {
        let mut conn = self.conn()?;
        let rows: Vec<TagCountRow> = sql_query(
            "SELECT t.name AS name, COUNT(bt.bookmark_url) AS count
               FROM tags t
               LEFT JOIN bookmark_tags bt ON bt.tag_id = t.id
              GROUP BY t.name
              ORDER BY count DESC",
        )
        .load(&mut conn)
        .map_err(StoreError::from)?;
        Ok(rows.into_iter().map(|r| (r.name, r.count)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn new_store() -> (NamedTempFile, SqliteStore) {
        let file = NamedTempFile::new().unwrap();
        let store = SqliteStore::from_url(file.path().to_str().unwrap()).unwrap();
        (file, store)
    }

    #[test]
    fn update_persists_every_column_not_just_the_core_five() {
        let (_file, store) = new_store();
        let old = store.insert_one(&Bookmark::new("https://u/", "T", "D", "go")).unwrap();

        let mut new = old.clone();
        new.favorite = true;
        new.visit_count = 7;
        new.http_status_code = Some(200);
        new.http_status_text = Some("OK".to_string());
        new.is_active = Some(true);
        new.last_status_checked = Some("20260101000000".to_string());

        let returned = store.update(&new, &old).unwrap();
        assert!(returned.favorite);
        assert_eq!(returned.visit_count, 7);

        let reread = store.by_id(old.id.unwrap()).unwrap();
        assert_eq!(reread.favorite, returned.favorite);
        assert_eq!(reread.visit_count, returned.visit_count);
        assert_eq!(reread.http_status_code, returned.http_status_code);
        assert_eq!(reread.http_status_text, returned.http_status_text);
        assert_eq!(reread.is_active, returned.is_active);
        assert_eq!(reread.last_status_checked, returned.last_status_checked);
    }

    #[test]
    fn update_rewrites_tag_associations() {
        let (_file, store) = new_store();
        let old = store.insert_one(&Bookmark::new("https://u2/", "T", "D", "go")).unwrap();
        assert!(store.tags_counter().unwrap().contains_key("go"));

        let mut new = old.clone();
        new.tags = "rust,".to_string();
        store.update(&new, &old).unwrap();

        let counts = store.tags_counter().unwrap();
        assert!(!counts.contains_key("go"));
        assert!(counts.contains_key("rust"));
    }
}
