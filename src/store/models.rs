// src/store/models.rs
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Integer, Nullable, Text};

use super::schema::bookmarks;

#[derive(Queryable, Identifiable, Clone, Debug)]
#[diesel(table_name = bookmarks)]
pub struct DbBookmark {
    pub id: i32,
    pub url: String,
    pub title: String,
    pub desc: String,
    pub created_at: String,
    pub last_visit: String,
    pub updated_at: String,
    pub visit_count: i32,
    pub favorite: bool,
    pub checksum: String,
    pub http_status_code: Option<i32>,
    pub http_status_text: Option<String>,
    pub is_active: Option<bool>,
    pub last_status_checked: Option<String>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = bookmarks)]
pub struct NewBookmark<'a> {
    pub id: Option<i32>,
    pub url: &'a str,
    pub title: &'a str,
    pub desc: &'a str,
    pub created_at: String,
    pub last_visit: String,
    pub updated_at: String,
    pub visit_count: i32,
    pub favorite: bool,
    pub checksum: &'a str,
    pub http_status_code: Option<i32>,
    pub http_status_text: Option<&'a str>,
    pub is_active: Option<bool>,
    pub last_status_checked: Option<&'a str>,
}

/// Row shape for the `GROUP_CONCAT` tag-name query used by `all`/`by_id`
/// (§4.D). `tags` is `NULL` when a bookmark has no join rows (which
/// shouldn't happen given the "notag" sentinel is itself stored as a
/// tag row, but the column is nullable defensively).
#[derive(QueryableByName, Debug)]
pub struct BookmarkWithTags {
    #[diesel(sql_type = Integer)]
    pub id: i32,
    #[diesel(sql_type = Text)]
    pub url: String,
    #[diesel(sql_type = Text)]
    pub title: String,
    #[diesel(sql_type = Text)]
    pub desc: String,
    #[diesel(sql_type = Text)]
    pub created_at: String,
    #[diesel(sql_type = Text)]
    pub last_visit: String,
    #[diesel(sql_type = Text)]
    pub updated_at: String,
    #[diesel(sql_type = Integer)]
    pub visit_count: i32,
    #[diesel(sql_type = diesel::sql_types::Bool)]
    pub favorite: bool,
    #[diesel(sql_type = Text)]
    pub checksum: String,
    #[diesel(sql_type = Nullable<Integer>)]
    pub http_status_code: Option<i32>,
    #[diesel(sql_type = Nullable<Text>)]
    pub http_status_text: Option<String>,
    #[diesel(sql_type = Nullable<diesel::sql_types::Bool>)]
    pub is_active: Option<bool>,
    #[diesel(sql_type = Nullable<Text>)]
    pub last_status_checked: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub tags: Option<String>,
}

#[derive(QueryableByName, Debug)]
pub struct IdRow {
    #[diesel(sql_type = Integer)]
    pub id: i32,
}

#[derive(QueryableByName, Debug)]
pub struct TagCountRow {
    #[diesel(sql_type = Text)]
    pub name: String,
    #[diesel(sql_type = BigInt)]
    pub count: i64,
}

#[derive(QueryableByName, Debug)]
pub struct MaxIdRow {
    #[diesel(sql_type = Nullable<Integer>)]
    pub max_id: Option<i32>,
}
