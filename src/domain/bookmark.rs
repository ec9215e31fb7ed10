// src/domain/bookmark.rs
use chrono::{DateTime, Utc};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use super::error::{DomainError, DomainResult};
use super::hasher;
use super::tag;

/// The canonical in-memory bookmark record (§3).
///
/// `tags` always carries the normalized string form (`"t1,t2,"` or
/// `"notag"`) rather than a list — the list form only exists at the
/// JSON-projection boundary (see [`BookmarkJson`]).
#[derive(Builder, Clone, Debug, PartialEq)]
#[builder(setter(into))]
pub struct Bookmark {
    pub id: Option<i32>,
    pub url: String,
    pub title: String,
    pub desc: String,
    pub tags: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_visit: DateTime<Utc>,
    #[builder(default = "0")]
    pub visit_count: i32,
    #[builder(default = "false")]
    pub favorite: bool,
    pub checksum: String,
    #[builder(default)]
    pub http_status_code: Option<i32>,
    #[builder(default)]
    pub http_status_text: Option<String>,
    #[builder(default)]
    pub is_active: Option<bool>,
    /// Compact `YYYYMMDDhhmmss` timestamp, per §3.
    #[builder(default)]
    pub last_status_checked: Option<String>,
}

/// The JSON projection written to / read from the mirror (§4.C, §6).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BookmarkJson {
    pub id: i32,
    pub url: String,
    pub tags: Vec<String>,
    pub title: String,
    pub desc: String,
    pub created_at: DateTime<Utc>,
    pub last_visit: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub visit_count: i32,
    pub favorite: bool,
    pub checksum: String,
}

impl Bookmark {
    /// Construct a brand-new bookmark: stamps `created_at`/`updated_at`
    /// to now, normalizes tags, and generates the checksum. Does not
    /// assign an id — that happens on insert.
    pub fn new(url: impl Into<String>, title: impl Into<String>, desc: impl Into<String>, raw_tags: &str) -> Self {
        let now = Utc::now();
        let url = url.into();
        let title = title.into();
        let desc = desc.into();
        let tags = tag::parse_tags(raw_tags);
        let checksum = hasher::checksum(&url, &title, &desc, &tags);
        Self {
            id: None,
            url,
            title,
            desc,
            tags,
            created_at: now,
            updated_at: now,
            last_visit: now,
            visit_count: 0,
            favorite: false,
            checksum,
            http_status_code: None,
            http_status_text: None,
            is_active: None,
            last_status_checked: None,
        }
    }

    /// Rewrite `checksum` from the current semantic fields (invariant 1).
    pub fn generate_checksum(&mut self) {
        self.checksum = hasher::checksum(&self.url, &self.title, &self.desc, &self.tags);
    }

    /// Validate the record per §4.C. Does not check the checksum — that
    /// is the caller's responsibility on read (invariant 1).
    pub fn validate(&self) -> DomainResult<()> {
        if self.url.is_empty() {
            return Err(DomainError::UrlEmpty);
        }
        if self.tags.is_empty() || self.tags == "," {
            return Err(DomainError::TagsEmpty);
        }
        Ok(())
    }

    /// Compare only the semantic fields the spec's `equals` names.
    pub fn equals(&self, other: &Bookmark) -> bool {
        self.url == other.url && self.tags == other.tags && self.title == other.title && self.desc == other.desc
    }

    /// `<domain_hash>/<checksum>` — the encrypted mirror's path shape.
    pub fn hash_path(&self) -> DomainResult<String> {
        Ok(format!("{}/{}", hasher::hash_domain(&self.url)?, self.checksum))
    }

    /// `<domain>/<url_hash>.json` — the plaintext mirror's path shape.
    pub fn json_path(&self) -> DomainResult<String> {
        Ok(format!("{}/{}.json", hasher::domain(&self.url)?, hasher::hash_url(&self.url)))
    }

    /// `<domain_hash>/<checksum>.gpg`.
    pub fn gpg_path(&self) -> DomainResult<String> {
        Ok(format!("{}.gpg", self.hash_path()?))
    }

    pub fn to_json(&self) -> BookmarkJson {
        BookmarkJson {
            id: self.id.unwrap_or(0),
            url: self.url.clone(),
            tags: tag::split_tags(&self.tags),
            title: self.title.clone(),
            desc: self.desc.clone(),
            created_at: self.created_at,
            last_visit: self.last_visit,
            updated_at: self.updated_at,
            visit_count: self.visit_count,
            favorite: self.favorite,
            checksum: self.checksum.clone(),
        }
    }

    pub fn from_json(json: BookmarkJson) -> Self {
        Self {
            id: Some(json.id),
            url: json.url,
            title: json.title,
            desc: json.desc,
            tags: tag::format_tag_list(&json.tags),
            created_at: json.created_at,
            updated_at: json.updated_at,
            last_visit: json.last_visit,
            visit_count: json.visit_count,
            favorite: json.favorite,
            checksum: json.checksum,
            http_status_code: None,
            http_status_text: None,
            is_active: None,
            last_status_checked: None,
        }
    }

    /// Verify invariant 1 against the checksum currently stored on the
    /// record; any read path that loads a bookmark must call this.
    pub fn verify_checksum(&self) -> DomainResult<()> {
        let expected = hasher::checksum(&self.url, &self.title, &self.desc, &self.tags);
        if expected != self.checksum {
            return Err(DomainError::InvalidChecksum(self.url.clone()));
        }
        Ok(())
    }

    pub fn record_visit(&mut self) {
        self.visit_count += 1;
        self.last_visit = Utc::now();
    }

    pub fn set_favorite(&mut self, favorite: bool) {
        self.favorite = favorite;
    }

    pub fn set_status(&mut self, code: i32, text: impl Into<String>, is_active: bool) {
        self.http_status_code = Some(code);
        self.http_status_text = Some(text.into());
        self.is_active = Some(is_active);
        self.last_status_checked = Some(Utc::now().format("%Y%m%d%H%M%S").to_string());
    }
}
