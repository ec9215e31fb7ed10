// src/mirror/entry.rs
use std::path::PathBuf;

use crate::domain::bookmark::Bookmark;
use crate::domain::error::DomainResult;

/// Where a bookmark's mirror file lives and in which format (§3, §4.G).
#[derive(Debug, Clone, PartialEq)]
pub enum MirrorEntry {
    /// `<root>/<domain>/<url_hash>.json`.
    Plaintext(PathBuf),
    /// `<root>/<domain_hash>/<checksum>.gpg`.
    Encrypted(PathBuf),
}

impl MirrorEntry {
    pub fn path(&self) -> &PathBuf {
        match self {
            MirrorEntry::Plaintext(p) | MirrorEntry::Encrypted(p) => p,
        }
    }

    pub fn for_bookmark(root: &std::path::Path, bookmark: &Bookmark, encrypted: bool) -> DomainResult<Self> {
        if encrypted {
            Ok(MirrorEntry::Encrypted(root.join(bookmark.gpg_path()?)))
        } else {
            Ok(MirrorEntry::Plaintext(root.join(bookmark.json_path()?)))
        }
    }

    /// Classify a path discovered by the mirror's tree walk, or `None`
    /// for any extension the mirror doesn't own.
    pub fn classify(path: &std::path::Path) -> Option<Self> {
        match path.extension().and_then(|s| s.to_str()) {
            Some("json") => Some(MirrorEntry::Plaintext(path.to_path_buf())),
            Some("gpg") => Some(MirrorEntry::Encrypted(path.to_path_buf())),
            _ => None,
        }
    }
}
