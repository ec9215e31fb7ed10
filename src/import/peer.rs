// src/import/peer.rs
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::domain::bookmark::Bookmark;
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::ports::collaborators::{GitProvider, Prompt};
use crate::domain::ports::repository::BookmarkRepository;
use crate::mirror::MirrorRepository;

use super::dedup::dedup;

const SUMMARY_FILE: &str = "summary.json";

/// `repo_stats` from a peer's `summary.json`, used to preview a
/// repository before committing to an import (§4.J, §6).
#[derive(Debug, Clone, Deserialize)]
pub struct RepoStats {
    pub name: String,
    pub bookmarks: i64,
    pub tags: i64,
    pub favorites: i64,
}

#[derive(Debug, Deserialize)]
struct Summary {
    repo_stats: RepoStats,
}

/// One importable subdirectory of a cloned peer repository: the
/// presence of `summary.json` is the repo marker.
#[derive(Debug, Clone)]
pub struct PeerRepo {
    pub path: PathBuf,
    pub stats: RepoStats,
}

/// Clones `url` into `dest` (delegated to the git collaborator) and
/// lists every directory — the root plus its immediate children —
/// carrying a `summary.json`, for the caller to preview before picking
/// one to import.
#[instrument(skip(git), level = "info")]
pub fn discover_peer_repos(git: &dyn GitProvider, url: &str, dest: &Path) -> DomainResult<Vec<PeerRepo>> {
    git.clone_repo(url, dest)?;

    let mut candidates = vec![dest.to_path_buf()];
    if dest.is_dir() {
        for entry in std::fs::read_dir(dest)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                candidates.push(entry.path());
            }
        }
    }

    let mut repos = Vec::new();
    for dir in candidates {
        let summary_path = dir.join(SUMMARY_FILE);
        if !summary_path.is_file() {
            continue;
        }
        let text = std::fs::read_to_string(&summary_path)?;
        match serde_json::from_str::<Summary>(&text) {
            Ok(summary) => repos.push(PeerRepo {
                path: dir,
                stats: summary.repo_stats,
            }),
            Err(e) => warn!(path = %summary_path.display(), error = %e, "unreadable summary.json, skipping"),
        }
    }
    info!(found = repos.len(), "discovered peer repositories");
    Ok(repos)
}

/// Imports `repo`'s bookmark tree into `store`, guarding the default
/// database from an unconfirmed overwrite (§4.J).
#[instrument(skip(store, prompt), level = "info", fields(repo = %repo.path.display()))]
pub fn import_peer_repo(
    repo: &PeerRepo,
    encrypted: bool,
    gpg_recipient: Option<&str>,
    store: &dyn BookmarkRepository,
    prompt: &dyn Prompt,
    default_db_name: &str,
    chosen_name: &str,
) -> DomainResult<Vec<Bookmark>> {
    if chosen_name == default_db_name
        && !prompt.confirm(&format!("'{chosen_name}' is the default database, overwrite it?"), false)?
    {
        return Err(DomainError::Other(format!(
            "import aborted: '{chosen_name}' collides with the default database"
        )));
    }

    let mirror = MirrorRepository::new(repo.path.clone(), encrypted, gpg_recipient.map(str::to_string));
    let candidates = mirror.load()?;
    debug!(candidates = candidates.len(), stats = ?repo.stats, "loaded peer repository tree");

    let fresh = dedup(store, candidates)?;
    if fresh.is_empty() {
        info!("all peer records already present, nothing to import");
        return Ok(Vec::new());
    }
    store.insert_many(&fresh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteStore;
    use tempfile::{tempdir, NamedTempFile};

    struct FakeGit;
    impl GitProvider for FakeGit {
        fn clone_repo(&self, _url: &str, dest: &Path) -> DomainResult<()> {
            std::fs::create_dir_all(dest)?;
            Ok(())
        }
    }

    struct AlwaysConfirm;
    impl Prompt for AlwaysConfirm {
        fn confirm(&self, _question: &str, _default: bool) -> DomainResult<bool> {
            Ok(true)
        }
    }

    struct NeverConfirm;
    impl Prompt for NeverConfirm {
        fn confirm(&self, _question: &str, _default: bool) -> DomainResult<bool> {
            Ok(false)
        }
    }

    fn new_store() -> (NamedTempFile, SqliteStore) {
        let file = NamedTempFile::new().unwrap();
        let store = SqliteStore::from_url(file.path().to_str().unwrap()).unwrap();
        (file, store)
    }

    #[test]
    fn discovers_root_and_child_dirs_carrying_summary_json() {
        let dest = tempdir().unwrap();
        std::fs::write(
            dest.path().join(SUMMARY_FILE),
            r#"{"repo_stats":{"name":"root","bookmarks":3,"tags":2,"favorites":1}}"#,
        )
        .unwrap();

        let child = dest.path().join("work");
        std::fs::create_dir_all(&child).unwrap();
        std::fs::write(
            child.join(SUMMARY_FILE),
            r#"{"repo_stats":{"name":"work","bookmarks":5,"tags":4,"favorites":0}}"#,
        )
        .unwrap();

        let repos = discover_peer_repos(&FakeGit, "git://peer", dest.path()).unwrap();
        assert_eq!(repos.len(), 2);
        assert!(repos.iter().any(|r| r.stats.name == "root"));
        assert!(repos.iter().any(|r| r.stats.name == "work"));
    }

    #[test]
    fn refuses_default_db_collision_without_confirmation() {
        let (_file, store) = new_store();
        let repo = PeerRepo {
            path: tempdir().unwrap().into_path(),
            stats: RepoStats {
                name: "peer".to_string(),
                bookmarks: 0,
                tags: 0,
                favorites: 0,
            },
        };

        let result = import_peer_repo(&repo, false, None, &store, &NeverConfirm, "gomarks.db", "gomarks.db");
        assert!(result.is_err());
    }

    #[test]
    fn allows_default_db_collision_when_confirmed() {
        let (_file, store) = new_store();
        let repo_dir = tempdir().unwrap();
        let repo = PeerRepo {
            path: repo_dir.path().to_path_buf(),
            stats: RepoStats {
                name: "peer".to_string(),
                bookmarks: 0,
                tags: 0,
                favorites: 0,
            },
        };

        let inserted =
            import_peer_repo(&repo, false, None, &store, &AlwaysConfirm, "gomarks.db", "gomarks.db").unwrap();
        assert!(inserted.is_empty());
    }
}
