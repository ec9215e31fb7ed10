// src/mirror/repository.rs
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::thread;

use ignore::WalkBuilder;
use tracing::{debug, info, instrument, warn};

use crate::domain::bookmark::Bookmark;
use crate::error_tracker::ErrorTracker;

use super::crypto;
use super::entry::MirrorEntry;
use super::error::{MirrorError, MirrorResult};

/// Projects a store onto a directory tree and back (§4.G). Export is a
/// simple serial loop (the spec places no concurrency requirement on
/// it); `load` fans out across `2 × cpu_count` worker threads over the
/// discovered file list, following the bounded-parallelism limit in §5,
/// and routes per-file failures into a shared [`ErrorTracker`] so one
/// bad file doesn't abort its siblings mid-walk.
#[derive(Clone, Debug)]
pub struct MirrorRepository {
    root: PathBuf,
    encrypted: bool,
    gpg_recipient: Option<String>,
}

impl MirrorRepository {
    pub fn new(root: impl Into<PathBuf>, encrypted: bool, gpg_recipient: Option<String>) -> Self {
        Self {
            root: root.into(),
            encrypted,
            gpg_recipient,
        }
    }

    #[instrument(skip_all, level = "info")]
    pub fn export(&self, bookmarks: &[Bookmark], force: bool) -> MirrorResult<usize> {
        let mut written = 0;
        for b in bookmarks {
            if self.write_one(b, force)? {
                written += 1;
            }
        }
        info!(written, total = bookmarks.len(), "mirror export complete");
        Ok(written)
    }

    fn write_one(&self, bookmark: &Bookmark, force: bool) -> MirrorResult<bool> {
        let entry = MirrorEntry::for_bookmark(&self.root, bookmark, self.encrypted)?;

        match &entry {
            MirrorEntry::Plaintext(path) => {
                if path.exists() {
                    let existing_raw = fs::read(path)?;
                    let existing: crate::domain::bookmark::BookmarkJson = serde_json::from_slice(&existing_raw)?;
                    if existing.checksum == bookmark.checksum && !force {
                        debug!(path = %path.display(), "mirror entry unchanged, skipping");
                        return Ok(false);
                    }
                }
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                let body = serde_json::to_vec_pretty(&bookmark.to_json())?;
                fs::write(path, body)?;
                Ok(true)
            }
            MirrorEntry::Encrypted(path) => {
                if path.exists() {
                    // The checksum is already baked into the filename; an
                    // existing file for this checksum is by definition
                    // identical content.
                    return Ok(false);
                }
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                let recipient = self
                    .gpg_recipient
                    .as_deref()
                    .ok_or_else(|| MirrorError::GpgFailed("no gpg recipient configured".to_string()))?;
                let plaintext = serde_json::to_vec(&bookmark.to_json())?;
                let ciphertext = crypto::encrypt(&plaintext, recipient)?;
                fs::write(path, ciphertext)?;
                Ok(true)
            }
        }
    }

    /// Walk `root`, classify every file the mirror owns, and load them
    /// in parallel. Returns bookmarks paired with the path they were
    /// read from (needed by `cleanup`, which otherwise has no way back
    /// from a one-way hash to a URL).
    #[instrument(skip_all, level = "info")]
    pub fn load_with_paths(&self) -> MirrorResult<Vec<(Bookmark, PathBuf)>> {
        let entries = self.discover();
        if entries.is_empty() {
            return Ok(Vec::new());
        }

        let worker_count = (thread::available_parallelism().map(|n| n.get()).unwrap_or(1) * 2).min(entries.len());
        let chunk_size = entries.len().div_ceil(worker_count.max(1));

        let tracker = ErrorTracker::new();
        let results: Mutex<Vec<(Bookmark, PathBuf)>> = Mutex::new(Vec::new());

        thread::scope(|scope| {
            for chunk in entries.chunks(chunk_size.max(1)) {
                scope.spawn(|| {
                    for entry in chunk {
                        match self.load_one(entry) {
                            Ok(bookmark) => results.lock().unwrap().push((bookmark, entry.path().clone())),
                            Err(e) => {
                                warn!(path = %entry.path().display(), error = %e, "failed to load mirror entry");
                                tracker.set(e.into());
                            }
                        }
                    }
                });
            }
        });

        if let Some(err) = tracker.take() {
            return Err(MirrorError::Domain(err));
        }

        Ok(results.into_inner().unwrap())
    }

    pub fn load(&self) -> MirrorResult<Vec<Bookmark>> {
        Ok(self.load_with_paths()?.into_iter().map(|(b, _)| b).collect())
    }

    fn discover(&self) -> Vec<MirrorEntry> {
        if !self.root.exists() {
            return Vec::new();
        }
        let walker = WalkBuilder::new(&self.root).hidden(false).git_ignore(true).git_exclude(true).build();

        walker
            .filter_map(|r| r.ok())
            .filter(|e| e.path().is_file())
            .filter_map(|e| MirrorEntry::classify(e.path()))
            .collect()
    }

    fn load_one(&self, entry: &MirrorEntry) -> MirrorResult<Bookmark> {
        let json_bytes = match entry {
            MirrorEntry::Plaintext(path) => fs::read(path)?,
            MirrorEntry::Encrypted(path) => crypto::decrypt(&fs::read(path)?)?,
        };
        let json: crate::domain::bookmark::BookmarkJson = serde_json::from_slice(&json_bytes)?;
        let bookmark = Bookmark::from_json(json);
        bookmark.verify_checksum().map_err(|_| {
            MirrorError::InvalidChecksum(entry.path().display().to_string())
        })?;
        Ok(bookmark)
    }

    /// Records from `store` that are new to `tree` or whose checksum has
    /// diverged from the tree's copy — i.e. need (re-)exporting.
    pub fn find_changed(store: &[Bookmark], tree: &[Bookmark]) -> Vec<Bookmark> {
        let tree_checksums: std::collections::HashMap<&str, &str> =
            tree.iter().map(|b| (b.url.as_str(), b.checksum.as_str())).collect();

        store
            .iter()
            .filter(|b| tree_checksums.get(b.url.as_str()) != Some(&b.checksum.as_str()))
            .cloned()
            .collect()
    }

    /// Removes tree files whose URL is no longer in `store_urls`; if a
    /// directory ends up empty afterward, removes the directory too.
    #[instrument(skip_all, level = "info")]
    pub fn cleanup(&self, tree: &[(Bookmark, PathBuf)], store_urls: &HashSet<String>) -> MirrorResult<usize> {
        let mut removed = 0;
        let mut touched_dirs = HashSet::new();

        for (bookmark, path) in tree {
            if !store_urls.contains(&bookmark.url) {
                if let Some(parent) = path.parent() {
                    touched_dirs.insert(parent.to_path_buf());
                }
                fs::remove_file(path)?;
                removed += 1;
            }
        }

        for dir in touched_dirs {
            if is_empty_dir(&dir) {
                fs::remove_dir(&dir)?;
            }
        }

        Ok(removed)
    }
}

fn is_empty_dir(dir: &Path) -> bool {
    fs::read_dir(dir).map(|mut it| it.next().is_none()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn bm(url: &str) -> Bookmark {
        Bookmark::new(url, "T", "D", "go")
    }

    #[test]
    fn export_then_load_round_trips_plaintext() {
        let dir = tempdir().unwrap();
        let repo = MirrorRepository::new(dir.path(), false, None);

        let bookmarks = vec![bm("https://a.example/x"), bm("https://b.example/y")];
        let written = repo.export(&bookmarks, false).unwrap();
        assert_eq!(written, 2);

        let loaded = repo.load().unwrap();
        assert_eq!(loaded.len(), 2);
        let urls: HashSet<_> = loaded.iter().map(|b| b.url.clone()).collect();
        assert!(urls.contains("https://a.example/x"));
        assert!(urls.contains("https://b.example/y"));
    }

    #[test]
    fn export_skips_identical_and_overwrites_changed() {
        let dir = tempdir().unwrap();
        let repo = MirrorRepository::new(dir.path(), false, None);
        let mut b = bm("https://a.example/x");

        assert_eq!(repo.export(&[b.clone()], false).unwrap(), 1);
        assert_eq!(repo.export(&[b.clone()], false).unwrap(), 0);

        b.title = "Changed".to_string();
        b.generate_checksum();
        assert_eq!(repo.export(&[b], false).unwrap(), 1);
    }

    #[test]
    fn load_fails_on_tampered_checksum() {
        let dir = tempdir().unwrap();
        let repo = MirrorRepository::new(dir.path(), false, None);
        let b = bm("https://a.example/x");
        repo.export(&[b.clone()], false).unwrap();

        let path = dir.path().join(b.json_path().unwrap());
        let mut json: crate::domain::bookmark::BookmarkJson =
            serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        json.checksum = "00000000".to_string();
        fs::write(&path, serde_json::to_vec(&json).unwrap()).unwrap();

        assert!(matches!(repo.load(), Err(MirrorError::InvalidChecksum(_))));
    }

    #[test]
    fn cleanup_removes_files_absent_from_store_and_prunes_empty_dirs() {
        let dir = tempdir().unwrap();
        let repo = MirrorRepository::new(dir.path(), false, None);
        let bookmarks = vec![bm("https://a.example/x")];
        repo.export(&bookmarks, false).unwrap();

        let tree = repo.load_with_paths().unwrap();
        let store_urls = HashSet::new(); // nothing in the store anymore
        let removed = repo.cleanup(&tree, &store_urls).unwrap();
        assert_eq!(removed, 1);
        assert!(repo.load().unwrap().is_empty());
    }
}
