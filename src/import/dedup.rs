// src/import/dedup.rs
use tracing::{debug, instrument};

use crate::domain::bookmark::Bookmark;
use crate::domain::error::DomainResult;
use crate::domain::ports::repository::BookmarkRepository;

/// Retains only candidates whose URL is absent from `store`. An empty
/// result is a sentinel the caller checks for (§4.J), not an error.
#[instrument(skip_all, level = "debug", fields(n = candidates.len()))]
pub fn dedup(store: &dyn BookmarkRepository, candidates: Vec<Bookmark>) -> DomainResult<Vec<Bookmark>> {
    let mut kept = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let (_, exists) = store.has(&candidate.url)?;
        if !exists {
            kept.push(candidate);
        }
    }
    debug!(kept = kept.len(), "deduplicated candidate set");
    Ok(kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteStore;
    use tempfile::NamedTempFile;

    fn new_store() -> (NamedTempFile, SqliteStore) {
        let file = NamedTempFile::new().unwrap();
        let store = SqliteStore::from_url(file.path().to_str().unwrap()).unwrap();
        (file, store)
    }

    #[test]
    fn drops_candidates_already_present_in_store() {
        let (_file, store) = new_store();
        let existing = Bookmark::new("https://a/", "A", "", "go");
        store.insert_one(&existing).unwrap();

        let candidates = vec![
            Bookmark::new("https://a/", "A dup", "", "go"),
            Bookmark::new("https://b/", "B", "", "go"),
        ];

        let kept = dedup(&store, candidates).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].url, "https://b/");
    }

    #[test]
    fn empty_candidate_set_yields_empty_result_not_an_error() {
        let (_file, store) = new_store();
        let kept = dedup(&store, Vec::new()).unwrap();
        assert!(kept.is_empty());
    }
}
