// src/import/browser.rs
use tracing::{info, instrument};

use crate::domain::bookmark::Bookmark;
use crate::domain::error::DomainResult;
use crate::domain::ports::collaborators::{Browser, Scraper};
use crate::domain::ports::repository::BookmarkRepository;

use super::dedup::dedup;

/// Imports from an installed browser (§4.J): load via the collaborator,
/// drop anything already present, fill in missing title/desc with a
/// best-effort scrape, then insert the remainder in one transaction.
#[instrument(skip_all, level = "info")]
pub fn from_browser(
    browser: &dyn Browser,
    scraper: &dyn Scraper,
    store: &dyn BookmarkRepository,
    force: bool,
) -> DomainResult<Vec<Bookmark>> {
    let candidates = browser.import(force)?;
    let fresh = dedup(store, candidates)?;
    if fresh.is_empty() {
        info!("nothing new to import from browser");
        return Ok(Vec::new());
    }

    let enriched: Vec<Bookmark> = fresh.into_iter().map(|b| enrich_missing_metadata(b, scraper)).collect();

    let inserted = store.insert_many(&enriched)?;
    info!(inserted = inserted.len(), "imported bookmarks from browser");
    Ok(inserted)
}

fn enrich_missing_metadata(mut bookmark: Bookmark, scraper: &dyn Scraper) -> Bookmark {
    if !bookmark.title.is_empty() && !bookmark.desc.is_empty() {
        return bookmark;
    }
    let meta = scraper.fetch(&bookmark.url);
    if bookmark.title.is_empty() {
        bookmark.title = meta.title;
    }
    if bookmark.desc.is_empty() {
        bookmark.desc = meta.desc;
    }
    bookmark.generate_checksum();
    bookmark
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::collaborators::ScrapedMetadata;
    use crate::store::SqliteStore;
    use tempfile::NamedTempFile;

    struct FakeBrowser(Vec<Bookmark>);
    impl Browser for FakeBrowser {
        fn import(&self, _force: bool) -> DomainResult<Vec<Bookmark>> {
            Ok(self.0.clone())
        }
    }

    struct FakeScraper;
    impl Scraper for FakeScraper {
        fn fetch(&self, _url: &str) -> ScrapedMetadata {
            ScrapedMetadata {
                title: "scraped title".to_string(),
                desc: "scraped desc".to_string(),
            }
        }
    }

    fn new_store() -> (NamedTempFile, SqliteStore) {
        let file = NamedTempFile::new().unwrap();
        let store = SqliteStore::from_url(file.path().to_str().unwrap()).unwrap();
        (file, store)
    }

    #[test]
    fn fills_missing_title_and_desc_via_scraper_then_inserts() {
        let (_file, store) = new_store();
        let browser = FakeBrowser(vec![Bookmark::new("https://new/", "", "", "go")]);

        let inserted = from_browser(&browser, &FakeScraper, &store, false).unwrap();

        assert_eq!(inserted.len(), 1);
        assert_eq!(inserted[0].title, "scraped title");
        assert_eq!(inserted[0].desc, "scraped desc");
    }

    #[test]
    fn skips_candidates_already_in_store() {
        let (_file, store) = new_store();
        let existing = Bookmark::new("https://a/", "A", "d", "go");
        store.insert_one(&existing).unwrap();

        let browser = FakeBrowser(vec![Bookmark::new("https://a/", "A", "d", "go")]);
        let inserted = from_browser(&browser, &FakeScraper, &store, false).unwrap();

        assert!(inserted.is_empty());
    }
}
