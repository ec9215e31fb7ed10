// src/collaborators/scraper.rs
use reqwest::blocking::Client;
use select::document::Document;
use select::predicate::{Attr, Name};
use tracing::{debug, warn};

use crate::domain::ports::collaborators::{ScrapedMetadata, Scraper};

const FALLBACK_TITLE: &str = "untitled (unfiled)";
const FALLBACK_DESC: &str = "no description available (unfiled)";

/// Fetches `<title>`/meta-description from a URL. Best-effort per §6:
/// any network or parse failure degrades to the fallback strings rather
/// than propagating, following the same `select::Document` scrape the
/// teacher's URL-detail loader uses.
#[derive(Debug, Default)]
pub struct HttpScraper;

impl Scraper for HttpScraper {
    fn fetch(&self, url: &str) -> ScrapedMetadata {
        match try_fetch(url) {
            Ok(meta) => meta,
            Err(e) => {
                warn!(url, error = %e, "scrape failed, using fallback metadata");
                ScrapedMetadata {
                    title: FALLBACK_TITLE.to_string(),
                    desc: FALLBACK_DESC.to_string(),
                }
            }
        }
    }
}

fn try_fetch(url: &str) -> Result<ScrapedMetadata, reqwest::Error> {
    let client = Client::new();
    let body = client.get(url).send()?.text()?;
    let document = Document::from(body.as_str());

    let title = document
        .find(Name("title"))
        .next()
        .map(|n| n.text().trim().to_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| FALLBACK_TITLE.to_string());

    let desc = document
        .find(Attr("name", "description"))
        .next()
        .and_then(|n| n.attr("content"))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(FALLBACK_DESC)
        .to_string();

    debug!(url, %title, "scraped metadata");
    Ok(ScrapedMetadata { title, desc })
}
