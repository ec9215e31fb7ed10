// tests/scenarios.rs
//
// End-to-end scenarios exercising the public surface across components
// rather than a single module in isolation.

use gomarks::concurrency::CancellationToken;
use gomarks::domain::bookmark::Bookmark;
use gomarks::domain::hasher;
use gomarks::domain::ports::repository::BookmarkRepository;
use gomarks::import;
use gomarks::mirror::{MirrorError, MirrorRepository};
use gomarks::status::{ProbeFailure, Prober, StatusPipeline};
use gomarks::store::SqliteStore;

use async_trait::async_trait;
use std::collections::HashMap;
use tempfile::{tempdir, NamedTempFile};

fn new_store() -> (NamedTempFile, SqliteStore) {
    let file = NamedTempFile::new().unwrap();
    let store = SqliteStore::from_url(file.path().to_str().unwrap()).unwrap();
    (file, store)
}

#[test]
fn scenario_1_insert_and_query() {
    let (_file, store) = new_store();

    let bookmark = Bookmark::new("https://a.example/x", "T", "D", " go , rust ");
    assert_eq!(bookmark.tags, "go,rust,");

    let inserted = store.insert_one(&bookmark).unwrap();
    assert_eq!(inserted.id, Some(1));

    let found = store.by_query("RU").unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, Some(1));
    assert_eq!(found[0].tags, "go,rust,");

    let expected_checksum = hasher::checksum("https://a.example/x", "T", "D", "go,rust,");
    assert_eq!(found[0].checksum, expected_checksum);
}

#[test]
fn scenario_2_reorder_after_deletes() {
    let (_file, store) = new_store();

    for n in 1..=5 {
        store
            .insert_one(&Bookmark::new(format!("https://x/{n}"), "T", "D", "go"))
            .unwrap();
    }

    store.delete_one("https://x/2").unwrap();
    store.delete_one("https://x/4").unwrap();

    store.reorder_ids(&CancellationToken::new()).unwrap();

    let mut ids: Vec<i32> = store.all().unwrap().into_iter().filter_map(|b| b.id).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[test]
fn scenario_3_tag_orphan_cleanup() {
    let (_file, store) = new_store();

    store.insert_one(&Bookmark::new("u1", "T", "D", "only")).unwrap();
    assert!(store.tags_counter().unwrap().contains_key("only"));

    store.delete_one("u1").unwrap();

    let counts = store.tags_counter().unwrap();
    assert!(!counts.contains_key("only"));
}

#[test]
fn scenario_4_checksum_validation_on_mirror_load() {
    let root = tempdir().unwrap();
    let mirror = MirrorRepository::new(root.path(), false, None);

    let mut bookmark = Bookmark::new("https://tampered/", "T", "D", "go");
    let path = root.path().join(bookmark.json_path().unwrap());
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();

    bookmark.checksum = "00000000".to_string();
    let mut json = bookmark.to_json();
    json.checksum = "00000000".to_string();
    std::fs::write(&path, serde_json::to_vec_pretty(&json).unwrap()).unwrap();

    let err = mirror.load().unwrap_err();
    assert!(matches!(err, MirrorError::InvalidChecksum(p) if p == path.display().to_string()));
}

struct FixedProber(HashMap<String, i32>);

#[async_trait]
impl Prober for FixedProber {
    async fn probe(&self, url: &str) -> Result<i32, ProbeFailure> {
        Ok(*self.0.get(url).unwrap_or(&200))
    }
}

#[tokio::test]
async fn scenario_5_status_pipeline_deterministic_buckets() {
    let mut responses = HashMap::new();
    responses.insert("https://u2xx/".to_string(), 200);
    responses.insert("https://u4xx/".to_string(), 404);
    responses.insert("https://u5xx/".to_string(), 500);

    let pipeline = StatusPipeline::with_prober(std::sync::Arc::new(FixedProber(responses)));
    let bookmarks = vec![
        Bookmark::new("https://u2xx/", "T", "D", "go"),
        Bookmark::new("https://u4xx/", "T", "D", "go"),
        Bookmark::new("https://u5xx/", "T", "D", "go"),
    ];

    let report = pipeline.run(&bookmarks).await;
    let lines = report.summary_lines();

    assert!(lines.contains(&"1 URLs returned 'OK' (200)".to_string()));
    assert!(lines.contains(&"1 URLs returned 'Not Found' (404)".to_string()));
    assert!(lines.contains(&"1 URLs returned 'Internal Server Error' (500)".to_string()));
}

#[test]
fn scenario_6_deduplicated_import() {
    let (_file, store) = new_store();
    store.insert_one(&Bookmark::new("https://a/", "A", "D", "go")).unwrap();

    let candidates = vec![
        Bookmark::new("https://a/", "A dup", "D", "go"),
        Bookmark::new("https://b/", "B", "D", "go"),
    ];

    let fresh = import::dedup(&store, candidates).unwrap();
    store.insert_many(&fresh).unwrap();

    assert_eq!(store.all().unwrap().len(), 2);
}

#[test]
fn property_round_trip_through_json_projection() {
    let bookmark = Bookmark::new("https://p/", "T", "D", "go,rust");
    let round_tripped = Bookmark::from_json(bookmark.to_json());
    assert!(bookmark.equals(&round_tripped));
}

#[test]
fn property_parse_tags_is_idempotent_via_bookmark_construction() {
    let bookmark = Bookmark::new("https://p2/", "T", "D", " go , rust , go ");
    let twice = gomarks::domain::tag::parse_tags(&bookmark.tags);
    assert_eq!(bookmark.tags, twice);
}
