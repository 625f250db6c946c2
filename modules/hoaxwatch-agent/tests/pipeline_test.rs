//! Pipeline tests over in-memory fakes: no network, no database.
//!
//! Each test wires a Monitor from stub sources, a canned classifier, a
//! recording claim-search fake, and the MemoryStore, then asserts on stored
//! rows and run stats.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;

use factcheck_client::{Claim, ClaimReview, Publisher};
use hoaxwatch_agent::monitor::{FactChecker, Monitor};
use hoaxwatch_agent::testing::{
    FailingSource, MemoryStore, StubClaimSearch, StubClassifier, StubSource,
};
use hoaxwatch_common::{Label, Platform, Prediction, Record};

fn record(platform: Platform, keyword: &str, content: &str, url: &str) -> Record {
    Record::new(platform, keyword, content, url, Utc::now(), None)
}

fn hoax(score: f64) -> Prediction {
    Prediction {
        label: Some(Label::Hoax),
        score: Some(score),
    }
}

fn not_hoax(score: f64) -> Prediction {
    Prediction {
        label: Some(Label::NotHoax),
        score: Some(score),
    }
}

fn review_claim(text: &str, review_url: &str) -> Claim {
    Claim {
        text: Some(text.to_string()),
        claim_review: vec![ClaimReview {
            url: Some(review_url.to_string()),
            title: Some("Review title".to_string()),
            textual_rating: Some("Hoax".to_string()),
            publisher: Some(Publisher {
                name: Some("Turn Back Hoax".to_string()),
                site: None,
            }),
            review_date: None,
        }],
        ..Claim::default()
    }
}

#[tokio::test]
async fn full_run_enriches_hoaxes_and_persists_everything() {
    // Record A: hoax with a matching fact-check candidate. Its content
    // contains vocabulary terms, so the claim query is "vaksin covid chip".
    let a = record(
        Platform::News,
        "vaksin",
        "Heboh vaksin covid berisi chip",
        "https://news.example/a",
    );
    // Record B: not a hoax; must never reach the fact-check step.
    let b = record(
        Platform::News,
        "pemilu",
        "Hasil resmi pemilu diumumkan",
        "https://news.example/b",
    );

    let verdicts = HashMap::from([
        (a.content.clone(), hoax(0.92)),
        (b.content.clone(), not_hoax(0.88)),
    ]);

    let search = Arc::new(StubClaimSearch::new(vec![review_claim(
        "vaksin covid chip",
        "https://factcheck.example/review/a",
    )]));
    let store = Arc::new(MemoryStore::new());

    let monitor = Monitor::new(
        vec![Box::new(StubSource::new(Platform::News, vec![a, b]))],
        Box::new(StubClassifier::new(verdicts)),
        Some(FactChecker::new(Box::new(search.clone()))),
        Box::new(store.clone()),
        vec!["vaksin".to_string(), "pemilu".to_string()],
    );

    let stats = monitor.run_job().await.unwrap();

    assert_eq!(stats.fetched, 2);
    assert_eq!(stats.hoaxes, 1);
    assert_eq!(stats.fact_checked, 1);
    assert_eq!(stats.fact_check_missing, 0);

    assert_eq!(store.len(), 2);
    let row_a = store.get("https://news.example/a").unwrap();
    assert_eq!(row_a.predicted_label.as_deref(), Some("hoax"));
    assert_eq!(
        row_a.fact_check_url.as_deref(),
        Some("https://factcheck.example/review/a")
    );
    assert_eq!(row_a.fact_check_rating.as_deref(), Some("Hoax"));
    assert_eq!(row_a.fact_check_publisher.as_deref(), Some("Turn Back Hoax"));

    let row_b = store.get("https://news.example/b").unwrap();
    assert_eq!(row_b.predicted_label.as_deref(), Some("not_hoax"));
    assert!(row_b.fact_check_url.is_none());
    assert!(row_b.fact_check_rating.is_none());
    assert!(row_b.fact_check_publisher.is_none());

    // Only the hoax record triggered a claim search, with the extracted
    // vocabulary terms as the query.
    assert_eq!(search.queries(), vec!["vaksin covid chip".to_string()]);

    use hoaxwatch_agent::store::RecordStore;
    let recent = store.list_recent(10).await.unwrap();
    assert_eq!(recent.len(), 2);
    let recent = store.list_recent(1).await.unwrap();
    assert_eq!(recent.len(), 1);
}

#[tokio::test]
async fn reingested_url_merges_enrichment_and_keeps_capture() {
    let store = Arc::new(MemoryStore::new());

    // First pass: captured content, no enrichment yet.
    let first = record(
        Platform::Forum,
        "hoaks",
        "Isi asli kiriman",
        "https://forum.example/t/1",
    );

    let monitor = Monitor::new(
        vec![Box::new(StubSource::new(Platform::Forum, vec![first]))],
        Box::new(StubClassifier::new(HashMap::new())),
        None,
        Box::new(store.clone()),
        vec!["hoaks".to_string()],
    );
    monitor.run_job().await.unwrap();

    // Second pass: same url, republished content, hoax verdict this time.
    let second = record(
        Platform::Forum,
        "hoaks",
        "Isi yang sudah diedit",
        "https://forum.example/t/1",
    );
    let verdicts = HashMap::from([(second.content.clone(), hoax(0.95))]);

    let monitor = Monitor::new(
        vec![Box::new(StubSource::new(Platform::Forum, vec![second]))],
        Box::new(StubClassifier::new(verdicts)),
        None,
        Box::new(store.clone()),
        vec!["hoaks".to_string()],
    );
    monitor.run_job().await.unwrap();

    assert_eq!(store.len(), 1, "one row per url");
    let row = store.get("https://forum.example/t/1").unwrap();
    // Enrichment from the second pass, capture from the first.
    assert_eq!(row.predicted_label.as_deref(), Some("hoax"));
    assert_eq!(row.content, "Isi asli kiriman");
}

#[tokio::test]
async fn claim_query_falls_back_to_keyword() {
    // Content carries none of the vocabulary terms, so the fact-check query
    // must be the record's originating keyword.
    let r = record(
        Platform::Microblog,
        "berita aneh",
        "Kabar yang tidak mengandung istilah kamus",
        "https://mb.example/u/status/1",
    );
    let verdicts = HashMap::from([(r.content.clone(), hoax(0.9))]);

    let search = Arc::new(StubClaimSearch::new(Vec::new()));
    let store = Arc::new(MemoryStore::new());

    let monitor = Monitor::new(
        vec![Box::new(StubSource::new(Platform::Microblog, vec![r]))],
        Box::new(StubClassifier::new(verdicts)),
        Some(FactChecker::new(Box::new(search.clone())).with_threshold(50)),
        Box::new(store.clone()),
        vec!["berita aneh".to_string()],
    );

    let stats = monitor.run_job().await.unwrap();

    assert_eq!(search.queries(), vec!["berita aneh".to_string()]);
    assert_eq!(stats.fact_checked, 0);
    assert_eq!(stats.fact_check_missing, 1);
    // No match is not an error: the record persists with null fact-check
    // fields.
    let row = store.get("https://mb.example/u/status/1").unwrap();
    assert!(row.fact_check_url.is_none());
}

#[tokio::test]
async fn blank_content_is_unlabeled_and_never_fact_checked() {
    let r = record(Platform::News, "vaksin", "   ", "https://news.example/blank");

    let search = Arc::new(StubClaimSearch::new(Vec::new()));
    let store = Arc::new(MemoryStore::new());

    let monitor = Monitor::new(
        vec![Box::new(StubSource::new(Platform::News, vec![r]))],
        Box::new(StubClassifier::new(HashMap::new())),
        Some(FactChecker::new(Box::new(search.clone()))),
        Box::new(store.clone()),
        vec!["vaksin".to_string()],
    );

    let stats = monitor.run_job().await.unwrap();

    assert_eq!(stats.hoaxes, 0);
    assert!(search.queries().is_empty(), "no fact-check for unlabeled records");
    let row = store.get("https://news.example/blank").unwrap();
    assert!(row.predicted_label.is_none());
    assert!(row.prediction_score.is_none());
}

#[tokio::test]
async fn failing_source_does_not_abort_the_run() {
    let ok = record(
        Platform::News,
        "vaksin",
        "Artikel biasa",
        "https://news.example/ok",
    );

    let store = Arc::new(MemoryStore::new());
    let monitor = Monitor::new(
        vec![
            Box::new(FailingSource::new(Platform::Microblog)),
            Box::new(StubSource::new(Platform::News, vec![ok])),
        ],
        Box::new(StubClassifier::new(HashMap::new())),
        None,
        Box::new(store.clone()),
        vec!["vaksin".to_string()],
    );

    let stats = monitor.run_job().await.unwrap();

    assert_eq!(stats.fetched, 1);
    assert_eq!(stats.by_platform, [1, 0, 0]);
    assert_eq!(store.len(), 1);
}
