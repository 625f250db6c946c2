//! In-memory fakes for pipeline tests: no network, no database.
//! Compiled only with the `test-support` feature.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use factcheck_client::Claim;
use hoaxwatch_common::{Platform, Prediction, Record};

use crate::classify::Classifier;
use crate::monitor::ClaimSearch;
use crate::sources::SourceAdapter;
use crate::store::{RecordStore, StoredRecord};

// --- Store ---

/// RecordStore over a HashMap with the same merge semantics as the Postgres
/// store: url is the identity, an existing row keeps its capture fields and
/// takes the incoming enrichment fields.
#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<HashMap<String, StoredRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, url: &str) -> Option<StoredRecord> {
        self.rows.lock().unwrap().get(url).cloned()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn upsert(&self, records: &[Record]) -> Result<()> {
        let mut rows = self.rows.lock().unwrap();
        for record in records {
            if let Some(existing) = rows.get_mut(&record.url) {
                existing.predicted_label = record.predicted_label.map(|l| l.to_string());
                existing.prediction_score = record.prediction_score;
                existing.fact_check_url = record.fact_check_url.clone();
                existing.fact_check_rating = record.fact_check_rating.clone();
                existing.fact_check_publisher = record.fact_check_publisher.clone();
            } else {
                rows.insert(
                    record.url.clone(),
                    StoredRecord {
                        id: Uuid::new_v4(),
                        platform: record.platform.to_string(),
                        keyword: record.keyword.clone(),
                        content: record.content.clone(),
                        url: record.url.clone(),
                        created_at: record.created_at,
                        author: record.author.clone(),
                        predicted_label: record.predicted_label.map(|l| l.to_string()),
                        prediction_score: record.prediction_score,
                        fact_check_url: record.fact_check_url.clone(),
                        fact_check_rating: record.fact_check_rating.clone(),
                        fact_check_publisher: record.fact_check_publisher.clone(),
                        inserted_at: Utc::now(),
                    },
                );
            }
        }
        Ok(())
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<StoredRecord>> {
        let mut rows: Vec<StoredRecord> = self.rows.lock().unwrap().values().cloned().collect();
        rows.sort_by(|a, b| b.inserted_at.cmp(&a.inserted_at));
        rows.truncate(limit as usize);
        Ok(rows)
    }
}

// --- Sources ---

/// Adapter that returns a fixed set of records.
pub struct StubSource {
    platform: Platform,
    records: Vec<Record>,
}

impl StubSource {
    pub fn new(platform: Platform, records: Vec<Record>) -> Self {
        Self { platform, records }
    }
}

#[async_trait]
impl SourceAdapter for StubSource {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn fetch(&self, _keywords: &[String]) -> Result<Vec<Record>> {
        Ok(self.records.clone())
    }
}

/// Adapter whose fetch always errors, for orchestrator-tolerance tests.
pub struct FailingSource {
    platform: Platform,
}

impl FailingSource {
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }
}

#[async_trait]
impl SourceAdapter for FailingSource {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn fetch(&self, _keywords: &[String]) -> Result<Vec<Record>> {
        anyhow::bail!("stub source down")
    }
}

// --- Classifier ---

/// Classifier with canned verdicts keyed by exact content. Blank input
/// yields `Prediction::none()` per the collaborator contract; unknown
/// content defaults to a confident not_hoax.
pub struct StubClassifier {
    verdicts: HashMap<String, Prediction>,
}

impl StubClassifier {
    pub fn new(verdicts: HashMap<String, Prediction>) -> Self {
        Self { verdicts }
    }
}

#[async_trait]
impl Classifier for StubClassifier {
    async fn classify(&self, text: &str) -> Result<Prediction> {
        if text.trim().is_empty() {
            return Ok(Prediction::none());
        }
        Ok(self.verdicts.get(text).copied().unwrap_or(Prediction {
            label: Some(hoaxwatch_common::Label::NotHoax),
            score: Some(0.9),
        }))
    }
}

// --- Claim search ---

/// Claim search that returns a fixed candidate list and remembers every
/// query it was asked, so tests can assert the keyword fallback.
#[derive(Default)]
pub struct StubClaimSearch {
    claims: Vec<Claim>,
    queries: Mutex<Vec<String>>,
}

impl StubClaimSearch {
    pub fn new(claims: Vec<Claim>) -> Self {
        Self {
            claims,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl ClaimSearch for StubClaimSearch {
    async fn search(&self, query: &str) -> Vec<Claim> {
        self.queries.lock().unwrap().push(query.to_string());
        self.claims.clone()
    }
}
