use anyhow::Result;
use async_trait::async_trait;
use tracing::{error, info, warn};

use factcheck_client::{Claim, FactCheckClient};
use hoaxwatch_common::{Platform, Record};

use crate::claims::{self, best_match};
use crate::classify::Classifier;
use crate::sources::SourceAdapter;
use crate::store::RecordStore;

/// Claim-search collaborator seam. Implementations are tolerant: failures
/// surface as an empty candidate list, never as an error.
#[async_trait]
pub trait ClaimSearch: Send + Sync {
    async fn search(&self, query: &str) -> Vec<Claim>;
}

#[async_trait]
impl ClaimSearch for FactCheckClient {
    async fn search(&self, query: &str) -> Vec<Claim> {
        FactCheckClient::search(self, query).await
    }
}

#[async_trait]
impl<T: ClaimSearch + ?Sized> ClaimSearch for std::sync::Arc<T> {
    async fn search(&self, query: &str) -> Vec<Claim> {
        (**self).search(query).await
    }
}

/// Fact-check lookup: claim search plus similarity-scored candidate
/// selection.
pub struct FactChecker {
    searcher: Box<dyn ClaimSearch>,
    similarity_threshold: u32,
}

impl FactChecker {
    pub fn new(searcher: Box<dyn ClaimSearch>) -> Self {
        Self {
            searcher,
            similarity_threshold: claims::DEFAULT_SIMILARITY_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, threshold: u32) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    /// Look up one hoax-labeled record and copy the winning review's fields
    /// onto it. Returns whether a match was applied; absence of a match is
    /// not an error.
    async fn verify(&self, record: &mut Record) -> bool {
        let terms = claims::extract_claim_terms(&record.content);
        // An empty query is meaningless; fall back to the keyword that
        // produced the record.
        let query = if terms.is_empty() {
            record.keyword.clone()
        } else {
            terms
        };

        info!(url = %record.url, query = %query, "Fact-checking suspected hoax");
        let candidates = self.searcher.search(&query).await;

        match best_match(&query, &candidates, self.similarity_threshold) {
            Some(review) => {
                info!(
                    url = %record.url,
                    review_url = review.url.as_deref().unwrap_or(""),
                    similarity = review.similarity,
                    "Fact-check match found"
                );
                record.fact_check_url = review.url;
                record.fact_check_rating = review.rating;
                record.fact_check_publisher = review.publisher;
                true
            }
            None => {
                info!(url = %record.url, query = %query, "No fact-check match");
                false
            }
        }
    }
}

/// Stats from one pipeline run.
#[derive(Debug, Default)]
pub struct RunStats {
    pub fetched: u32,
    pub by_platform: [u32; 3], // News, Microblog, Forum
    pub hoaxes: u32,
    pub fact_checked: u32,
    pub fact_check_missing: u32,
    pub classifier_failures: u32,
}

impl RunStats {
    fn count_platform(&mut self, platform: Platform, n: u32) {
        let idx = match platform {
            Platform::News => 0,
            Platform::Microblog => 1,
            Platform::Forum => 2,
        };
        self.by_platform[idx] += n;
    }
}

impl std::fmt::Display for RunStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n=== Run Complete ===")?;
        writeln!(f, "Records fetched:    {}", self.fetched)?;
        writeln!(f, "\nBy platform:")?;
        writeln!(f, "  News:      {}", self.by_platform[0])?;
        writeln!(f, "  Microblog: {}", self.by_platform[1])?;
        writeln!(f, "  Forum:     {}", self.by_platform[2])?;
        writeln!(f, "\nHoax predictions:   {}", self.hoaxes)?;
        writeln!(f, "Fact-check found:   {}", self.fact_checked)?;
        writeln!(f, "Fact-check missing: {}", self.fact_check_missing)?;
        if self.classifier_failures > 0 {
            writeln!(f, "Classifier failures: {}", self.classifier_failures)?;
        }
        Ok(())
    }
}

/// The pipeline orchestrator: fetch from every enabled source, classify,
/// conditionally fact-check, reconcile into storage. One run owns its
/// working set end to end; sources are fetched sequentially because the
/// binding constraint is upstream rate limits, not local CPU.
pub struct Monitor {
    sources: Vec<Box<dyn SourceAdapter>>,
    classifier: Box<dyn Classifier>,
    fact_checker: Option<FactChecker>,
    store: Box<dyn RecordStore>,
    keywords: Vec<String>,
}

impl Monitor {
    pub fn new(
        sources: Vec<Box<dyn SourceAdapter>>,
        classifier: Box<dyn Classifier>,
        fact_checker: Option<FactChecker>,
        store: Box<dyn RecordStore>,
        keywords: Vec<String>,
    ) -> Self {
        Self {
            sources,
            classifier,
            fact_checker,
            store,
            keywords,
        }
    }

    /// Run one full fetch, classify, fact-check, reconcile cycle.
    pub async fn run_job(&self) -> Result<RunStats> {
        let mut stats = RunStats::default();

        // 1. Fetching. A source's total failure is logged; the run proceeds
        // with whatever the other sources produced.
        let mut records: Vec<Record> = Vec::new();
        for source in &self.sources {
            let platform = source.platform();
            match source.fetch(&self.keywords).await {
                Ok(fetched) => {
                    info!(platform = %platform, count = fetched.len(), "Source fetch complete");
                    stats.count_platform(platform, fetched.len() as u32);
                    records.extend(fetched);
                }
                Err(e) => {
                    error!(
                        platform = %platform,
                        error = %e,
                        "Source fetch failed, continuing with remaining sources"
                    );
                }
            }
        }
        stats.fetched = records.len() as u32;
        info!(total = records.len(), "Fetch phase complete");

        // 2. Classifying, with conditional fact-check for hoax verdicts.
        for record in &mut records {
            match self.classifier.classify(&record.content).await {
                Ok(prediction) => {
                    record.predicted_label = prediction.label;
                    record.prediction_score = prediction.score;
                }
                Err(e) => {
                    warn!(
                        url = %record.url,
                        error = %e,
                        "Classification failed, leaving record unlabeled"
                    );
                    stats.classifier_failures += 1;
                    continue;
                }
            }

            if record.is_hoax() {
                stats.hoaxes += 1;
                if let Some(fact_checker) = &self.fact_checker {
                    if fact_checker.verify(record).await {
                        stats.fact_checked += 1;
                    } else {
                        stats.fact_check_missing += 1;
                    }
                }
            }
        }

        // 3. Reconciling: the whole working set in one call, one
        // transaction. A storage failure aborts and rolls back the batch.
        self.store.upsert(&records).await?;

        Ok(stats)
    }
}
