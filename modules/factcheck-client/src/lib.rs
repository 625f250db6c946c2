pub mod error;
pub mod types;

pub use error::{FactCheckError, Result};
pub use types::{Claim, ClaimReview, ClaimSearchResponse, Publisher};

use std::time::Duration;

const BASE_URL: &str = "https://factchecktools.googleapis.com/v1alpha1/claims:search";

/// How far back the claims corpus is searched, in days.
const MAX_AGE_DAYS: u32 = 1000;
const PAGE_SIZE: u32 = 10;

/// Client for the fact-check claims-search API.
///
/// The API requires a key; without one the client is constructed in a
/// disabled state and `search` returns nothing.
pub struct FactCheckClient {
    client: reqwest::Client,
    api_key: Option<String>,
    language_code: String,
}

impl FactCheckClient {
    pub fn new(api_key: Option<String>, language_code: &str) -> Self {
        if api_key.is_none() {
            tracing::warn!("No fact-check API key provided, claim search is disabled");
        }
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
            language_code: language_code.to_string(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    /// Search fact-checked claims matching `query`.
    ///
    /// Returns an empty list when no API key is configured, and on any
    /// transport or decode failure (logged, never propagated); a broken
    /// fact-check lookup must not abort the caller's batch.
    pub async fn search(&self, query: &str) -> Vec<Claim> {
        let Some(key) = self.api_key.clone() else {
            return Vec::new();
        };

        match self.claims_search(query, &key).await {
            Ok(resp) => {
                tracing::info!(query, count = resp.claims.len(), "Claim search complete");
                resp.claims
            }
            Err(e) => {
                tracing::error!(query, error = %e, "Claim search request failed");
                Vec::new()
            }
        }
    }

    /// Raw claims-search request. Propagates transport and API errors.
    pub async fn claims_search(&self, query: &str, key: &str) -> Result<ClaimSearchResponse> {
        let max_age = MAX_AGE_DAYS.to_string();
        let page_size = PAGE_SIZE.to_string();
        let resp = self
            .client
            .get(BASE_URL)
            .query(&[
                ("query", query),
                ("languageCode", self.language_code.as_str()),
                ("maxAgeDays", max_age.as_str()),
                ("pageSize", page_size.as_str()),
                ("key", key),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(FactCheckError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let data: ClaimSearchResponse = resp.json().await?;
        Ok(data)
    }
}
