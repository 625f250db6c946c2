use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, info};

use hoaxwatch_common::{Platform, Record};

use super::{SourceAdapter, KEYWORD_PAUSE_SECS};
use crate::throttle::{self, RetryPolicy};

/// Pause after this many accepted items to stay under anti-scraping
/// burst thresholds.
const ITEM_PAUSE_EVERY: usize = 10;
const ITEM_PAUSE_SECS: (f64, f64) = (0.5, 1.5);

/// Timestamp format used by the microblog search endpoint,
/// e.g. "Tue Mar 02 10:30:00 +0000 2021".
const STATUS_TIME_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

/// Microblog keyword-search adapter. Public search endpoint, no credentials;
/// results restricted to one language tag and capped per keyword.
pub struct MicroblogSource {
    client: reqwest::Client,
    base_url: String,
    language: String,
    max_items: u32,
    retry: RetryPolicy,
}

#[derive(Debug, Deserialize)]
struct MicroblogResponse {
    #[serde(default)]
    statuses: Vec<MicroblogStatus>,
}

#[derive(Debug, Deserialize)]
struct MicroblogStatus {
    #[serde(default)]
    id: u64,
    #[serde(default, alias = "full_text")]
    text: String,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    user: Option<MicroblogUser>,
}

#[derive(Debug, Deserialize)]
struct MicroblogUser {
    #[serde(default)]
    screen_name: Option<String>,
}

fn parse_status_time(raw: &str, fallback: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::parse_from_str(raw, STATUS_TIME_FORMAT)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(fallback)
}

impl MicroblogSource {
    pub fn new(base_url: &str, language: &str, max_items: u32) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.to_string(),
            language: language.to_string(),
            max_items,
            retry: RetryPolicy::default(),
        }
    }

    /// Web permalink for a status. The permalink host is the search
    /// endpoint's host.
    fn status_url(&self, handle: &str, id: u64) -> String {
        let host = url::Url::parse(&self.base_url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_string()))
            .unwrap_or_else(|| "microblog.invalid".to_string());
        format!("https://{host}/{handle}/status/{id}")
    }

    async fn fetch_keyword(&self, keyword: &str) -> Result<Vec<Record>> {
        let query = format!("{keyword} lang:{}", self.language);
        let count = self.max_items.to_string();
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[("q", query.as_str()), ("count", count.as_str())])
            .send()
            .await
            .context("Microblog search request failed")?;

        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("Microblog search returned status {status}");
        }

        let data: MicroblogResponse = resp
            .json()
            .await
            .context("Failed to parse microblog search response")?;

        let now = Utc::now();
        let mut records = Vec::new();
        for status in data.statuses {
            if records.len() >= self.max_items as usize {
                break;
            }
            let handle = match status.user.as_ref().and_then(|u| u.screen_name.clone()) {
                Some(h) if !h.is_empty() => h,
                // No author handle means no permalink, and the permalink is
                // the record's identity.
                _ => {
                    debug!(id = status.id, "Skipping status without author handle");
                    continue;
                }
            };
            let created_at = status
                .created_at
                .as_deref()
                .map(|raw| parse_status_time(raw, now))
                .unwrap_or(now);
            records.push(Record::new(
                Platform::Microblog,
                keyword,
                status.text,
                self.status_url(&handle, status.id),
                created_at,
                Some(handle),
            ));

            if records.len() % ITEM_PAUSE_EVERY == 0 {
                throttle::pause(ITEM_PAUSE_SECS.0, ITEM_PAUSE_SECS.1).await;
            }
        }
        Ok(records)
    }
}

#[async_trait]
impl SourceAdapter for MicroblogSource {
    fn platform(&self) -> Platform {
        Platform::Microblog
    }

    async fn fetch(&self, keywords: &[String]) -> Result<Vec<Record>> {
        let mut records = Vec::new();
        for (i, keyword) in keywords.iter().enumerate() {
            if i > 0 {
                throttle::pause(KEYWORD_PAUSE_SECS.0, KEYWORD_PAUSE_SECS.1).await;
            }
            info!(keyword, source = "microblog", "Fetching microblog posts");
            let fetched = self
                .retry
                .run("microblog", || self.fetch_keyword(keyword))
                .await;
            records.extend(fetched);
        }
        info!(
            count = records.len(),
            source = "microblog",
            "Microblog fetch complete"
        );
        Ok(records)
    }
}
