use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use tracing::info;

use hoaxwatch_common::{Platform, Record};

use super::{SourceAdapter, KEYWORD_PAUSE_SECS};
use crate::throttle::{self, RetryPolicy};

/// News-search adapter: one JSON search request per keyword against a
/// news aggregation endpoint.
pub struct NewsSource {
    client: reqwest::Client,
    base_url: String,
    language: String,
    country: String,
    max_results: u32,
    retry: RetryPolicy,
}

#[derive(Debug, Deserialize)]
struct NewsResponse {
    #[serde(default)]
    articles: Vec<NewsArticle>,
}

#[derive(Debug, Deserialize)]
struct NewsArticle {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    published: Option<String>,
    #[serde(default)]
    publisher: Option<PublisherField>,
}

/// The publisher field arrives either as a structured object or a bare
/// string, depending on the upstream feed.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PublisherField {
    Structured {
        #[serde(default)]
        title: Option<String>,
    },
    Plain(String),
}

impl PublisherField {
    fn display_name(&self) -> Option<String> {
        match self {
            PublisherField::Structured { title } => title.clone().filter(|t| !t.is_empty()),
            PublisherField::Plain(s) if !s.is_empty() => Some(s.clone()),
            PublisherField::Plain(_) => None,
        }
    }
}

/// Parse an article timestamp, trying RFC 2822 then bare ISO-8601 Zulu.
/// Falls back to `fallback` (ingestion time); a malformed date is not a
/// reason to drop the article.
fn parse_published(raw: &str, fallback: DateTime<Utc>) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%SZ") {
        return naive.and_utc();
    }
    fallback
}

impl NewsSource {
    pub fn new(base_url: &str, language: &str, country: &str, max_results: u32) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.to_string(),
            language: language.to_string(),
            country: country.to_string(),
            max_results,
            retry: RetryPolicy::default(),
        }
    }

    async fn fetch_keyword(&self, keyword: &str) -> Result<Vec<Record>> {
        let max = self.max_results.to_string();
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("q", keyword),
                ("lang", self.language.as_str()),
                ("country", self.country.as_str()),
                ("max", max.as_str()),
            ])
            .send()
            .await
            .context("News search request failed")?;

        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("News search returned status {status}");
        }

        let data: NewsResponse = resp
            .json()
            .await
            .context("Failed to parse news search response")?;

        let now = Utc::now();
        Ok(data
            .articles
            .into_iter()
            .filter(|a| !a.url.is_empty())
            .map(|article| {
                let content = format!("{}\n\n{}", article.title, article.description)
                    .trim()
                    .to_string();
                let created_at = article
                    .published
                    .as_deref()
                    .map(|p| parse_published(p, now))
                    .unwrap_or(now);
                let author = article.publisher.as_ref().and_then(|p| p.display_name());
                Record::new(
                    Platform::News,
                    keyword,
                    content,
                    article.url,
                    created_at,
                    author,
                )
            })
            .collect())
    }
}

#[async_trait]
impl SourceAdapter for NewsSource {
    fn platform(&self) -> Platform {
        Platform::News
    }

    async fn fetch(&self, keywords: &[String]) -> Result<Vec<Record>> {
        let mut records = Vec::new();
        for (i, keyword) in keywords.iter().enumerate() {
            if i > 0 {
                throttle::pause(KEYWORD_PAUSE_SECS.0, KEYWORD_PAUSE_SECS.1).await;
            }
            info!(keyword, source = "news", "Fetching news articles");
            let fetched = self.retry.run("news", || self.fetch_keyword(keyword)).await;
            records.extend(fetched);
        }
        info!(count = records.len(), source = "news", "News fetch complete");
        Ok(records)
    }
}
