use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;

use hoaxwatch_common::{HoaxWatchError, Platform, Record};

use super::{SourceAdapter, KEYWORD_PAUSE_SECS};
use crate::throttle::{self, RetryPolicy};

const TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
const SEARCH_URL: &str = "https://oauth.reddit.com/search";
const PERMALINK_HOST: &str = "https://www.reddit.com";

/// Forum search adapter. Requires registered application credentials; a
/// missing credential fails construction so the orchestrator can disable
/// this source without affecting the others.
pub struct ForumSource {
    client: reqwest::Client,
    client_id: String,
    client_secret: String,
    max_items: u32,
    retry: RetryPolicy,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<ListingChild>,
}

#[derive(Debug, Deserialize)]
struct ListingChild {
    data: Submission,
}

#[derive(Debug, Deserialize)]
struct Submission {
    #[serde(default)]
    title: String,
    #[serde(default)]
    selftext: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    permalink: Option<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    created_utc: Option<f64>,
}

impl ForumSource {
    pub fn new(
        client_id: Option<String>,
        client_secret: Option<String>,
        user_agent: Option<String>,
        max_items: u32,
    ) -> Result<Self, HoaxWatchError> {
        let (client_id, client_secret, user_agent) = match (client_id, client_secret, user_agent) {
            (Some(id), Some(secret), Some(ua))
                if !id.is_empty() && !secret.is_empty() && !ua.is_empty() =>
            {
                (id, secret, ua)
            }
            _ => {
                return Err(HoaxWatchError::Config(
                    "Forum credentials (client id, client secret, user agent) are required".into(),
                ))
            }
        };

        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| HoaxWatchError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            client_id,
            client_secret,
            max_items,
            retry: RetryPolicy::default(),
        })
    }

    /// Application-only OAuth token, fetched once per run.
    async fn access_token(&self) -> Result<String> {
        let resp = self
            .client
            .post(TOKEN_URL)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .context("Forum token request failed")?;

        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("Forum token endpoint returned status {status}");
        }

        let token: TokenResponse = resp
            .json()
            .await
            .context("Failed to parse forum token response")?;
        Ok(token.access_token)
    }

    async fn fetch_keyword(&self, token: &str, keyword: &str) -> Result<Vec<Record>> {
        let limit = self.max_items.to_string();
        let resp = self
            .client
            .get(SEARCH_URL)
            .bearer_auth(token)
            .query(&[("q", keyword), ("sort", "new"), ("limit", limit.as_str())])
            .send()
            .await
            .context("Forum search request failed")?;

        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("Forum search returned status {status}");
        }

        let listing: Listing = resp
            .json()
            .await
            .context("Failed to parse forum search response")?;

        let now = Utc::now();
        Ok(listing
            .data
            .children
            .into_iter()
            .filter_map(|child| submission_to_record(child.data, keyword, now))
            .collect())
    }
}

fn submission_to_record(s: Submission, keyword: &str, now: DateTime<Utc>) -> Option<Record> {
    let url = if !s.url.is_empty() {
        s.url
    } else {
        format!("{PERMALINK_HOST}{}", s.permalink?)
    };
    let content = format!("{}\n\n{}", s.title, s.selftext).trim().to_string();
    let created_at = s
        .created_utc
        .and_then(|secs| DateTime::from_timestamp(secs as i64, 0))
        .unwrap_or(now);
    Some(Record::new(
        Platform::Forum,
        keyword,
        content,
        url,
        created_at,
        s.author,
    ))
}

#[async_trait]
impl SourceAdapter for ForumSource {
    fn platform(&self) -> Platform {
        Platform::Forum
    }

    async fn fetch(&self, keywords: &[String]) -> Result<Vec<Record>> {
        let token = self.access_token().await?;

        let mut records = Vec::new();
        for (i, keyword) in keywords.iter().enumerate() {
            if i > 0 {
                throttle::pause(KEYWORD_PAUSE_SECS.0, KEYWORD_PAUSE_SECS.1).await;
            }
            info!(keyword, source = "forum", "Fetching forum submissions");
            let fetched = self
                .retry
                .run("forum", || self.fetch_keyword(&token, keyword))
                .await;
            records.extend(fetched);
        }
        info!(count = records.len(), source = "forum", "Forum fetch complete");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_fails_without_credentials() {
        let err = ForumSource::new(Some("id".into()), None, Some("agent".into()), 50);
        assert!(matches!(err, Err(HoaxWatchError::Config(_))));

        let err = ForumSource::new(Some("".into()), Some("secret".into()), Some("agent".into()), 50);
        assert!(matches!(err, Err(HoaxWatchError::Config(_))));
    }

    #[test]
    fn construction_succeeds_with_full_credentials() {
        let source = ForumSource::new(
            Some("id".into()),
            Some("secret".into()),
            Some("hoaxwatch/0.1".into()),
            50,
        );
        assert!(source.is_ok());
    }

    #[test]
    fn submission_maps_title_and_body() {
        let now = Utc::now();
        let s = Submission {
            title: "Berita aneh".into(),
            selftext: "Isi lengkap kiriman.".into(),
            url: "https://example.com/thread/1".into(),
            permalink: None,
            author: Some("udin".into()),
            created_utc: Some(1_614_680_000.0),
        };
        let record = submission_to_record(s, "hoaks", now).unwrap();
        assert_eq!(record.content, "Berita aneh\n\nIsi lengkap kiriman.");
        assert_eq!(record.url, "https://example.com/thread/1");
        assert_eq!(record.author.as_deref(), Some("udin"));
        assert_ne!(record.created_at, now);
    }

    #[test]
    fn submission_falls_back_to_permalink_and_now() {
        let now = Utc::now();
        let s = Submission {
            title: "Tanpa tautan".into(),
            selftext: String::new(),
            url: String::new(),
            permalink: Some("/r/all/comments/abc/tanpa_tautan/".into()),
            author: None,
            created_utc: None,
        };
        let record = submission_to_record(s, "hoaks", now).unwrap();
        assert_eq!(
            record.url,
            "https://www.reddit.com/r/all/comments/abc/tanpa_tautan/"
        );
        assert_eq!(record.created_at, now);
        assert!(record.author.is_none());
    }

    #[test]
    fn submission_without_any_url_dropped() {
        let s = Submission {
            title: "x".into(),
            selftext: String::new(),
            url: String::new(),
            permalink: None,
            author: None,
            created_utc: None,
        };
        assert!(submission_to_record(s, "hoaks", Utc::now()).is_none());
    }
}
