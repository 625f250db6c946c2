use std::env;

use crate::types::DEFAULT_KEYWORDS;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Postgres
    pub database_url: String,

    // Classifier inference endpoint
    pub classifier_url: String,
    pub classifier_token: Option<String>,

    // Fact-check search API. Absent disables fact-check enrichment.
    pub fact_check_api_key: Option<String>,

    // Forum source credentials. Absent disables the forum source.
    pub forum_client_id: Option<String>,
    pub forum_client_secret: Option<String>,
    pub forum_user_agent: Option<String>,

    // Source transport base URLs
    pub news_api_url: String,
    pub microblog_api_url: String,

    // Search terms and language/region restriction
    pub keywords: Vec<String>,
    pub language: String,
    pub country: String,
}

pub const DEFAULT_NEWS_API_URL: &str = "https://news.hoaxwatch.dev/v1/search";
pub const DEFAULT_MICROBLOG_API_URL: &str = "https://microblog.hoaxwatch.dev/v1/search";

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        Self {
            database_url: required_env("DATABASE_URL"),
            classifier_url: required_env("CLASSIFIER_URL"),
            classifier_token: env::var("CLASSIFIER_TOKEN").ok(),
            fact_check_api_key: env::var("FACT_CHECK_API_KEY").ok(),
            forum_client_id: env::var("FORUM_CLIENT_ID").ok(),
            forum_client_secret: env::var("FORUM_CLIENT_SECRET").ok(),
            forum_user_agent: env::var("FORUM_USER_AGENT").ok(),
            news_api_url: env::var("NEWS_API_URL")
                .unwrap_or_else(|_| DEFAULT_NEWS_API_URL.to_string()),
            microblog_api_url: env::var("MICROBLOG_API_URL")
                .unwrap_or_else(|_| DEFAULT_MICROBLOG_API_URL.to_string()),
            keywords: env::var("HOAX_KEYWORDS")
                .map(|raw| split_keywords(&raw))
                .unwrap_or_else(|_| DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect()),
            language: env::var("HOAX_LANGUAGE").unwrap_or_else(|_| "id".to_string()),
            country: env::var("HOAX_COUNTRY").unwrap_or_else(|_| "ID".to_string()),
        }
    }

    /// Log the loaded configuration with secrets redacted.
    pub fn log_redacted(&self) {
        tracing::info!(
            classifier_url = %self.classifier_url,
            news_api_url = %self.news_api_url,
            microblog_api_url = %self.microblog_api_url,
            keywords = self.keywords.len(),
            language = %self.language,
            fact_check = self.fact_check_api_key.is_some(),
            forum_credentials = self.forum_client_id.is_some(),
            "Configuration loaded"
        );
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}

fn split_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect()
}
