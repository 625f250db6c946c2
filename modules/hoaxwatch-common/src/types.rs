use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default search keywords (Indonesian hoax-monitoring vocabulary).
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "vaksin",
    "pemilu",
    "konflik",
    "Israel",
    "Palestina",
    "covid",
    "konspirasi",
    "hoaks",
    "buzzer",
];

// --- Enums ---

/// Which kind of source produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    News,
    Microblog,
    Forum,
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::News => write!(f, "news"),
            Platform::Microblog => write!(f, "microblog"),
            Platform::Forum => write!(f, "forum"),
        }
    }
}

impl Platform {
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s {
            "news" => Some(Self::News),
            "microblog" => Some(Self::Microblog),
            "forum" => Some(Self::Forum),
            _ => None,
        }
    }
}

/// Classifier verdict on a piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    Hoax,
    NotHoax,
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Label::Hoax => write!(f, "hoax"),
            Label::NotHoax => write!(f, "not_hoax"),
        }
    }
}

impl Label {
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s {
            "hoax" => Some(Self::Hoax),
            "not_hoax" => Some(Self::NotHoax),
            _ => None,
        }
    }
}

/// Classifier output: label plus confidence. Both absent for blank input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: Option<Label>,
    pub score: Option<f64>,
}

impl Prediction {
    pub fn none() -> Self {
        Self {
            label: None,
            score: None,
        }
    }
}

// --- Record ---

/// Canonical normalized unit of ingested text.
///
/// Created by a source adapter with the classification fields unset, mutated
/// in place by the classification step, optionally by the fact-check step,
/// then handed to the store. `url` is the sole identity key; two records with
/// the same `url` refer to the same real-world item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub platform: Platform,
    /// The search term that produced this record (provenance).
    pub keyword: String,
    /// Normalized text body. Multi-field sources concatenate title and body
    /// with a blank-line separator.
    pub content: String,
    pub url: String,
    /// Original publication time; ingestion time if the source's timestamp
    /// could not be parsed.
    pub created_at: DateTime<Utc>,
    pub author: Option<String>,
    pub predicted_label: Option<Label>,
    pub prediction_score: Option<f64>,
    pub fact_check_url: Option<String>,
    pub fact_check_rating: Option<String>,
    pub fact_check_publisher: Option<String>,
}

impl Record {
    /// A fresh record as produced by a source adapter, before enrichment.
    pub fn new(
        platform: Platform,
        keyword: impl Into<String>,
        content: impl Into<String>,
        url: impl Into<String>,
        created_at: DateTime<Utc>,
        author: Option<String>,
    ) -> Self {
        Self {
            platform,
            keyword: keyword.into(),
            content: content.into(),
            url: url.into(),
            created_at,
            author,
            predicted_label: None,
            prediction_score: None,
            fact_check_url: None,
            fact_check_rating: None,
            fact_check_publisher: None,
        }
    }

    pub fn is_hoax(&self) -> bool {
        self.predicted_label == Some(Label::Hoax)
    }
}
