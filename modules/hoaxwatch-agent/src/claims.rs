//! Claim-query extraction and fuzzy candidate matching for fact-check
//! lookups. Full record text makes a poor search query; a handful of
//! high-signal vocabulary terms retrieves far better candidates.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use factcheck_client::Claim;

/// Domain vocabulary scanned for in record text: topic terms, political
/// terms, claim-pattern terms. Match results preserve this order.
const CLAIM_VOCABULARY: &[&str] = &[
    "vaksin",
    "covid",
    "chip",
    "autisme",
    "pemilu",
    "kecurangan",
    "konspirasi",
    "hoaks",
    "buzzer",
    "Israel",
    "Palestina",
];

/// Minimum token-set similarity (0-100) for a candidate to be eligible.
pub const DEFAULT_SIMILARITY_THRESHOLD: u32 = 50;

fn vocabulary_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        CLAIM_VOCABULARY
            .iter()
            .map(|term| {
                Regex::new(&format!(r"(?i)\b{}\b", regex::escape(term)))
                    .expect("valid vocabulary regex")
            })
            .collect()
    })
}

/// Derive a short fact-check query from record text: the vocabulary terms
/// that occur in it (whole-word, case-insensitive), joined by spaces in
/// vocabulary order. Returns an empty string when nothing matches; the
/// caller must then fall back to the record's originating keyword, since an
/// empty query is meaningless.
pub fn extract_claim_terms(text: &str) -> String {
    let found: Vec<&str> = CLAIM_VOCABULARY
        .iter()
        .zip(vocabulary_patterns())
        .filter(|(_, re)| re.is_match(text))
        .map(|(term, _)| *term)
        .collect();
    found.join(" ")
}

fn tokens(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

/// Token-set overlap ratio between two strings, scaled to 0-100.
/// Higher means more similar; either side empty scores 0.
pub fn token_set_score(a: &str, b: &str) -> u32 {
    let ta = tokens(a);
    let tb = tokens(b);
    if ta.is_empty() || tb.is_empty() {
        return 0;
    }
    let intersection = ta.intersection(&tb).count();
    let union = ta.union(&tb).count();
    ((intersection as f64 / union as f64) * 100.0).round() as u32
}

/// The chosen review of the best-matching claim, annotated with its score.
#[derive(Debug, Clone)]
pub struct MatchedReview {
    pub url: Option<String>,
    pub title: Option<String>,
    pub rating: Option<String>,
    pub publisher: Option<String>,
    pub review_date: Option<String>,
    pub similarity: u32,
}

/// Exhaustive argmax over candidates: every candidate is scored against the
/// query, using the claim's own text or, when that is empty, its first
/// review's title. The winner must meet the threshold; equal scores keep the
/// first-encountered candidate. Returns the winner's first review.
pub fn best_match(query: &str, claims: &[Claim], threshold: u32) -> Option<MatchedReview> {
    let mut best: Option<(u32, &Claim)> = None;

    for claim in claims {
        let comparison = claim
            .text
            .as_deref()
            .filter(|t| !t.is_empty())
            .or_else(|| claim.claim_review.first().and_then(|r| r.title.as_deref()));
        let Some(comparison) = comparison else {
            continue;
        };

        let score = token_set_score(query, comparison);
        if score < threshold {
            continue;
        }
        // Strictly-greater keeps the first of equal-scoring candidates.
        if best.map_or(true, |(top, _)| score > top) {
            best = Some((score, claim));
        }
    }

    let (similarity, claim) = best?;
    let review = claim.claim_review.first()?;
    Some(MatchedReview {
        url: review.url.clone(),
        title: review.title.clone(),
        rating: review.textual_rating.clone(),
        publisher: review.publisher.as_ref().and_then(|p| p.name.clone()),
        review_date: review.review_date.clone(),
        similarity,
    })
}
