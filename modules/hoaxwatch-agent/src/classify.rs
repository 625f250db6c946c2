use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use hoaxwatch_common::{Label, Prediction};

/// Text-classification collaborator. Implementations must return
/// `Prediction::none()` for blank or whitespace-only input.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<Prediction>;
}

/// Confidence below which a hoax verdict from a general-purpose model is
/// demoted to not_hoax.
const HOAX_SCORE_FLOOR: f64 = 0.65;

/// Classifier backed by a hosted inference endpoint.
pub struct RemoteClassifier {
    client: reqwest::Client,
    endpoint: String,
    token: Option<String>,
}

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
}

#[derive(Debug, Deserialize)]
struct LabelScore {
    #[serde(default)]
    label: String,
    #[serde(default)]
    score: f64,
}

impl RemoteClassifier {
    pub fn new(endpoint: &str, token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(60))
                .build()
                .expect("Failed to build HTTP client"),
            endpoint: endpoint.to_string(),
            token,
        }
    }

    fn map_label(raw: &str) -> Option<Label> {
        match raw {
            "LABEL_0" | "fakta" | "not_hoax" => Some(Label::NotHoax),
            "LABEL_1" | "hoaks" | "hoax" => Some(Label::Hoax),
            _ => None,
        }
    }
}

/// Apply the confidence floor: a low-scoring hoax verdict becomes not_hoax.
fn finalize(label: Option<Label>, score: f64) -> Prediction {
    let label = match label {
        Some(Label::Hoax) if score < HOAX_SCORE_FLOOR => Some(Label::NotHoax),
        other => other,
    };
    Prediction {
        label,
        score: Some(score),
    }
}

#[async_trait]
impl Classifier for RemoteClassifier {
    async fn classify(&self, text: &str) -> Result<Prediction> {
        if text.trim().is_empty() {
            return Ok(Prediction::none());
        }

        let mut req = self
            .client
            .post(&self.endpoint)
            .json(&InferenceRequest { inputs: text });
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }

        let resp = req.send().await.context("Classifier request failed")?;
        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("Classifier returned status {status}");
        }

        // One inner list of label/score pairs per input.
        let scores: Vec<Vec<LabelScore>> = resp
            .json()
            .await
            .context("Failed to parse classifier response")?;

        let best = scores
            .into_iter()
            .flatten()
            .max_by(|a, b| a.score.total_cmp(&b.score));
        let Some(best) = best else {
            return Ok(Prediction::none());
        };

        Ok(finalize(Self::map_label(&best.label), best.score))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn blank_text_short_circuits() {
        // The endpoint is unreachable; blank input must not touch it.
        let classifier = RemoteClassifier::new("http://127.0.0.1:1/predict", None);
        let p = classifier.classify("   \n\t ").await.unwrap();
        assert_eq!(p, Prediction::none());
    }

    #[test]
    fn label_mapping() {
        assert_eq!(RemoteClassifier::map_label("LABEL_1"), Some(Label::Hoax));
        assert_eq!(RemoteClassifier::map_label("LABEL_0"), Some(Label::NotHoax));
        assert_eq!(RemoteClassifier::map_label("hoaks"), Some(Label::Hoax));
        assert_eq!(RemoteClassifier::map_label("fakta"), Some(Label::NotHoax));
        assert_eq!(RemoteClassifier::map_label("NEUTRAL"), None);
    }

    #[test]
    fn low_confidence_hoax_demoted() {
        let p = finalize(Some(Label::Hoax), 0.60);
        assert_eq!(p.label, Some(Label::NotHoax));
        assert_eq!(p.score, Some(0.60));
    }

    #[test]
    fn confident_hoax_kept() {
        let p = finalize(Some(Label::Hoax), 0.90);
        assert_eq!(p.label, Some(Label::Hoax));
    }

    #[test]
    fn not_hoax_unaffected_by_floor() {
        let p = finalize(Some(Label::NotHoax), 0.10);
        assert_eq!(p.label, Some(Label::NotHoax));
    }
}
