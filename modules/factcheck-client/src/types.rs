use serde::Deserialize;

/// Top-level response from the claims-search endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ClaimSearchResponse {
    #[serde(default)]
    pub claims: Vec<Claim>,
}

/// A fact-checked claim with its published reviews.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub claimant: Option<String>,
    #[serde(default)]
    pub claim_date: Option<String>,
    #[serde(default)]
    pub claim_review: Vec<ClaimReview>,
}

/// One publisher's verdict on a claim.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimReview {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub textual_rating: Option<String>,
    #[serde(default)]
    pub publisher: Option<Publisher>,
    #[serde(default)]
    pub review_date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Publisher {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub site: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_deserializes_camel_case() {
        let json = r#"{
            "claims": [{
                "text": "Vaccines contain microchips",
                "claimant": "social media user",
                "claimDate": "2021-03-01T00:00:00Z",
                "claimReview": [{
                    "url": "https://checker.example/review/1",
                    "title": "No, vaccines do not contain microchips",
                    "textualRating": "False",
                    "publisher": {"name": "Checker", "site": "checker.example"},
                    "reviewDate": "2021-03-02T00:00:00Z"
                }]
            }]
        }"#;
        let resp: ClaimSearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.claims.len(), 1);
        let claim = &resp.claims[0];
        assert_eq!(claim.text.as_deref(), Some("Vaccines contain microchips"));
        let review = &claim.claim_review[0];
        assert_eq!(review.textual_rating.as_deref(), Some("False"));
        assert_eq!(
            review.publisher.as_ref().and_then(|p| p.name.as_deref()),
            Some("Checker")
        );
    }

    #[test]
    fn missing_fields_default() {
        let resp: ClaimSearchResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.claims.is_empty());

        let claim: Claim = serde_json::from_str(r#"{"claimReview": [{}]}"#).unwrap();
        assert!(claim.text.is_none());
        assert!(claim.claim_review[0].url.is_none());
    }
}
