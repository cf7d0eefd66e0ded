//! Moderation-endpoint classifier.
//!
//! One call to `/moderations`, no retry. Only the first result entry is
//! used since a single text produces a single result.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::category::CategoryJudgment;
use super::openai::{decode, post_json, OpenAiConfig};
use super::{Classified, Classifier};
use crate::error::{ModerationError, Result};

#[derive(Debug, Serialize)]
struct ModerationRequest<'a> {
    input: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct ModerationResponse {
    #[serde(default)]
    results: Vec<CategoryJudgment>,
}

/// Classifier backed by the fixed-category moderation endpoint.
pub struct ModerationClassifier {
    client: reqwest::Client,
    config: OpenAiConfig,
    model: Option<String>,
}

impl ModerationClassifier {
    /// Creates a classifier using the endpoint's default model.
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let client = config.build_client()?;
        Ok(Self {
            client,
            config,
            model: None,
        })
    }

    /// Pins a moderation model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Returns the pinned model, if any.
    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }
}

#[async_trait]
impl Classifier for ModerationClassifier {
    type Judgment = CategoryJudgment;

    async fn classify(&self, text: &str) -> Result<Classified<CategoryJudgment>> {
        let request = ModerationRequest {
            input: text,
            model: self.model.as_deref(),
        };

        let body = post_json(&self.client, &self.config, "moderations", &request).await?;
        let response: ModerationResponse = decode(&body)?;

        let judgment = response
            .results
            .into_iter()
            .next()
            .ok_or(ModerationError::NoResults)?;

        tracing::debug!(
            "Moderation endpoint returned flagged={} for {} categories",
            judgment.flagged,
            judgment.categories.len()
        );

        Ok(Classified {
            judgment,
            raw_json: body,
        })
    }

    fn name(&self) -> &'static str {
        "moderation"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Category;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn classifier(server: &MockServer) -> ModerationClassifier {
        let config = OpenAiConfig::new("test-api-key").with_base_url(server.uri());
        ModerationClassifier::new(config).unwrap()
    }

    #[test]
    fn model_is_unpinned_by_default() {
        let classifier = ModerationClassifier::new(OpenAiConfig::new("k")).unwrap();
        assert_eq!(classifier.model(), None);
        assert_eq!(
            classifier.with_model("omni-moderation-latest").model(),
            Some("omni-moderation-latest")
        );
    }

    #[tokio::test]
    async fn classify_uses_first_result() {
        let server = MockServer::start().await;
        let response = json!({
            "id": "modr-123",
            "model": "omni-moderation-latest",
            "results": [
                {
                    "flagged": true,
                    "categories": {"hate": true, "violence": true},
                    "category_scores": {"hate": 0.9, "violence": 0.8}
                },
                {
                    "flagged": false,
                    "categories": {"hate": false},
                    "category_scores": {"hate": 0.01}
                }
            ]
        });

        Mock::given(method("POST"))
            .and(path("/moderations"))
            .and(header("Authorization", "Bearer test-api-key"))
            .and(body_json(json!({"input": "some text"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(response.clone()))
            .expect(1)
            .mount(&server)
            .await;

        let result = classifier(&server).classify("some text").await.unwrap();
        assert!(result.judgment.flagged);
        assert!(result.judgment.is_flagged(Category::Hate));
        assert_eq!(result.judgment.score(Category::Violence), Some(0.8));

        let raw: serde_json::Value = serde_json::from_str(&result.raw_json).unwrap();
        assert_eq!(raw, response);
    }

    #[tokio::test]
    async fn classify_sends_pinned_model() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/moderations"))
            .and(body_json(json!({"input": "x", "model": "text-moderation-stable"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{"flagged": false, "categories": {}, "category_scores": {}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = classifier(&server)
            .with_model("text-moderation-stable")
            .classify("x")
            .await
            .unwrap();
        assert!(!result.judgment.flagged);
    }

    #[tokio::test]
    async fn empty_results_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/moderations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
            .mount(&server)
            .await;

        let err = classifier(&server).classify("x").await.unwrap_err();
        assert!(matches!(err, ModerationError::NoResults));
    }

    #[tokio::test]
    async fn api_errors_are_not_retried() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/moderations"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let err = classifier(&server).classify("x").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "OpenAI API returned 401: Incorrect API key provided"
        );
    }
}
