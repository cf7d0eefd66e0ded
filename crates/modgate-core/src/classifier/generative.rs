//! Chat-model classifier.
//!
//! Sends the text inside a fixed moderation prompt to the chat completions
//! endpoint in JSON mode and validates the returned object. Every failure
//! (transport, empty content, bad JSON, wrong shape) costs one attempt of the
//! retry budget.

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};

use super::openai::{decode, post_json, OpenAiConfig};
use super::{Classified, Classifier};
use crate::error::{ModerationError, Result};
use crate::retry::RetryPolicy;

/// Default chat model.
pub const DEFAULT_CHAT_MODEL: &str = "gpt-3.5-turbo";

/// Verdict returned by the chat model.
///
/// `is_inappropriate` and `flagged_categories` are required. The optional
/// fields are best-effort: a value of the wrong type is treated as absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerativeJudgment {
    pub is_inappropriate: bool,
    /// Freeform category labels, in the order the model gave them.
    pub flagged_categories: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub reasoning: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub confidence_score: Option<f64>,
}

impl GenerativeJudgment {
    /// Parses and validates the model's message content.
    pub fn parse(content: &str) -> Result<Self> {
        let value: serde_json::Value =
            serde_json::from_str(content).map_err(ModerationError::MalformedJson)?;
        serde_json::from_value(value).map_err(|_| ModerationError::InvalidSchema)
    }
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        _ => None,
    })
}

fn lenient_number<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Builds the moderation prompt around the raw text.
pub fn build_prompt(text: &str) -> String {
    format!(
        r#"
You are a content moderator for a GitHub repository. Please analyze the following text and determine if it violates our content policy. The policy prohibits hate speech, sexual content, violence, and self-harm.

Please respond with a JSON object that follows this exact schema:
{{
  "is_inappropriate": "boolean",
  "flagged_categories": "array of strings",
  "reasoning": "string",
  "confidence_score": "float"
}}

Here is the text to analyze:
---
{}
---
"#,
        text
    )
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Classifier backed by a chat model in JSON mode.
pub struct GenerativeClassifier {
    client: reqwest::Client,
    config: OpenAiConfig,
    model: String,
    retry: RetryPolicy,
}

impl GenerativeClassifier {
    /// Creates a classifier with the default model and retry policy.
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let client = config.build_client()?;
        Ok(Self {
            client,
            config,
            model: DEFAULT_CHAT_MODEL.to_string(),
            retry: RetryPolicy::default(),
        })
    }

    /// Sets the chat model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Returns the configured model.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Returns the retry policy.
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// One request/validate cycle.
    async fn attempt(&self, prompt: &str) -> Result<Classified<GenerativeJudgment>> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let body = post_json(&self.client, &self.config, "chat/completions", &request).await?;
        let response: ChatResponse = decode(&body)?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(ModerationError::EmptyResponse)?;

        let judgment = GenerativeJudgment::parse(&content)?;
        Ok(Classified {
            judgment,
            raw_json: content,
        })
    }
}

#[async_trait]
impl Classifier for GenerativeClassifier {
    type Judgment = GenerativeJudgment;

    async fn classify(&self, text: &str) -> Result<Classified<GenerativeJudgment>> {
        let prompt = build_prompt(text);
        tracing::debug!(
            "Classifying {} chars with {} (up to {} attempts)",
            text.len(),
            self.model,
            self.retry.max_attempts()
        );

        self.retry.run("OpenAI API", || self.attempt(&prompt)).await
    }

    fn name(&self) -> &'static str {
        "generative"
    }
}
