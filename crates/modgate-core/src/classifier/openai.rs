//! Shared OpenAI HTTP plumbing.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{ModerationError, Result};

/// Default OpenAI API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for an OpenAI-compatible API.
#[derive(Clone)]
pub struct OpenAiConfig {
    /// API key sent as a bearer token.
    api_key: String,
    /// Base URL without a trailing slash.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl OpenAiConfig {
    /// Creates a config for the public API.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Points the config at another base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the full URL for an endpoint path such as `moderations`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Builds the HTTP client used for every request.
    pub(crate) fn build_client(&self) -> Result<reqwest::Client> {
        let client = reqwest::Client::builder()
            .user_agent(format!("Modgate/{}", env!("CARGO_PKG_VERSION")))
            .timeout(self.timeout)
            .build()?;
        Ok(client)
    }
}

/// Error envelope returned by the API on failure.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Posts `body` to `path` and returns the raw response text on success.
pub(crate) async fn post_json<B: Serialize + ?Sized>(
    client: &reqwest::Client,
    config: &OpenAiConfig,
    path: &str,
    body: &B,
) -> Result<String> {
    let url = config.endpoint(path);
    tracing::debug!("POST {}", url);

    let response = client
        .post(&url)
        .bearer_auth(&config.api_key)
        .json(body)
        .send()
        .await?;

    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        let message = serde_json::from_str::<ErrorEnvelope>(&text)
            .map(|envelope| envelope.error.message)
            .unwrap_or_else(|_| text.trim().to_string());
        return Err(ModerationError::Api {
            status: status.as_u16(),
            message,
        });
    }

    Ok(text)
}

/// Decodes a successful response body into a wire type.
pub(crate) fn decode<T: DeserializeOwned>(text: &str) -> Result<T> {
    serde_json::from_str(text).map_err(ModerationError::MalformedJson)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slash() {
        let config = OpenAiConfig::new("key").with_base_url("http://localhost:8080/v1/");
        assert_eq!(
            config.endpoint("/chat/completions"),
            "http://localhost:8080/v1/chat/completions"
        );
        assert_eq!(config.endpoint("moderations"), "http://localhost:8080/v1/moderations");
    }

    #[test]
    fn debug_hides_api_key() {
        let config = OpenAiConfig::new("sk-secret");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains(DEFAULT_BASE_URL));
    }

    #[test]
    fn defaults() {
        let config = OpenAiConfig::new("key");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }
}
