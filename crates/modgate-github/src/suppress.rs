//! Hiding content through the GitHub GraphQL API.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{GitHubError, Result};

/// Default GraphQL endpoint.
pub const DEFAULT_GRAPHQL_URL: &str = "https://api.github.com/graphql";

/// Runner variable pointing at the GraphQL endpoint (set on GitHub Enterprise).
pub const GRAPHQL_URL_VAR: &str = "GITHUB_GRAPHQL_URL";

const MINIMIZE_MUTATION: &str = r#"
mutation($input: MinimizeCommentInput!) {
  minimizeComment(input: $input) {
    clientMutationId
  }
}
"#;

/// Reason shown on minimized content (GraphQL `ReportedContentClassifiers`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MinimizeReason {
    Spam,
    Abuse,
    #[default]
    OffTopic,
    Outdated,
    Duplicate,
    Resolved,
}

impl MinimizeReason {
    /// Returns the GraphQL enum value.
    pub fn as_str(&self) -> &'static str {
        match self {
            MinimizeReason::Spam => "SPAM",
            MinimizeReason::Abuse => "ABUSE",
            MinimizeReason::OffTopic => "OFF_TOPIC",
            MinimizeReason::Outdated => "OUTDATED",
            MinimizeReason::Duplicate => "DUPLICATE",
            MinimizeReason::Resolved => "RESOLVED",
        }
    }
}

impl fmt::Display for MinimizeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MinimizeReason {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "SPAM" => Ok(MinimizeReason::Spam),
            "ABUSE" => Ok(MinimizeReason::Abuse),
            "OFF_TOPIC" => Ok(MinimizeReason::OffTopic),
            "OUTDATED" => Ok(MinimizeReason::Outdated),
            "DUPLICATE" => Ok(MinimizeReason::Duplicate),
            "RESOLVED" => Ok(MinimizeReason::Resolved),
            other => Err(format!(
                "unknown minimize reason '{}' (expected SPAM, ABUSE, OFF_TOPIC, OUTDATED, DUPLICATE or RESOLVED)",
                other
            )),
        }
    }
}

/// Trait for hiding one piece of content.
#[async_trait]
pub trait ContentSuppressor: Send + Sync {
    /// Hides the content identified by `node_id`.
    async fn suppress(&self, node_id: &str) -> Result<()>;
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

fn build_client(timeout: Option<Duration>) -> Result<reqwest::Client> {
    let mut builder =
        reqwest::Client::builder().user_agent(format!("Modgate/{}", env!("CARGO_PKG_VERSION")));
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    Ok(builder.build()?)
}

/// Minimizes content with the `minimizeComment` mutation.
pub struct GraphQlSuppressor {
    client: reqwest::Client,
    token: String,
    endpoint: String,
    reason: MinimizeReason,
}

impl fmt::Debug for GraphQlSuppressor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphQlSuppressor")
            .field("endpoint", &self.endpoint)
            .field("reason", &self.reason)
            .finish_non_exhaustive()
    }
}

impl GraphQlSuppressor {
    /// Creates a suppressor for the public GitHub API.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: build_client(None)?,
            token: token.into(),
            endpoint: DEFAULT_GRAPHQL_URL.to_string(),
            reason: MinimizeReason::default(),
        })
    }

    /// Uses another GraphQL endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Sets the minimize reason.
    pub fn with_reason(mut self, reason: MinimizeReason) -> Self {
        self.reason = reason;
        self
    }

    /// Sets a per-request timeout by rebuilding the client.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = build_client(Some(timeout))?;
        Ok(self)
    }

    /// Returns the GraphQL endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Returns the minimize reason.
    pub fn reason(&self) -> MinimizeReason {
        self.reason
    }

    fn request_body(&self, node_id: &str) -> Value {
        json!({
            "query": MINIMIZE_MUTATION,
            "variables": {
                "input": {
                    "subjectId": node_id,
                    "classifier": self.reason.as_str(),
                }
            }
        })
    }
}

#[async_trait]
impl ContentSuppressor for GraphQlSuppressor {
    async fn suppress(&self, node_id: &str) -> Result<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .json(&self.request_body(node_id))
            .send()
            .await?
            .error_for_status()?;

        let body: GraphQlResponse = serde_json::from_str(&response.text().await?)?;
        if !body.errors.is_empty() {
            let messages: Vec<_> = body.errors.into_iter().map(|e| e.message).collect();
            return Err(GitHubError::GraphQl(messages.join("; ")));
        }

        tracing::debug!("minimizeComment succeeded for {} ({})", node_id, self.reason);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::assert_ok;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn suppressor(server: &MockServer) -> GraphQlSuppressor {
        GraphQlSuppressor::new("test-github-token")
            .unwrap()
            .with_endpoint(format!("{}/graphql", server.uri()))
    }

    #[test]
    fn minimize_reason_parses_case_insensitively() {
        assert_eq!("off-topic".parse::<MinimizeReason>(), Ok(MinimizeReason::OffTopic));
        assert_eq!("ABUSE".parse::<MinimizeReason>(), Ok(MinimizeReason::Abuse));
        assert_eq!(" spam ".parse::<MinimizeReason>(), Ok(MinimizeReason::Spam));
        assert!("rude".parse::<MinimizeReason>().is_err());
    }

    #[test]
    fn minimize_reason_defaults_to_off_topic() {
        assert_eq!(MinimizeReason::default().to_string(), "OFF_TOPIC");
    }

    #[test]
    fn request_body_carries_subject_and_reason() {
        let suppressor = GraphQlSuppressor::new("t")
            .unwrap()
            .with_reason(MinimizeReason::Abuse);
        let body = suppressor.request_body("IC_1");

        assert_eq!(body["variables"]["input"]["subjectId"], "IC_1");
        assert_eq!(body["variables"]["input"]["classifier"], "ABUSE");
        assert!(body["query"].as_str().unwrap().contains("minimizeComment"));
    }

    #[tokio::test]
    async fn suppress_sends_minimize_mutation() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .and(header("Authorization", "Bearer test-github-token"))
            .and(body_partial_json(json!({
                "variables": {"input": {"subjectId": "test-node-id", "classifier": "OFF_TOPIC"}}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"minimizeComment": {"clientMutationId": "1"}}
            })))
            .expect(1)
            .mount(&server)
            .await;

        assert_ok!(suppressor(&server).suppress("test-node-id").await);
    }

    #[tokio::test]
    async fn graphql_errors_are_reported() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"minimizeComment": null},
                "errors": [
                    {"message": "Resource not accessible by integration"},
                    {"message": "Could not resolve to a node"}
                ]
            })))
            .mount(&server)
            .await;

        let err = suppressor(&server).suppress("IC_1").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "GraphQL request failed: Resource not accessible by integration; Could not resolve to a node"
        );
    }

    #[tokio::test]
    async fn slow_endpoint_hits_timeout() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"data": {"minimizeComment": {"clientMutationId": "1"}}}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let suppressor = suppressor(&server)
            .with_timeout(Duration::from_millis(100))
            .unwrap();
        let err = suppressor.suppress("IC_1").await.unwrap_err();
        assert!(matches!(err, GitHubError::Http(ref e) if e.is_timeout()));
    }

    #[tokio::test]
    async fn http_errors_are_reported() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/graphql"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Bad credentials"))
            .expect(1)
            .mount(&server)
            .await;

        let err = suppressor(&server).suppress("IC_1").await.unwrap_err();
        assert!(matches!(err, GitHubError::Http(_)));
    }
}
