//! GitHub error types.

use thiserror::Error;

/// Errors that can occur while locating or hiding content on GitHub.
#[derive(Debug, Error)]
pub enum GitHubError {
    /// The event payload did not yield a node id.
    #[error("Could not determine the node_id from the event payload.")]
    NodeIdUnresolved,

    /// A runner variable describing the event is not set.
    #[error("{0} is not set; cannot determine the content to hide.")]
    MissingEventContext(&'static str),

    /// The event payload file could not be read.
    #[error("Failed to read event payload: {0}")]
    Io(#[from] std::io::Error),

    /// The event payload (or a GraphQL response) is not valid JSON.
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The GraphQL API answered with errors.
    #[error("GraphQL request failed: {0}")]
    GraphQl(String),

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type for GitHub operations.
pub type Result<T> = std::result::Result<T, GitHubError>;
