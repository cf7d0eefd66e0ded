//! Classification error types.

use thiserror::Error;

/// Errors that can occur while classifying content.
#[derive(Debug, Error)]
pub enum ModerationError {
    /// The completion carried no message content.
    #[error("Received an empty response from the OpenAI API.")]
    EmptyResponse,

    /// The content was JSON, but not a judgment.
    #[error("Invalid JSON schema received from OpenAI API.")]
    InvalidSchema,

    /// The content was not JSON at all.
    #[error("Malformed JSON received from OpenAI API: {0}")]
    MalformedJson(#[source] serde_json::Error),

    /// The moderation endpoint returned an empty `results` array.
    #[error("OpenAI moderation response contained no results.")]
    NoResults,

    /// The API answered with a non-success status.
    #[error("OpenAI API returned {status}: {message}")]
    Api { status: u16, message: String },

    /// Transport or decoding failure from reqwest.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type for classification operations.
pub type Result<T> = std::result::Result<T, ModerationError>;
