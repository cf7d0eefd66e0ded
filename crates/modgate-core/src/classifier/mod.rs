//! Content classification against OpenAI models.
//!
//! Two classifiers share the [`Classifier`] seam:
//!
//! - [`GenerativeClassifier`] asks a chat model for a JSON verdict and
//!   retries transient failures.
//! - [`ModerationClassifier`] calls the fixed-schema moderation endpoint once.

mod category;
mod generative;
mod moderation;
mod openai;

use async_trait::async_trait;

pub use category::{Category, CategoryJudgment, Thresholds};
pub use generative::{GenerativeClassifier, GenerativeJudgment, DEFAULT_CHAT_MODEL};
pub use moderation::ModerationClassifier;
pub use openai::{OpenAiConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};

use crate::error::Result;

/// A judgment together with the raw JSON the model returned.
#[derive(Debug, Clone, PartialEq)]
pub struct Classified<J> {
    /// The parsed verdict.
    pub judgment: J,
    /// Raw JSON text, surfaced unchanged as an action output.
    pub raw_json: String,
}

/// Trait for classifying one piece of text.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// The verdict this classifier produces.
    type Judgment: Send;

    /// Classifies the given text.
    async fn classify(&self, text: &str) -> Result<Classified<Self::Judgment>>;

    /// Returns the name of this classifier for logging.
    fn name(&self) -> &'static str;
}
