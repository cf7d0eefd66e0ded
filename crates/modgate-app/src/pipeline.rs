//! The moderation run: classify, decide, hide, report.
//!
//! Hiding is best-effort. When the node id cannot be resolved or the
//! mutation fails, a warning is logged and the run still fails on the
//! content violation itself.

use std::io;

use modgate_core::classifier::{Classifier, GenerativeClassifier, ModerationClassifier};
use modgate_core::policy::{DecisionPolicy, FlagPolicy, Outcome, ThresholdPolicy};
use modgate_core::ModerationError;
use modgate_github::{ContentSuppressor, EventSource, GitHubError, GraphQlSuppressor};
use thiserror::Error;

use crate::inputs::{ActionConfig, Backend};
use crate::runner::{OutputSink, FLAGGED_CATEGORIES, IS_INAPPROPRIATE, MODERATION_RESULTS_JSON};

/// Fatal errors of a run. Display text is the failure message.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Classification failed after all attempts.
    #[error(transparent)]
    Classification(#[from] ModerationError),

    /// The GitHub client could not be built.
    #[error(transparent)]
    GitHub(#[from] GitHubError),

    /// A step output could not be written.
    #[error("Failed to write output {name}: {source}")]
    Output {
        name: &'static str,
        #[source]
        source: io::Error,
    },
}

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// Nothing to do; the step passes.
    Appropriate,
    /// The step fails with `message`.
    Flagged {
        outcome: Outcome,
        message: String,
        /// Whether the content was hidden.
        suppressed: bool,
    },
}

impl Verdict {
    /// Returns true if the step should pass.
    pub fn is_success(&self) -> bool {
        matches!(self, Verdict::Appropriate)
    }
}

/// A classifier, its matching policy, and the means to hide content.
pub struct ModerationPipeline<C, P, S> {
    classifier: C,
    policy: P,
    suppressor: S,
    event: EventSource,
}

impl<C, P, S> ModerationPipeline<C, P, S>
where
    C: Classifier,
    P: DecisionPolicy<Judgment = C::Judgment>,
    S: ContentSuppressor,
{
    pub fn new(classifier: C, policy: P, suppressor: S, event: EventSource) -> Self {
        Self {
            classifier,
            policy,
            suppressor,
            event,
        }
    }

    /// Runs the pipeline on one text.
    pub async fn run(
        &self,
        text: &str,
        outputs: &mut dyn OutputSink,
    ) -> Result<Verdict, PipelineError> {
        tracing::info!(
            "Moderating {} characters with the {} classifier",
            text.chars().count(),
            self.classifier.name()
        );

        let classified = self.classifier.classify(text).await?;
        let outcome = self.policy.decide(&classified.judgment);

        set(outputs, MODERATION_RESULTS_JSON, &classified.raw_json)?;
        set(outputs, IS_INAPPROPRIATE, outcome.flagged_output())?;
        set(outputs, FLAGGED_CATEGORIES, &outcome.categories_output())?;

        if !outcome.flagged {
            tracing::info!("Content was deemed appropriate.");
            return Ok(Verdict::Appropriate);
        }

        tracing::info!(
            "Content flagged as inappropriate ({}). Attempting to hide.",
            outcome.categories_output()
        );
        let suppressed = self.hide().await;

        Ok(Verdict::Flagged {
            message: outcome.violation_message(),
            outcome,
            suppressed,
        })
    }

    async fn hide(&self) -> bool {
        let node_id = match self.event.resolve_node_id() {
            Ok(node_id) => node_id,
            Err(e) => {
                tracing::warn!(
                    "Failed to hide content. This might be due to missing permissions or an unsupported event type. Error: {}",
                    e
                );
                return false;
            }
        };

        match self.suppressor.suppress(&node_id).await {
            Ok(()) => {
                tracing::info!("Successfully hid content with node_id: {}", node_id);
                true
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to hide content. This might be due to missing permissions or an unsupported event type. Error: {}",
                    e
                );
                false
            }
        }
    }
}

fn set(outputs: &mut dyn OutputSink, name: &'static str, value: &str) -> Result<(), PipelineError> {
    outputs
        .set_output(name, value)
        .map_err(|source| PipelineError::Output { name, source })
}

/// Builds the pipeline selected by `config` and runs it.
pub async fn run_action(
    config: ActionConfig,
    outputs: &mut dyn OutputSink,
) -> Result<Verdict, PipelineError> {
    let github = &config.github;
    let suppressor = GraphQlSuppressor::new(github.token.clone())?
        .with_endpoint(github.graphql_url.clone())
        .with_reason(github.minimize_reason)
        .with_timeout(config.openai.timeout)?;
    let event = github.event.clone();

    match config.backend {
        Backend::Generative { model, retry } => {
            let classifier = GenerativeClassifier::new(config.openai)?
                .with_model(model)
                .with_retry(retry);
            tracing::debug!(
                "Using chat model {} with up to {} attempts",
                classifier.model(),
                classifier.retry_policy().max_attempts()
            );
            ModerationPipeline::new(classifier, FlagPolicy, suppressor, event)
                .run(&config.text, outputs)
                .await
        }
        Backend::Moderation { model, thresholds } => {
            let mut classifier = ModerationClassifier::new(config.openai)?;
            if let Some(model) = model {
                classifier = classifier.with_model(model);
            }
            tracing::debug!(
                "Using moderation model {}",
                classifier.model().unwrap_or("(endpoint default)")
            );
            ModerationPipeline::new(classifier, ThresholdPolicy::new(thresholds), suppressor, event)
                .run(&config.text, outputs)
                .await
        }
    }
}
