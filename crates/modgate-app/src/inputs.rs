//! Action inputs.
//!
//! The runner exposes each input as an `INPUT_<NAME>` environment variable;
//! every input can also be given as a `--<name>` flag for local runs. Values
//! arrive as strings and are validated here, before any network call.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use modgate_core::classifier::{Category, OpenAiConfig, Thresholds, DEFAULT_CHAT_MODEL};
use modgate_core::retry::{RetryPolicy, DEFAULT_MAX_ATTEMPTS};
use modgate_github::suppress::DEFAULT_GRAPHQL_URL;
use modgate_github::{EventSource, MinimizeReason};
use thiserror::Error;

/// Errors raised while validating inputs.
#[derive(Debug, Error, PartialEq)]
pub enum InputError {
    /// A required input is absent or blank.
    #[error("Input required and not supplied: {0}")]
    Missing(&'static str),

    /// An input could not be parsed.
    #[error("Invalid value '{value}' for input {name}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Modgate - hide inappropriate comments flagged by OpenAI
#[derive(Parser, Debug, Default)]
#[command(name = "modgate", version, about)]
pub struct Args {
    /// Token used to hide flagged content
    #[arg(long, env = "INPUT_GITHUB-TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// OpenAI API key
    #[arg(long, env = "INPUT_OPENAI-API-KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// Text to moderate
    #[arg(long, env = "INPUT_TEXT-TO-MODERATE")]
    pub text_to_moderate: Option<String>,

    /// Classifier to use: generative or moderation
    #[arg(long, env = "INPUT_CLASSIFIER")]
    pub classifier: Option<String>,

    /// Model identifier (defaults depend on the classifier)
    #[arg(long, env = "INPUT_MODEL")]
    pub model: Option<String>,

    /// Attempts for the generative classifier
    #[arg(long, env = "INPUT_RETRY-COUNT")]
    pub retry_count: Option<String>,

    #[arg(long, env = "INPUT_THRESHOLD-HATE")]
    pub threshold_hate: Option<String>,

    #[arg(long, env = "INPUT_THRESHOLD-HATE-THREATENING")]
    pub threshold_hate_threatening: Option<String>,

    #[arg(long, env = "INPUT_THRESHOLD-SEXUAL")]
    pub threshold_sexual: Option<String>,

    #[arg(long, env = "INPUT_THRESHOLD-VIOLENCE")]
    pub threshold_violence: Option<String>,

    #[arg(long, env = "INPUT_THRESHOLD-SELF-HARM")]
    pub threshold_self_harm: Option<String>,

    /// Reason shown on hidden content
    #[arg(long, env = "INPUT_MINIMIZE-REASON")]
    pub minimize_reason: Option<String>,

    /// OpenAI-compatible API base URL
    #[arg(long, env = "INPUT_OPENAI-BASE-URL")]
    pub openai_base_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, env = "INPUT_REQUEST-TIMEOUT")]
    pub request_timeout: Option<String>,

    /// GitHub GraphQL endpoint
    #[arg(long, env = "GITHUB_GRAPHQL_URL")]
    pub github_graphql_url: Option<String>,

    /// Name of the triggering event
    #[arg(long, env = "GITHUB_EVENT_NAME")]
    pub event_name: Option<String>,

    /// Path of the event payload
    #[arg(long, env = "GITHUB_EVENT_PATH")]
    pub event_path: Option<PathBuf>,

    /// File receiving step outputs
    #[arg(long, env = "GITHUB_OUTPUT")]
    pub output_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, env = "RUNNER_DEBUG", value_parser = clap::builder::FalseyValueParser::new())]
    pub debug: bool,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// Which classifier/policy pair to run.
#[derive(Debug, Clone, PartialEq)]
pub enum Backend {
    /// Chat model verdict, retried.
    Generative { model: String, retry: RetryPolicy },
    /// Moderation endpoint scores against thresholds.
    Moderation {
        model: Option<String>,
        thresholds: Thresholds,
    },
}

impl Backend {
    /// Returns the backend name as accepted by the `classifier` input.
    pub fn name(&self) -> &'static str {
        match self {
            Backend::Generative { .. } => "generative",
            Backend::Moderation { .. } => "moderation",
        }
    }
}

/// GitHub settings for hiding content.
#[derive(Debug, Clone, PartialEq)]
pub struct GitHubSettings {
    pub token: String,
    pub graphql_url: String,
    pub minimize_reason: MinimizeReason,
    pub event: EventSource,
}

/// Validated configuration for one run.
#[derive(Debug, Clone)]
pub struct ActionConfig {
    pub text: String,
    pub openai: OpenAiConfig,
    pub backend: Backend,
    pub github: GitHubSettings,
    pub output_file: Option<PathBuf>,
}

/// Returns the trimmed value, treating blank strings as absent.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn required<'a>(name: &'static str, value: &'a Option<String>) -> Result<&'a str, InputError> {
    present(value).ok_or(InputError::Missing(name))
}

fn invalid(name: &'static str, value: &str, reason: impl ToString) -> InputError {
    InputError::Invalid {
        name,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

impl Args {
    fn threshold_input(&self, category: Category) -> &Option<String> {
        match category {
            Category::Hate => &self.threshold_hate,
            Category::HateThreatening => &self.threshold_hate_threatening,
            Category::Sexual => &self.threshold_sexual,
            Category::Violence => &self.threshold_violence,
            Category::SelfHarm => &self.threshold_self_harm,
        }
    }

    fn retry_policy(&self) -> Result<RetryPolicy, InputError> {
        let Some(raw) = present(&self.retry_count) else {
            return Ok(RetryPolicy::new(DEFAULT_MAX_ATTEMPTS));
        };

        let attempts: u32 = raw
            .parse()
            .map_err(|e| invalid("retry-count", raw, e))?;
        if attempts == 0 {
            return Err(invalid("retry-count", raw, "must be at least 1"));
        }
        Ok(RetryPolicy::new(attempts))
    }

    fn thresholds(&self) -> Result<Thresholds, InputError> {
        let mut thresholds = Thresholds::uniform(f64::NAN);
        for &category in Category::all() {
            let name = category.threshold_input();
            let raw = required(name, self.threshold_input(category))?;
            let value: f64 = raw.parse().map_err(|e| invalid(name, raw, e))?;
            thresholds.set(category, value);
        }
        Ok(thresholds)
    }

    fn backend(&self) -> Result<Backend, InputError> {
        let model = present(&self.model).map(str::to_string);

        match present(&self.classifier).unwrap_or("generative") {
            "generative" => Ok(Backend::Generative {
                model: model.unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
                retry: self.retry_policy()?,
            }),
            "moderation" => Ok(Backend::Moderation {
                model,
                thresholds: self.thresholds()?,
            }),
            other => Err(invalid(
                "classifier",
                other,
                "expected 'generative' or 'moderation'",
            )),
        }
    }

    fn timeout(&self) -> Result<Duration, InputError> {
        let Some(raw) = present(&self.request_timeout) else {
            return Ok(modgate_core::classifier::DEFAULT_TIMEOUT);
        };
        let secs: u64 = raw
            .parse()
            .map_err(|e| invalid("request-timeout", raw, e))?;
        if secs == 0 {
            return Err(invalid("request-timeout", raw, "must be at least 1"));
        }
        Ok(Duration::from_secs(secs))
    }

    /// Validates the inputs into a run configuration.
    pub fn into_config(self) -> Result<ActionConfig, InputError> {
        let github_token = required("github-token", &self.github_token)?.to_string();
        let api_key = required("openai-api-key", &self.openai_api_key)?;
        let text = required("text-to-moderate", &self.text_to_moderate)?.to_string();

        let backend = self.backend()?;

        let minimize_reason = match present(&self.minimize_reason) {
            Some(raw) => raw
                .parse()
                .map_err(|e: String| invalid("minimize-reason", raw, e))?,
            None => MinimizeReason::default(),
        };

        let mut openai = OpenAiConfig::new(api_key).with_timeout(self.timeout()?);
        if let Some(base_url) = present(&self.openai_base_url) {
            openai = openai.with_base_url(base_url);
        }

        let github = GitHubSettings {
            token: github_token,
            graphql_url: present(&self.github_graphql_url)
                .unwrap_or(DEFAULT_GRAPHQL_URL)
                .to_string(),
            minimize_reason,
            event: EventSource::new(
                present(&self.event_name).map(str::to_string),
                self.event_path.clone(),
            ),
        };

        Ok(ActionConfig {
            text,
            openai,
            backend,
            github,
            output_file: self.output_file,
        })
    }
}
