//! Event identifier resolution.
//!
//! The workflow event that triggered the run decides where the node id of
//! the moderated content lives in the payload.

use std::fmt;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{GitHubError, Result};

/// Runner variable holding the event name.
pub const EVENT_NAME_VAR: &str = "GITHUB_EVENT_NAME";

/// Runner variable holding the path of the event payload file.
pub const EVENT_PATH_VAR: &str = "GITHUB_EVENT_PATH";

/// Workflow events that carry moderatable content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    IssueComment,
    PullRequestReviewComment,
    DiscussionComment,
    Issues,
    PullRequest,
    PullRequestTarget,
    Discussion,
    /// Any other event; never resolves.
    Unsupported(String),
}

impl EventKind {
    /// Maps a workflow event name to its kind.
    pub fn from_name(name: &str) -> Self {
        match name {
            "issue_comment" => EventKind::IssueComment,
            "pull_request_review_comment" => EventKind::PullRequestReviewComment,
            "discussion_comment" => EventKind::DiscussionComment,
            "issues" => EventKind::Issues,
            "pull_request" => EventKind::PullRequest,
            "pull_request_target" => EventKind::PullRequestTarget,
            "discussion" => EventKind::Discussion,
            other => EventKind::Unsupported(other.to_string()),
        }
    }

    /// Returns the workflow event name.
    pub fn name(&self) -> &str {
        match self {
            EventKind::IssueComment => "issue_comment",
            EventKind::PullRequestReviewComment => "pull_request_review_comment",
            EventKind::DiscussionComment => "discussion_comment",
            EventKind::Issues => "issues",
            EventKind::PullRequest => "pull_request",
            EventKind::PullRequestTarget => "pull_request_target",
            EventKind::Discussion => "discussion",
            EventKind::Unsupported(name) => name,
        }
    }

    /// Returns the payload object that holds the `node_id`, if supported.
    pub fn subject_key(&self) -> Option<&'static str> {
        match self {
            EventKind::IssueComment
            | EventKind::PullRequestReviewComment
            | EventKind::DiscussionComment => Some("comment"),
            EventKind::Issues => Some("issue"),
            EventKind::PullRequest | EventKind::PullRequestTarget => Some("pull_request"),
            EventKind::Discussion => Some("discussion"),
            EventKind::Unsupported(_) => None,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The triggering event and its JSON payload.
#[derive(Debug, Clone, PartialEq)]
pub struct EventContext {
    pub kind: EventKind,
    pub payload: Value,
}

impl EventContext {
    /// Creates a context from an event name and payload.
    pub fn new(name: &str, payload: Value) -> Self {
        Self {
            kind: EventKind::from_name(name),
            payload,
        }
    }

    /// Loads the payload from a file.
    pub fn from_file(name: &str, path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let payload = serde_json::from_str(&contents)?;
        Ok(Self::new(name, payload))
    }

    /// Resolves the node id of the content the event is about.
    pub fn node_id(&self) -> Result<String> {
        let Some(key) = self.kind.subject_key() else {
            tracing::info!("Unsupported event type: {}", self.kind);
            return Err(GitHubError::NodeIdUnresolved);
        };

        self.payload
            .get(key)
            .and_then(|subject| subject.get("node_id"))
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .ok_or(GitHubError::NodeIdUnresolved)
    }
}

/// Where to find the event, as described by the runner environment.
///
/// Loading is deferred until a node id is actually needed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventSource {
    pub name: Option<String>,
    pub payload_path: Option<PathBuf>,
}

impl EventSource {
    /// Creates a source from explicit values.
    pub fn new(name: Option<String>, payload_path: Option<PathBuf>) -> Self {
        Self { name, payload_path }
    }

    /// Reads `GITHUB_EVENT_NAME` and `GITHUB_EVENT_PATH`.
    pub fn from_env() -> Self {
        let var = |key: &str| std::env::var(key).ok().filter(|v| !v.is_empty());
        Self {
            name: var(EVENT_NAME_VAR),
            payload_path: var(EVENT_PATH_VAR).map(PathBuf::from),
        }
    }

    /// Loads the event context.
    pub fn load(&self) -> Result<EventContext> {
        let name = self
            .name
            .as_deref()
            .ok_or(GitHubError::MissingEventContext(EVENT_NAME_VAR))?;
        let path = self
            .payload_path
            .as_deref()
            .ok_or(GitHubError::MissingEventContext(EVENT_PATH_VAR))?;

        EventContext::from_file(name, path)
    }

    /// Loads the event and resolves its node id.
    pub fn resolve_node_id(&self) -> Result<String> {
        self.load()?.node_id()
    }
}
