//! Modgate GitHub - locating and hiding moderated content.
//!
//! - [`event`] resolves the node id of the content a workflow event is about.
//! - [`suppress`] minimizes that node through the GraphQL API.

pub mod error;
pub mod event;
pub mod suppress;

pub use error::{GitHubError, Result};
pub use event::{EventContext, EventKind, EventSource};
pub use suppress::{ContentSuppressor, GraphQlSuppressor, MinimizeReason};
