//! Modgate Core - classification clients and decision policies.
//!
//! A [`classifier::Classifier`] turns text into a judgment and a
//! [`policy::DecisionPolicy`] turns that judgment into an [`policy::Outcome`].
//! The two implementations come in matching pairs:
//!
//! | Classifier | Policy |
//! |---|---|
//! | [`classifier::GenerativeClassifier`] | [`policy::FlagPolicy`] |
//! | [`classifier::ModerationClassifier`] | [`policy::ThresholdPolicy`] |

pub mod classifier;
pub mod error;
pub mod policy;
pub mod retry;

pub use error::{ModerationError, Result};
