//! Modgate - moderates workflow text and hides what gets flagged.
//!
//! - [`inputs`] reads and validates the action inputs.
//! - [`pipeline`] classifies, decides, records outputs and hides flagged content.
//! - [`runner`] talks to the workflow runner (outputs and annotations).
//!
//! # Usage
//!
//! ```ignore
//! use clap::Parser;
//! use modgate_app::inputs::Args;
//! use modgate_app::{pipeline, runner};
//!
//! let config = Args::parse().into_config()?;
//! let mut outputs = runner::output_sink(config.output_file.clone());
//! let verdict = pipeline::run_action(config, outputs.as_mut()).await?;
//! ```

pub mod inputs;
pub mod pipeline;
pub mod runner;

pub use inputs::{ActionConfig, Args, Backend, InputError};
pub use pipeline::{run_action, ModerationPipeline, PipelineError, Verdict};
pub use runner::{OutputSink, FLAGGED_CATEGORIES, IS_INAPPROPRIATE, MODERATION_RESULTS_JSON};
