//! The execute-then-publish pipeline.
//!
//! [`runner::Pipeline`] takes a [`submission::ScriptSubmission`] through
//! materialize, execute, locate, and publish, and always finalizes the
//! request's scratch directory. Every expected failure comes back as a
//! [`error::PipelineError`].

pub mod error;
pub mod runner;
pub mod submission;

pub use error::PipelineError;
pub use runner::{Pipeline, PipelineConfig};
pub use submission::ScriptSubmission;
