//! Domain logic for the script-to-document pipeline.
//!
//! Everything here is local: artifact kinds and lookup, the per-request
//! scratch directory, and subprocess execution. No network access.

pub mod artifact;
pub mod error;
pub mod scratch;
pub mod scripting;
