//! Analysis of recorded traces
//!
//! Aggregates complete events by scope name for the `scopetrace` summary.

pub mod scope_summary;

pub use scope_summary::{summarize, ScopeStats};
