//! Command-line interface for the trace summary binary

mod args;

pub use args::Args;
