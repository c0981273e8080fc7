//! CLI argument definitions

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "scopetrace",
    about = "Summarize a scope trace written by scopetrace",
    after_help = "\
EXAMPLES:
    scopetrace profiling/profiler.json            Busiest 20 scopes
    scopetrace trace.json --top 5                 Busiest 5 scopes
    scopetrace trace.json --quiet                 Table only, no header"
)]
pub struct Args {
    /// Trace file to summarize
    #[arg(value_name = "TRACE")]
    pub trace: PathBuf,

    /// Number of scopes to show (0 = all)
    #[arg(long, default_value = "20")]
    pub top: usize,

    /// Suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,
}
