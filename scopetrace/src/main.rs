//! # scopetrace - Trace Summary
//!
//! Reads a trace written by the scopetrace library and prints the busiest
//! scopes, aggregated by name.

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use scopetrace::analysis::summarize;
use scopetrace::cli::Args;
use scopetrace::trace_data::TraceData;

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;

fn main() {
    env_logger::init();
    std::process::exit(match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            EXIT_ERROR
        }
    });
}

fn run() -> Result<()> {
    let args = Args::parse();

    let data = TraceData::from_file(&args.trace)
        .with_context(|| format!("Cannot summarize {}", args.trace.display()))?;
    info!("Loaded {} complete events from {}", data.event_count(), args.trace.display());

    if !args.quiet {
        println!(
            "{}: {} events on {} threads over {}\n",
            args.trace.display(),
            data.event_count(),
            data.threads.len(),
            data.duration
        );
    }

    let stats = summarize(&data);
    let shown = if args.top == 0 { stats.len() } else { args.top.min(stats.len()) };

    println!(
        "{:<48} {:>8} {:>12} {:>12} {:>12} {:>7}",
        "SCOPE", "COUNT", "TOTAL", "MEAN", "MAX", "SHARE"
    );
    for scope in &stats[..shown] {
        println!(
            "{:<48} {:>8} {:>12} {:>12} {:>12} {:>6.1}%",
            scope.name,
            scope.count,
            scope.total.to_string(),
            scope.mean.to_string(),
            scope.max.to_string(),
            scope.percentage
        );
    }

    if shown < stats.len() && !args.quiet {
        println!("\n... {} more scopes (use --top 0 to show all)", stats.len() - shown);
    }

    Ok(())
}
