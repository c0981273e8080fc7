//! Multi-threaded demo - blocking workers recording into one trace
//!
//! Spawns blocking simulation steps on a Tokio runtime's blocking pool. Each
//! step is timed, and one worker uses the global macros instead of a handle.
//!
//! Run with: cargo run --example multi-thread
//! Then open profiling/profiler.json in https://ui.perfetto.dev
//! or summarize it with: cargo run -- profiling/profiler.json

use scopetrace::{profile_function, profile_scope, InstrumentationTimer, Instrumentor, SessionConfig};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = SessionConfig::new("Demo", "demo_node").with_create_missing_dirs(true);
    let instrumentor = Arc::new(Instrumentor::new());
    instrumentor.begin_session_with_config(&config)?;
    Instrumentor::global().begin_session_with_config(
        &config.clone().with_file_name("global.json"),
    )?;

    println!("Recording to {}", config.output_path().display());

    let mut handles = Vec::new();
    for worker in 0..4u64 {
        let instrumentor = Arc::clone(&instrumentor);
        handles.push(tokio::task::spawn_blocking(move || {
            for round in 0..5u64 {
                let _step = InstrumentationTimer::new(&instrumentor, format!("worker {worker} step"));
                busy_wait(Duration::from_millis(2 + worker + round));

                instrumentor.scope("integrate", || busy_wait(Duration::from_millis(1)));
            }
        }));
    }

    handles.push(tokio::task::spawn_blocking(|| {
        for _ in 0..3 {
            global_step();
        }
    }));

    for handle in handles {
        handle.await?;
    }

    let summary = instrumentor.end_session()?;
    println!("✓ {} records written to {}", summary.record_count, config.output_path().display());

    let global = Instrumentor::global().end_session()?;
    println!("✓ {} records written by the macros", global.record_count);

    Ok(())
}

fn global_step() {
    profile_function!();
    busy_wait(Duration::from_millis(3));
    {
        profile_scope!("global inner");
        busy_wait(Duration::from_millis(1));
    }
}

fn busy_wait(duration: Duration) {
    let start = Instant::now();
    let mut acc = 0u64;
    while start.elapsed() < duration {
        acc = acc.wrapping_add((0..1000).sum::<u64>());
    }
    std::hint::black_box(acc);
}
