//! # scopetrace - Scoped Timers Streaming Chrome Trace JSON
//!
//! scopetrace measures the wall-clock duration of code regions inside a
//! running process and streams each measurement to a trace file that
//! `chrome://tracing` and <https://ui.perfetto.dev> open directly.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                    Host Application                      │
//! │   begin_session()      timers / profile_scope!()         │
//! └───────────┬───────────────────────┬──────────────────────┘
//!             │                       │ ProfileResult on stop/drop
//!             ▼                       ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │                Instrumentor (session manager)            │
//! │   Mutex<Option<ActiveSession>>: stream + record counter  │
//! └───────────────────────────┬──────────────────────────────┘
//!                             │ one flushed JSON object per record
//!                             ▼
//!                     profiling/profiler.json
//!                             │
//!                             ▼
//!             trace_data + analysis (scopetrace binary)
//! ```
//!
//! ## Module Structure
//!
//! - [`session`]: the [`Instrumentor`], owner of the one open trace stream
//! - [`timer`]: [`InstrumentationTimer`], which reports exactly once
//! - [`config`]: [`SessionConfig`], resolving `install_root/profiling/profiler.json`
//! - [`domain`]: newtypes (`Timestamp`, `Duration`, `Tid`) and [`InstrumentError`]
//! - [`trace_data`] and [`analysis`]: read a finished trace back and summarize it
//! - [`cli`]: arguments of the `scopetrace` summary binary
//!
//! ## Typical Usage
//!
//! ```no_run
//! use scopetrace::{InstrumentationTimer, Instrumentor};
//!
//! # fn main() -> scopetrace::Result<()> {
//! let instrumentor = Instrumentor::new();
//! instrumentor.begin_session("Sim", "controller_node", "trace.json")?;
//!
//! let mut timer = InstrumentationTimer::new(&instrumentor, "step");
//! // ... work ...
//! timer.stop()?;
//!
//! instrumentor.scope("integrate", || {
//!     // ... more work, recorded even if it panics ...
//! });
//!
//! let summary = instrumentor.end_session()?;
//! assert_eq!(summary.record_count, 2);
//! # Ok(())
//! # }
//! ```
//!
//! Where passing an `Instrumentor` around is impractical, the
//! [`profile_scope!`], [`profile_function!`] and `profile_and_log_*` macros
//! record into [`Instrumentor::global`].
//!
//! ## Failure Policy
//!
//! Profiling is best-effort. Every failure is an [`InstrumentError`] returned
//! to the immediate caller; timers dropped without an open session log a
//! warning and lose the record. Nothing here panics the host.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod domain;
mod macros;
pub mod session;
pub mod timer;
pub mod trace_data;

pub use config::SessionConfig;
pub use domain::{Duration, InstrumentError, Result, Tid, Timestamp};
pub use session::{Instrumentor, ProfileResult, SessionSummary, DEFAULT_OUTPUT_FILE};
pub use timer::InstrumentationTimer;

#[doc(hidden)]
pub use log as __log;
