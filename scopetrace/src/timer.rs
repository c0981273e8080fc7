//! Scoped wall-clock timer
//!
//! An [`InstrumentationTimer`] starts measuring when it is created and submits
//! exactly one [`ProfileResult`] to its [`Instrumentor`]: on the first
//! [`stop`](InstrumentationTimer::stop), or on drop if it was never stopped.
//! Drop also runs while unwinding, so a panicking scope is still recorded.
//!
//! ```no_run
//! use scopetrace::{InstrumentationTimer, Instrumentor};
//!
//! # fn main() -> scopetrace::Result<()> {
//! let instrumentor = Instrumentor::new();
//! instrumentor.begin_session("Sim", "controller_node", "trace.json")?;
//! {
//!     let _timer = InstrumentationTimer::new(&instrumentor, "step");
//!     // measured work
//! }
//! instrumentor.end_session()?;
//! # Ok(())
//! # }
//! ```

use log::warn;
use std::borrow::Cow;

use crate::domain::{Duration, Result, Tid, Timestamp};
use crate::session::{Instrumentor, ProfileResult};

pub struct InstrumentationTimer<'a> {
    instrumentor: &'a Instrumentor,
    name: Cow<'static, str>,
    start: Timestamp,
    end: Option<Timestamp>,
}

impl<'a> InstrumentationTimer<'a> {
    /// Start timing a region called `name`
    pub fn new(instrumentor: &'a Instrumentor, name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            instrumentor,
            name: name.into(),
            start: Timestamp::now(),
            end: None,
        }
    }

    /// Stop the clock and submit the measurement.
    ///
    /// Only the first call submits; later calls return `Ok(())`. A failed
    /// submission still counts as stopped and is not retried on drop.
    ///
    /// # Errors
    /// Whatever [`Instrumentor::write_profile`] reports, typically
    /// `WriteAfterClose` when no session is open.
    pub fn stop(&mut self) -> Result<()> {
        if self.end.is_some() {
            return Ok(());
        }
        let end = Timestamp::now();
        self.end = Some(end);

        self.instrumentor.write_profile(&ProfileResult {
            name: self.name.clone(),
            start: self.start,
            end,
            thread_id: Tid::current(),
        })
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.end.is_some()
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn start(&self) -> Timestamp {
        self.start
    }

    /// Time measured so far, or the final span once stopped
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.end.unwrap_or_else(Timestamp::now) - self.start
    }
}

impl Drop for InstrumentationTimer<'_> {
    fn drop(&mut self) {
        if self.is_stopped() {
            return;
        }
        if let Err(e) = self.stop() {
            warn!("Profile record for \"{}\" lost: {e}", self.name);
        }
    }
}
