//! Domain types providing compile-time safety and self-documentation
//!
//! Timestamps and durations are both plain microsecond counts, so they get
//! separate newtypes to keep a `ts` from being written where a `dur` belongs.

use std::cell::Cell;
use std::fmt;
use std::ops::Sub;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Thread ID
///
/// A small integer handed out the first time a thread asks for its id.
/// Two threads alive at the same time never share an id; ids are not
/// stable across process restarts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tid(pub u64);

static NEXT_TID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static CURRENT_TID: Cell<Option<Tid>> = const { Cell::new(None) };
}

impl Tid {
    /// Id of the calling thread
    #[must_use]
    pub fn current() -> Self {
        CURRENT_TID.with(|slot| {
            if let Some(tid) = slot.get() {
                return tid;
            }
            let tid = Tid(NEXT_TID.fetch_add(1, Ordering::Relaxed));
            slot.set(Some(tid));
            tid
        })
    }
}

impl fmt::Display for Tid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TID:{}", self.0)
    }
}

/// Timestamp in microseconds
///
/// Wall-clock time since the UNIX epoch. Negative when the clock reads
/// earlier than the epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Read the wall clock
    #[must_use]
    pub fn now() -> Self {
        Self::from_system_time(SystemTime::now())
    }

    /// Truncate a `SystemTime` to whole microseconds
    #[must_use]
    pub fn from_system_time(time: SystemTime) -> Self {
        match time.duration_since(UNIX_EPOCH) {
            Ok(since) => Timestamp(i64::try_from(since.as_micros()).unwrap_or(i64::MAX)),
            Err(before) => {
                Timestamp(-i64::try_from(before.duration().as_micros()).unwrap_or(i64::MAX))
            }
        }
    }

    /// Raw microsecond count
    #[must_use]
    pub fn as_micros(self) -> i64 {
        self.0
    }

    /// Convert to seconds (f64)
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn as_seconds(self) -> f64 {
        self.0 as f64 / 1_000_000.0
    }
}

impl Sub for Timestamp {
    type Output = Duration;

    fn sub(self, earlier: Timestamp) -> Duration {
        Duration(self.0.wrapping_sub(earlier.0))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}s", self.as_seconds())
    }
}

/// Duration in microseconds
///
/// Signed: a wall clock stepped backwards mid-scope yields a negative span,
/// and the trace records exactly what the clock said.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Duration(pub i64);

impl Duration {
    /// Raw microsecond count
    #[must_use]
    pub fn as_micros(self) -> i64 {
        self.0
    }

    /// Convert to milliseconds (f64)
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn as_millis(self) -> f64 {
        self.0 as f64 / 1_000.0
    }

    /// Convert to seconds (f64)
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn as_seconds(self) -> f64 {
        self.0 as f64 / 1_000_000.0
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ms = self.as_millis();
        if ms.abs() >= 1000.0 {
            write!(f, "{:.2}s", self.as_seconds())
        } else if ms.abs() >= 1.0 {
            write!(f, "{ms:.2}ms")
        } else {
            write!(f, "{}us", self.0)
        }
    }
}
