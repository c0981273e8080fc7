//! Trace data model for reading written trace files back
//!
//! Only complete (`"X"`) events are kept; metadata and begin/end pairs from
//! other producers are skipped.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use crate::domain::{Duration, Tid, Timestamp};

/// Represents a single complete event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEvent {
    pub name: String,
    pub tid: Tid,
    pub ts: Timestamp,
    pub dur: Duration,
}

impl TraceEvent {
    /// `ts + dur`, saturating for values no clock would produce
    #[must_use]
    pub fn end(&self) -> Timestamp {
        Timestamp(self.ts.0.saturating_add(self.dur.0))
    }
}

/// Internal data model for a trace (immutable, loaded from file)
#[derive(Debug)]
pub struct TraceData {
    pub events: Vec<TraceEvent>,
    /// Distinct thread ids, sorted
    pub threads: Vec<Tid>,
    /// From the earliest start to the latest end
    pub duration: Duration,
}

impl TraceData {
    /// Parse a trace file into our internal representation
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open trace file {}", path.display()))?;
        Self::from_reader(std::io::BufReader::new(file))
            .with_context(|| format!("Failed to parse trace file {}", path.display()))
    }

    /// Parse a trace from any reader
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        let json: serde_json::Value = serde_json::from_reader(reader)?;

        let mut events = Vec::new();
        let mut threads = HashSet::new();

        if let Some(trace_events) = json["traceEvents"].as_array() {
            for event in trace_events {
                if event["ph"].as_str() != Some("X") {
                    continue;
                }

                let name = event["name"].as_str().unwrap_or("unknown").to_string();
                let tid = Tid(event["tid"].as_u64().unwrap_or(0));
                let ts = Timestamp(micros(&event["ts"]));
                let dur = Duration(micros(&event["dur"]));

                threads.insert(tid);
                events.push(TraceEvent { name, tid, ts, dur });
            }
        }

        let mut threads: Vec<Tid> = threads.into_iter().collect();
        threads.sort();

        let duration = match (
            events.iter().map(|e| e.ts).min(),
            events.iter().map(TraceEvent::end).max(),
        ) {
            (Some(first), Some(last)) => Duration(last.0.saturating_sub(first.0)),
            _ => Duration::default(),
        };

        Ok(TraceData { events, threads, duration })
    }

    /// Get event count
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.events.len()
    }
}

// Other producers write fractional microseconds; truncate those.
#[allow(clippy::cast_possible_truncation)]
fn micros(value: &serde_json::Value) -> i64 {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|v| v as i64))
        .unwrap_or(0)
}
