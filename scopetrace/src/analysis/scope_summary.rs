//! Per-scope aggregation of a recorded trace.
//!
//! Groups complete events by name and reports how often each scope ran and
//! how much time it took. Nested scopes are counted in full for both parent
//! and child, so percentages are shares of *recorded* time and can sum past
//! 100% of wall time.

// Percentage calculations intentionally convert integers to f64
#![allow(clippy::cast_precision_loss)]

use std::collections::HashMap;

use crate::domain::Duration;
use crate::trace_data::TraceData;

/// Aggregated statistics for one scope name
#[derive(Debug, Clone, PartialEq)]
pub struct ScopeStats {
    pub name: String,
    pub count: usize,
    pub total: Duration,
    pub max: Duration,
    pub mean: Duration,
    /// Share of all recorded time (0.0 - 100.0)
    pub percentage: f64,
}

#[derive(Debug, Default)]
struct Accumulator {
    count: usize,
    total: i64,
    max: i64,
}

/// Summarize a trace, busiest scope first.
///
/// Ties on total time are broken by name so the output is deterministic.
#[must_use]
pub fn summarize(data: &TraceData) -> Vec<ScopeStats> {
    let mut by_name: HashMap<&str, Accumulator> = HashMap::new();
    for event in &data.events {
        let acc = by_name.entry(event.name.as_str()).or_default();
        if acc.count == 0 || event.dur.0 > acc.max {
            acc.max = event.dur.0;
        }
        acc.count += 1;
        acc.total = acc.total.saturating_add(event.dur.0);
    }

    let grand_total = by_name.values().fold(0i64, |sum, a| sum.saturating_add(a.total));

    let mut stats: Vec<ScopeStats> = by_name
        .into_iter()
        .map(|(name, acc)| ScopeStats {
            name: name.to_string(),
            count: acc.count,
            total: Duration(acc.total),
            max: Duration(acc.max),
            mean: Duration(acc.total / acc.count as i64),
            percentage: if grand_total > 0 {
                acc.total as f64 * 100.0 / grand_total as f64
            } else {
                0.0
            },
        })
        .collect();

    stats.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.name.cmp(&b.name)));
    stats
}
