//! Module: scan
//! Responsibility: compiling key slots into ordered scan ranges and running
//! them against an ordered store.
//! Does not own: predicate lowering or per-type encodings.
//! Boundary: the store sees only `[start, stop)` byte pairs in ascending order.

mod compile;
mod executor;
mod framing;
mod skip;
mod store;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};

// re-exports
pub use compile::{CompiledScan, compile, compile_predicates};
pub use executor::{ScanOutput, ScanStats, execute, execute_parallel};
pub use skip::{Navigation, SkipScanFilter};
pub use store::{MemoryStore, OrderedStore};

///
/// ScanRange
///
/// Half-open `[start, stop)` key interval. An empty `stop` is unbounded.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ScanRange {
    #[serde(with = "serde_bytes")]
    pub start: Vec<u8>,
    #[serde(with = "serde_bytes")]
    pub stop: Vec<u8>,
}

impl ScanRange {
    #[must_use]
    pub const fn new(start: Vec<u8>, stop: Vec<u8>) -> Self {
        Self { start, stop }
    }

    /// The whole key space.
    #[must_use]
    pub const fn full() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    #[must_use]
    pub const fn is_unbounded_above(&self) -> bool {
        self.stop.is_empty()
    }

    #[must_use]
    pub fn contains(&self, key: &[u8]) -> bool {
        key >= self.start.as_slice() && !self.is_past(key)
    }

    /// True when `key` is at or beyond this range's stop.
    #[must_use]
    pub fn is_past(&self, key: &[u8]) -> bool {
        !self.is_unbounded_above() && key >= self.stop.as_slice()
    }
}

///
/// ScanPlan
///
/// Disjoint, ascending ranges plus an optional key filter for constrained
/// columns the ranges cannot express.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ScanPlan {
    ranges: Vec<ScanRange>,
    key_filter: Option<SkipScanFilter>,
    degraded: bool,
}

impl ScanPlan {
    /// A plan that matches nothing.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            ranges: Vec::new(),
            key_filter: None,
            degraded: false,
        }
    }

    #[must_use]
    pub fn ranges(&self) -> &[ScanRange] {
        &self.ranges
    }

    #[must_use]
    pub const fn key_filter(&self) -> Option<&SkipScanFilter> {
        self.key_filter.as_ref()
    }

    /// True when the range cap collapsed the plan into one spanning range.
    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        self.degraded
    }

    #[must_use]
    pub const fn uses_skip_scan(&self) -> bool {
        self.key_filter.is_some()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}
