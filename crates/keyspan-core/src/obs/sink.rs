//! Metrics sink boundary.
//!
//! Codec, planner, and scan logic MUST NOT touch obs::metrics directly.
//! All instrumentation flows through MetricsEvent and MetricsSink.
use crate::obs::metrics::{self, EventReport, bump};
use std::{cell::RefCell, rc::Rc};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<Rc<dyn MetricsSink>>> = const { RefCell::new(None) };
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricsEvent {
    KeyEncoded,
    KeyDecoded,
    ConstraintViolation,
    KeyDecodeFailed,
    SlotDegraded,
    PlanCompiled { ranges: u64, skip_scan: bool },
    PlanDegraded { combinations: u64, cap: u64 },
    RowsScanned { rows_scanned: u64, rows_matched: u64 },
    Seeks { seeks: u64 },
    GroupsEmitted { groups: u64 },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent);
}

/// GlobalMetricsSink
/// Default sink writing into the per-thread counter state.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        metrics::with_state_mut(|m| {
            let ops = &mut m.ops;
            match event {
                MetricsEvent::KeyEncoded => bump(&mut ops.keys_encoded, 1),
                MetricsEvent::KeyDecoded => bump(&mut ops.keys_decoded, 1),
                MetricsEvent::ConstraintViolation => bump(&mut ops.constraint_violations, 1),
                MetricsEvent::KeyDecodeFailed => bump(&mut ops.key_decode_failures, 1),
                MetricsEvent::SlotDegraded => bump(&mut ops.slots_degraded, 1),
                MetricsEvent::PlanCompiled { ranges, skip_scan } => {
                    bump(&mut ops.plans_compiled, 1);
                    bump(&mut ops.ranges_emitted, ranges);
                    if skip_scan {
                        bump(&mut ops.plans_skip_scan, 1);
                    }
                }
                MetricsEvent::PlanDegraded { .. } => bump(&mut ops.plans_degraded, 1),
                MetricsEvent::RowsScanned {
                    rows_scanned,
                    rows_matched,
                } => {
                    bump(&mut ops.rows_scanned, rows_scanned);
                    bump(&mut ops.rows_matched, rows_matched);
                }
                MetricsEvent::Seeks { seeks } => bump(&mut ops.seeks, seeks),
                MetricsEvent::GroupsEmitted { groups } => bump(&mut ops.groups_emitted, groups),
            }
        });
    }
}

pub(crate) const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

pub(crate) fn record(event: MetricsEvent) {
    let sink = SINK_OVERRIDE.with(|cell| cell.borrow().clone());
    match sink {
        Some(sink) => sink.record(event),
        None => GLOBAL_METRICS_SINK.record(event),
    }
}

/// Snapshot the current thread's metrics state.
#[must_use]
pub fn metrics_report() -> EventReport {
    metrics::report()
}

/// Reset all metrics state for the current thread.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Run a closure with a temporary metrics sink override.
pub fn with_metrics_sink<T>(sink: Rc<dyn MetricsSink>, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<Rc<dyn MetricsSink>>);

    impl Drop for Guard {
        fn drop(&mut self) {
            let prev = self.0.take();
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = prev;
            });
        }
    }

    let prev = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink));
    let _guard = Guard(prev);

    f()
}

///
/// TESTS
///
