//! Observability: codec and scan telemetry plus the sink abstraction.
//!
//! Instrumentation sites only ever emit `MetricsEvent`s through `sink`.

pub(crate) mod metrics;
pub(crate) mod sink;

// re-exports
pub use metrics::{EventOps, EventReport};
pub use sink::{MetricsEvent, MetricsSink, metrics_report, metrics_reset_all, with_metrics_sink};
