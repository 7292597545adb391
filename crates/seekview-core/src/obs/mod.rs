//! Observability: in-process counters and the sink boundary they flow through.
//!
//! Structured log lines go through `tracing` at the call sites; this module
//! only owns the counters.

pub(crate) mod metrics;
pub(crate) mod sink;


// re-exports
pub use metrics::{EntityCounters, EventOps, EventReport};
pub use sink::{
    MetricsEvent, MetricsSink, NavigateKind, StoreCall, metrics_report, metrics_reset_all,
    with_metrics_sink,
};
