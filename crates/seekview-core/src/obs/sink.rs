//! Metrics sink boundary.
//!
//! Model and navigator code never touches `obs::metrics` directly; every
//! counter update flows through `MetricsEvent` and `MetricsSink`.

use crate::obs::metrics;
use std::{cell::RefCell, rc::Rc};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<Rc<dyn MetricsSink>>> = const { RefCell::new(None) };
}

///
/// NavigateKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NavigateKind {
    First,
    Last,
    Next,
    Previous,
    At,
    Count,
    Contains,
    IndexOf,
    Window,
}

///
/// StoreCall
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StoreCall {
    Count,
    Exists,
    FetchOne,
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricsEvent {
    ModelBuilt {
        type_name: &'static str,
    },
    ModelCacheHit {
        type_name: &'static str,
    },
    ModelBuildFailed {
        type_name: &'static str,
    },
    Navigate {
        kind: NavigateKind,
        entity: &'static str,
    },
    /// Navigation returned nothing: no neighbour, or the anchor is gone.
    NavigateMiss {
        kind: NavigateKind,
        entity: &'static str,
    },
    Store {
        call: StoreCall,
        entity: &'static str,
        rows: u64,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent);
}

/// GlobalMetricsSink
/// Default sink writing into the thread-local counters.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        match event {
            MetricsEvent::ModelBuilt { .. } => metrics::with_state_mut(|m| {
                m.ops.models_built = m.ops.models_built.saturating_add(1);
            }),

            MetricsEvent::ModelCacheHit { .. } => metrics::with_state_mut(|m| {
                m.ops.model_cache_hits = m.ops.model_cache_hits.saturating_add(1);
            }),

            MetricsEvent::ModelBuildFailed { .. } => metrics::with_state_mut(|m| {
                m.ops.model_build_failures = m.ops.model_build_failures.saturating_add(1);
            }),

            MetricsEvent::Navigate { entity, .. } => metrics::with_state_mut(|m| {
                m.ops.navigate_calls = m.ops.navigate_calls.saturating_add(1);
                let entry = m.entities.entry(entity.to_string()).or_default();
                entry.navigate_calls = entry.navigate_calls.saturating_add(1);
            }),

            MetricsEvent::NavigateMiss { entity, .. } => metrics::with_state_mut(|m| {
                m.ops.navigate_misses = m.ops.navigate_misses.saturating_add(1);
                let entry = m.entities.entry(entity.to_string()).or_default();
                entry.navigate_misses = entry.navigate_misses.saturating_add(1);
            }),

            MetricsEvent::Store { call, entity, rows } => metrics::with_state_mut(|m| {
                match call {
                    StoreCall::Count => m.ops.store_counts = m.ops.store_counts.saturating_add(1),
                    StoreCall::Exists => m.ops.store_exists = m.ops.store_exists.saturating_add(1),
                    StoreCall::FetchOne => {
                        m.ops.store_fetches = m.ops.store_fetches.saturating_add(1);
                    }
                }
                m.ops.rows_fetched = m.ops.rows_fetched.saturating_add(rows);

                let entry = m.entities.entry(entity.to_string()).or_default();
                entry.store_calls = entry.store_calls.saturating_add(1);
                entry.rows_fetched = entry.rows_fetched.saturating_add(rows);
            }),
        }
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

/// Snapshot the current thread's counters.
#[must_use]
pub fn metrics_report() -> metrics::EventReport {
    metrics::report()
}

/// Reset all counters on the current thread.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Run a closure with a temporary metrics sink override.
///
/// The previous sink is restored on every exit, unwinding included.
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
