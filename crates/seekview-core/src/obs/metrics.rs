use serde::Serialize;
use std::{cell::RefCell, collections::BTreeMap};

///
/// EventState
/// Ephemeral, in-memory counters for metadata builds and navigation.
///

#[derive(Clone, Debug, Default, Serialize)]
pub struct EventState {
    pub ops: EventOps,
    pub entities: BTreeMap<String, EntityCounters>,
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Serialize)]
pub struct EventOps {
    // Metadata registry
    pub models_built: u64,
    pub model_cache_hits: u64,
    pub model_build_failures: u64,

    // Navigator entrypoints
    pub navigate_calls: u64,
    pub navigate_misses: u64,

    // Executor round trips
    pub store_counts: u64,
    pub store_exists: u64,
    pub store_fetches: u64,
    pub rows_fetched: u64,
}

///
/// EntityCounters
///

#[derive(Clone, Debug, Default, Serialize)]
pub struct EntityCounters {
    pub navigate_calls: u64,
    pub navigate_misses: u64,
    pub store_calls: u64,
    pub rows_fetched: u64,
}

///
/// EventReport
/// Point-in-time copy of the counters.
///

pub type EventReport = EventState;

thread_local! {
    static EVENT_STATE: RefCell<EventState> = RefCell::new(EventState::default());
}

/// Borrow metrics immutably.
pub(crate) fn with_state<R>(f: impl FnOnce(&EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&m.borrow()))
}

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&mut m.borrow_mut()))
}

pub(crate) fn reset_all() {
    with_state_mut(|m| *m = EventState::default());
}

pub(crate) fn report() -> EventReport {
    with_state(Clone::clone)
}
