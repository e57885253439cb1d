use serde::{Deserialize, Serialize};
use std::cell::RefCell;

///
/// EventState
/// Ephemeral, per-thread counters for codec, planning, and scan work.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub(crate) struct EventState {
    pub(crate) ops: EventOps,
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EventOps {
    // Codec
    pub keys_encoded: u64,
    pub keys_decoded: u64,
    pub constraint_violations: u64,
    pub key_decode_failures: u64,

    // Planning
    pub slots_degraded: u64,
    pub plans_compiled: u64,
    pub plans_skip_scan: u64,
    pub plans_degraded: u64,
    pub ranges_emitted: u64,

    // Scan execution
    pub rows_scanned: u64,
    pub rows_matched: u64,
    pub seeks: u64,

    // Grouping
    pub groups_emitted: u64,
}

///
/// EventReport
/// Serializable snapshot of the current counters.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EventReport {
    pub counters: EventOps,
}

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

/// Reset all counters.
pub(crate) fn reset_all() {
    with_state_mut(|m| *m = EventState::default());
}

#[must_use]
pub(crate) fn report() -> EventReport {
    with_state(|m| EventReport {
        counters: m.ops.clone(),
    })
}

/// Saturating counter bump.
pub(crate) const fn bump(counter: &mut u64, by: u64) {
    *counter = counter.saturating_add(by);
}
