//! Contains helper functions to reduce boilerplate code in other `app` modules.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::events::TreeEvent;
use super::proxy::EventProxy;
use super::state::TreeState;

/// Locks the state. A panic in another holder cannot leave the state
/// half-written (every write is a single assignment), so poisoning is ignored.
pub fn lock_state(state: &Mutex<TreeState>) -> MutexGuard<'_, TreeState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Locks the `TreeState`, performs a mutation, and then sends an event for
/// each part the presentation layer can observe that actually changed: a
/// `Snapshot` when the forest reference differs, a `Status` when the
/// status differs.
pub fn with_state_and_notify<F, R, P: EventProxy>(
    state: &Arc<Mutex<TreeState>>,
    proxy: &P,
    update_fn: F,
) -> R
where
    F: FnOnce(&mut TreeState) -> R,
{
    let mut state_guard = lock_state(state);
    let previous_forest = state_guard.forest.clone();
    let previous_status = state_guard.status.clone();

    let result = update_fn(&mut state_guard);

    if !Arc::ptr_eq(&previous_forest, &state_guard.forest) {
        proxy.send_event(TreeEvent::Snapshot(state_guard.forest.clone()));
    }
    if previous_status != state_guard.status {
        proxy.send_event(TreeEvent::Status(state_guard.status.clone()));
    }

    result
}
