//! Deferred deletion of rooms abandoned by a dropped connection.

use tokio::{task::AbortHandle, time::sleep};
use tracing::{debug, info};

use crate::state::{SharedState, session::Slot};

/// Schedule deletion of the room once the configured grace period elapses,
/// unless the slot's connection is re-established first.
///
/// The returned handle belongs in the session (`Session::set_cleanup`) so
/// that reattaching the slot or deleting the room aborts the timer; the task
/// also re-checks under the session lock before deleting, so an aborted or
/// stale timer can never take down a healthy room.
pub fn schedule_room_cleanup(state: &SharedState, code: String, slot: Slot) -> AbortHandle {
    let state = state.clone();
    let grace = state.config().disconnect_grace();

    let task = tokio::spawn(async move {
        sleep(grace).await;

        let Some(session) = state.rooms().get(&code) else {
            return;
        };

        {
            let mut session = session.lock().await;
            if session.connection(slot).is_some() {
                debug!(code = %code, slot = ?slot, "slot reconnected; skipping cleanup");
                return;
            }
            session.cancel_all_cleanup();
        }

        state.rooms().remove(&code);
        info!(code = %code, slot = ?slot, "room deleted after disconnect grace period");
    });

    task.abort_handle()
}
