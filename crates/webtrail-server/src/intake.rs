//! Interaction intake — drains the event channel into the session store.
//!
//! The companion extension POSTs interaction events; handlers push them
//! into an unbounded channel and this single task funnels them into the
//! store. The channel replaces the page-global polled array the capture
//! extension would otherwise need, decoupling delivery cadence from
//! correctness.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::state::AppState;

/// Spawn the drain task. Exits once the intake channel is closed and empty,
/// which is the drain barrier the shutdown sequence awaits before finalize.
pub fn start_intake_worker(state: Arc<AppState>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let Some(mut rx) = state.take_intake_rx() else {
            warn!("interaction intake worker already started");
            return;
        };

        while let Some(event) = rx.recv().await {
            state.store.add(event);
        }

        debug!("interaction intake drained");
    })
}
