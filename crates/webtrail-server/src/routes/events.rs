//! Interaction event intake routes.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::debug;

use crate::state::AppState;
use webtrail_core::{Event, InteractionEvent};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/events", post(ingest_events))
}

/// The extension may deliver a single record or a drained batch.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InteractionPayload {
    Batch(Vec<InteractionEvent>),
    One(Box<InteractionEvent>),
}

async fn ingest_events(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<InteractionPayload>,
) -> Json<serde_json::Value> {
    let events = match payload {
        InteractionPayload::Batch(events) => events,
        InteractionPayload::One(event) => vec![*event],
    };

    let Some(tx) = state.intake_sender() else {
        return Json(serde_json::json!({
            "success": false,
            "error": "session is stopping"
        }));
    };

    let mut queued = 0;
    for event in events {
        if tx.send(Event::Interaction(event)).is_ok() {
            queued += 1;
        }
    }

    debug!("queued {} interaction event(s)", queued);
    Json(serde_json::json!({ "success": true, "queued": queued }))
}
