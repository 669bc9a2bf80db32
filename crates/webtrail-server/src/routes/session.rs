//! Session lifecycle routes.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::info;

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/session", get(get_session))
        .route("/session/navigate", post(navigate))
        .route("/session/stop", post(stop_session))
}

#[derive(Debug, Deserialize)]
struct NavigateBody {
    url: String,
}

async fn get_session(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "session": state.store.meta(),
        "eventCount": state.store.event_count(),
    }))
}

/// First real navigation: binds the domain and attaches the capture
/// pipeline. Later navigations are acknowledged but do not rebind.
async fn navigate(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NavigateBody>,
) -> Json<serde_json::Value> {
    match state.bind_start(&body.url) {
        Some(domain) => {
            info!("recording for domain: {}", domain);
            Json(serde_json::json!({ "success": true, "domain": domain }))
        }
        None => Json(serde_json::json!({
            "success": true,
            "domain": state.store.domain(),
            "message": "domain already bound"
        })),
    }
}

async fn stop_session(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    info!("stop requested; finalizing session");
    state.shutdown.notify_one();
    Json(serde_json::json!({ "success": true, "message": "recording stopping" }))
}
