//! Traffic observation routes — the two capture callbacks.
//!
//! The observer reports each request exactly once: either as a completed
//! response (with status and bodies) or as a transport failure. Both feed
//! the capture pipeline, which owns domain filtering and body decoding.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;

use crate::state::AppState;
use webtrail_capture::{CompletedResponse, FailedRequest, InlineBody};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/traffic/response", post(response_completed))
        .route("/traffic/failed", post(request_failed))
}

#[derive(Debug, Deserialize)]
struct ResponsePayload {
    method: String,
    url: String,
    status: u16,
    #[serde(rename = "requestHeaders", default)]
    request_headers: HashMap<String, String>,
    /// Raw outgoing payload; absent when the request carried no body.
    #[serde(rename = "requestBody", default)]
    request_body: Option<String>,
    #[serde(rename = "responseHeaders", default)]
    response_headers: HashMap<String, String>,
    /// Raw body text; absent when the observer could not retrieve it.
    #[serde(rename = "responseBody", default)]
    response_body: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FailurePayload {
    method: String,
    url: String,
    #[serde(rename = "requestHeaders", default)]
    request_headers: HashMap<String, String>,
    #[serde(rename = "requestBody", default)]
    request_body: Option<String>,
    #[serde(default = "default_failure")]
    failure: String,
}

fn default_failure() -> String {
    "request failed".to_string()
}

async fn response_completed(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ResponsePayload>,
) -> Json<serde_json::Value> {
    let Some(pipeline) = state.pipeline() else {
        return Json(not_bound());
    };

    let mut body = InlineBody::new(payload.response_body);
    pipeline.on_response(
        CompletedResponse {
            method: payload.method,
            url: payload.url,
            status: payload.status,
            request_headers: payload.request_headers,
            post_data: payload.request_body,
            response_headers: payload.response_headers,
        },
        &mut body,
    );

    Json(serde_json::json!({ "success": true }))
}

async fn request_failed(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<FailurePayload>,
) -> Json<serde_json::Value> {
    let Some(pipeline) = state.pipeline() else {
        return Json(not_bound());
    };

    pipeline.on_request_failed(FailedRequest {
        method: payload.method,
        url: payload.url,
        request_headers: payload.request_headers,
        post_data: payload.request_body,
        failure: payload.failure,
    });

    Json(serde_json::json!({ "success": true }))
}

fn not_bound() -> serde_json::Value {
    serde_json::json!({
        "success": false,
        "error": "recording not yet bound to a domain"
    })
}
