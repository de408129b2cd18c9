//! `POST /api/line/webhook`
//!
//! Verifies the signature over the raw body, hands events to the dispatcher
//! and acknowledges at once. Anything after the signature check answers 200
//! so LINE does not redeliver.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde_json::{json, Value};
use thinker_core::WebhookEnvelope;
use thinker_line::{signature, SIGNATURE_HEADER};
use tracing::{debug, warn};

use crate::server::GatewayState;

pub async fn receive(
    State(state): State<Arc<GatewayState>>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    let provided = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if !signature::verify(&body, provided, &state.channel_secret) {
        warn!(has_signature = !provided.is_empty(), "Rejected LINE webhook: invalid signature");
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "success": false, "error": "Invalid signature" })),
        );
    }

    let envelope: WebhookEnvelope = match serde_json::from_slice(&body) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!(error = %e, "Signed LINE webhook body is not a valid envelope");
            return (StatusCode::OK, Json(json!({ "success": false })));
        }
    };

    let received = envelope.events.len();
    let dispatched = state.dispatcher.dispatch_envelope(envelope);
    debug!(received, dispatched, "LINE webhook accepted");
    (StatusCode::OK, Json(json!({ "success": true })))
}

/// `GET /api/line/webhook` readiness probe.
pub async fn readiness() -> Json<Value> {
    Json(json!({ "status": "ok", "message": "LINE Webhook endpoint is ready" }))
}
