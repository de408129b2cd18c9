//! `POST /api/line/notify`: internal trigger for order notifications.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use subtle::ConstantTimeEq;
use thinker_core::LocalAccountId;
use thinker_notify::NotificationKind;
use tracing::warn;

use crate::error::ApiError;
use crate::server::GatewayState;

pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifyRequest {
    #[serde(default, rename = "type", alias = "kind")]
    pub kind: Option<String>,
    /// Number or numeric string.
    #[serde(default)]
    pub order_id: Option<Value>,
    #[serde(default)]
    pub user_id: Option<String>,
}

fn parse_order_id(raw: Option<&Value>) -> Result<i64, ApiError> {
    let parsed = match raw {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| ApiError::bad_request("orderId is required"))
}

/// Constant time in the key contents.
fn api_key_matches(provided: &str, expected: &str) -> bool {
    provided.as_bytes().ct_eq(expected.as_bytes()).into()
}

pub async fn send(
    State(state): State<Arc<GatewayState>>,
    headers: HeaderMap,
    payload: Result<Json<NotifyRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    if let Some(expected) = &state.notify_api_key {
        let provided = headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok());
        if !provided.is_some_and(|key| api_key_matches(key, expected)) {
            warn!("Notify request with missing or wrong API key");
            return Err(ApiError::unauthorized("Invalid API key"));
        }
    }

    let Json(request) = payload?;
    let kind: NotificationKind = request
        .kind
        .as_deref()
        .ok_or_else(|| ApiError::bad_request("Missing type parameter"))?
        .parse()?;
    let order_id = parse_order_id(request.order_id.as_ref())?;
    let user_id = request
        .user_id
        .filter(|u| !u.trim().is_empty())
        .map(LocalAccountId::new);

    let receipt = state
        .notifications
        .notify(kind, order_id, user_id.as_ref())
        .await?;

    let message = match kind {
        NotificationKind::PaymentReminder => "Payment reminder sent",
        NotificationKind::OrderConfirmation => "Order confirmation sent",
        NotificationKind::PaymentSuccess => "Payment success notification sent",
    };
    Ok(Json(json!({
        "success": true,
        "message": message,
        "lineUserId": receipt.line_user_id,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_id_accepts_number_or_string() {
        assert_eq!(parse_order_id(Some(&json!(42))).unwrap(), 42);
        assert_eq!(parse_order_id(Some(&json!(" 42 "))).unwrap(), 42);
        assert!(parse_order_id(Some(&json!("abc"))).is_err());
        assert!(parse_order_id(None).is_err());
    }

    #[test]
    fn api_key_must_match_exactly() {
        assert!(api_key_matches("internal-key", "internal-key"));
        assert!(!api_key_matches("internal-kez", "internal-key"));
        assert!(!api_key_matches("internal", "internal-key"));
        assert!(!api_key_matches("internal-key-extra", "internal-key"));
        assert!(!api_key_matches("", "internal-key"));
    }
}
