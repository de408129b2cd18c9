//! LINE login, account migration and access-token verification.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use thinker_core::{Classify, ErrorKind};
use thinker_identity::{LineAuthRequest, LoginResponse, MigrateResponse};

use crate::auth::RequireSession;
use crate::error::ApiError;
use crate::server::GatewayState;

/// `POST /api/line/login`
pub async fn login(
    State(state): State<Arc<GatewayState>>,
    payload: Result<Json<LineAuthRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(request) = payload?;
    Ok(Json(state.login.login(request).await?))
}

/// `POST /api/line/migrate`
pub async fn migrate(
    State(state): State<Arc<GatewayState>>,
    RequireSession(caller): RequireSession,
    payload: Result<Json<LineAuthRequest>, JsonRejection>,
) -> Result<Json<MigrateResponse>, ApiError> {
    let Json(request) = payload?;
    Ok(Json(state.migration.migrate(&caller, request).await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyTokenRequest {
    #[serde(default)]
    pub access_token: Option<String>,
}

/// `POST /api/line/verify-token`
pub async fn verify_token(
    State(state): State<Arc<GatewayState>>,
    payload: Result<Json<VerifyTokenRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(request) = payload?;
    let token = request.access_token.unwrap_or_default();
    if token.trim().is_empty() {
        return Err(ApiError::bad_request("accessToken is required"));
    }

    match state.tokens.check(&token, None).await {
        Ok(verified) => Ok((
            StatusCode::OK,
            Json(json!({
                "valid": true,
                "channelId": verified.info.client_id,
                "expiresIn": verified.info.expires_in,
            })),
        )),
        Err(e) if e.kind() == ErrorKind::Unauthorized => Ok((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "valid": false, "error": e.to_string() })),
        )),
        Err(e) => Err(e.into()),
    }
}
