//! Bearer-session extractor for authenticated routes.

use std::sync::Arc;

use axum::{async_trait, extract::FromRequestParts, http::header, http::request::Parts};
use thinker_core::LocalAccountId;
use tracing::warn;

use crate::error::ApiError;
use crate::server::GatewayState;

/// The account behind a valid `Authorization: Bearer <session>` header.
pub struct RequireSession(pub LocalAccountId);

#[async_trait]
impl FromRequestParts<Arc<GatewayState>> for RequireSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<GatewayState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|val| val.to_str().ok())
            .and_then(|val| val.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty());

        let Some(token) = token else {
            warn!("Missing or invalid Authorization header");
            return Err(ApiError::unauthorized("User not authenticated"));
        };

        match state.auth.authenticate(token).await {
            Ok(Some(account)) => Ok(RequireSession(account)),
            Ok(None) => {
                warn!("Unknown or expired session token");
                Err(ApiError::unauthorized("User not authenticated"))
            }
            Err(e) => Err(ApiError::classified(&e)),
        }
    }
}
