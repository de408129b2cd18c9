//! Router, shared state and the serve loop.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use thinker_core::AuthProvider;
use thinker_identity::{AccessTokenChecker, LoginService, MigrationService};
use thinker_line::Dispatcher;
use thinker_notify::NotificationService;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument};

use crate::{health, line_auth, notify, webhook};

/// Everything the handlers need, built once at startup.
pub struct GatewayState {
    pub channel_secret: String,
    pub dispatcher: Dispatcher,
    pub auth: Arc<dyn AuthProvider>,
    pub tokens: AccessTokenChecker,
    pub login: LoginService,
    pub migration: MigrationService,
    pub notifications: NotificationService,
    /// Required in `x-api-key` on the notify route when set.
    pub notify_api_key: Option<String>,
    pub started_at: Instant,
}

pub fn build_router(state: Arc<GatewayState>) -> Router {
    Router::new()
        .route(
            "/api/line/webhook",
            post(webhook::receive).get(webhook::readiness),
        )
        .route("/api/line/login", post(line_auth::login))
        .route("/api/line/migrate", post(line_auth::migrate))
        .route("/api/line/verify-token", post(line_auth::verify_token))
        .route("/api/line/notify", post(notify::send))
        .route("/api/health", get(health::get_health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve `app` until Ctrl-C.
#[instrument(skip(app))]
pub async fn start_server(addr: SocketAddr, app: Router) -> Result<()> {
    let listener = TcpListener::bind(&addr).await?;
    info!("thinker gateway listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;
    Ok(())
}
