//! Wires the store, LINE client and services into the gateway.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use thinker_config::ThinkerConfig;
use thinker_core::{AuthProvider, OrderDirectory, PushClient, TokenVerifier, UserStore};
use thinker_gateway::GatewayState;
use thinker_identity::{
    AccessTokenChecker, AccountProvisioner, LoginService, MigrationService, SessionIssuer,
};
use thinker_line::{Dispatcher, FriendshipHandler, LineClient};
use thinker_notify::{NotificationSender, NotificationService, TemplateContext};
use thinker_store::SqliteStore;
use tower_http::cors::CorsLayer;
use tracing::info;

pub fn build_state(
    config: &ThinkerConfig,
    store: Arc<SqliteStore>,
    line: Arc<LineClient>,
) -> Arc<GatewayState> {
    let users: Arc<dyn UserStore> = store.clone();
    let auth: Arc<dyn AuthProvider> = store.clone();
    let orders: Arc<dyn OrderDirectory> = store;
    let push: Arc<dyn PushClient> = line.clone();
    let verifier: Arc<dyn TokenVerifier> = line;

    let handler = FriendshipHandler::new(
        users.clone(),
        push.clone(),
        config.line.welcome_message.clone(),
    );
    let tokens = AccessTokenChecker::new(verifier, config.line.channel_id.clone());
    let provisioner = AccountProvisioner::new(
        users.clone(),
        auth.clone(),
        config.line.synthetic_email_domain.clone(),
    );
    let login = LoginService::new(
        users.clone(),
        tokens.clone(),
        provisioner.clone(),
        SessionIssuer::new(auth.clone()),
    );
    let migration = MigrationService::new(tokens.clone(), provisioner);
    let sender = NotificationSender::new(
        push,
        TemplateContext {
            brand_name: config.notify.brand_name.clone(),
            payment_window_hours: config.notify.payment_window_hours,
        },
    );
    let notifications = NotificationService::new(
        orders,
        users,
        sender,
        config.notify.site_url.clone(),
        config.notify.payment_window_hours,
    );

    Arc::new(GatewayState {
        channel_secret: config.line.channel_secret.clone(),
        dispatcher: Dispatcher::new(Arc::new(handler)),
        auth,
        tokens,
        login,
        migration,
        notifications,
        notify_api_key: config.notify.api_key.clone(),
        started_at: Instant::now(),
    })
}

pub async fn run(config: ThinkerConfig, port: Option<u16>) -> Result<()> {
    let mut server = config.server.clone();
    if let Some(port) = port {
        server.port = port;
    }
    let addr: SocketAddr = server
        .bind_address()
        .parse()
        .with_context(|| format!("Invalid bind address {}", server.bind_address()))?;

    info!(
        addr = %addr,
        store = %config.store.path,
        api_base = %config.line.api_base,
        "Starting thinker"
    );

    let store = Arc::new(
        SqliteStore::open(&config.store.path)?.with_session_ttl(config.auth.session_ttl_secs),
    );
    let line = Arc::new(LineClient::new(
        config.line.api_base.clone(),
        config.line.channel_access_token.clone(),
    ));

    let state = build_state(&config, store, line);
    let app = thinker_gateway::build_router(state).layer(CorsLayer::permissive());
    thinker_gateway::start_server(addr, app).await
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::*;

    fn config() -> ThinkerConfig {
        let mut config = ThinkerConfig::default();
        config.line.channel_id = "1650000000".into();
        config.line.channel_secret = "secret".into();
        config.line.channel_access_token = "token".into();
        config.notify.api_key = Some("internal".into());
        config
    }

    fn state(config: &ThinkerConfig) -> Arc<GatewayState> {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let line = Arc::new(LineClient::new("http://127.0.0.1:9", "token"));
        build_state(config, store, line)
    }

    #[tokio::test]
    async fn state_carries_config_secrets() {
        let state = state(&config());
        assert_eq!(state.channel_secret, "secret");
        assert_eq!(state.notify_api_key.as_deref(), Some("internal"));
    }

    #[tokio::test]
    async fn wired_router_serves_health() {
        let app = thinker_gateway::build_router(state(&config()));
        let response = app
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn wired_router_rejects_unsigned_webhooks() {
        let app = thinker_gateway::build_router(state(&config()));
        let response = app
            .oneshot(
                Request::post("/api/line/webhook")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"destination":"U0","events":[]}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
