//! LINE platform client.
//!
//! Messaging API (push, reply) with the channel access token, and the Login
//! API endpoints used to check user access tokens.

use async_trait::async_trait;
use logging::redact_sensitive_data;
use reqwest::{Client, Response};
use serde::Serialize;
use thinker_core::{
    ExternalId, OutboundMessage, PlatformProfile, PushClient, PushError, TokenError, TokenInfo,
    TokenVerifier,
};
use tracing::{debug, warn};

pub const DEFAULT_API_BASE: &str = "https://api.line.me";

#[derive(Serialize)]
struct PushBody<'a> {
    to: &'a str,
    messages: &'a [OutboundMessage],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplyBody<'a> {
    reply_token: &'a str,
    messages: &'a [OutboundMessage],
}

#[derive(Clone)]
pub struct LineClient {
    http: Client,
    api_base: String,
    channel_access_token: String,
}

impl LineClient {
    pub fn new(api_base: impl Into<String>, channel_access_token: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            channel_access_token: channel_access_token.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }
}

/// Transport errors carry the request URL, and the verify URL carries the
/// user's access token.
fn transport_error(err: reqwest::Error) -> String {
    redact_sensitive_data(&err.to_string())
}

impl LineClient {
    async fn send_messages<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<(), PushError> {
        let resp = self
            .http
            .post(self.url(path))
            .bearer_auth(&self.channel_access_token)
            .json(body)
            .send()
            .await
            .map_err(|e| PushError::Unavailable(transport_error(e)))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let body = resp.text().await.unwrap_or_default();
        warn!(path, status = status.as_u16(), "LINE rejected message");
        Err(PushError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

/// Turn a Login API response into a parsed body or `TokenError`.
async fn login_response<T: serde::de::DeserializeOwned>(resp: Response) -> Result<T, TokenError> {
    let status = resp.status();
    if status.is_server_error() {
        return Err(TokenError::Unavailable(format!("LINE login API returned {status}")));
    }
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(TokenError::Invalid(redact_sensitive_data(&format!("{status}: {body}"))));
    }
    resp.json::<T>()
        .await
        .map_err(|e| TokenError::Invalid(format!("unexpected response: {e}")))
}

#[async_trait]
impl PushClient for LineClient {
    async fn push(&self, to: &ExternalId, messages: &[OutboundMessage]) -> Result<(), PushError> {
        debug!(to = %to, count = messages.len(), "Pushing LINE message");
        self.send_messages(
            "/v2/bot/message/push",
            &PushBody {
                to: to.as_str(),
                messages,
            },
        )
        .await
    }

    async fn reply(&self, reply_token: &str, messages: &[OutboundMessage]) -> Result<(), PushError> {
        self.send_messages(
            "/v2/bot/message/reply",
            &ReplyBody {
                reply_token,
                messages,
            },
        )
        .await
    }
}

#[async_trait]
impl TokenVerifier for LineClient {
    async fn verify(&self, access_token: &str) -> Result<TokenInfo, TokenError> {
        let resp = self
            .http
            .get(self.url("/oauth2/v2.1/verify"))
            .query(&[("access_token", access_token)])
            .send()
            .await
            .map_err(|e| TokenError::Unavailable(transport_error(e)))?;
        login_response(resp).await
    }

    async fn profile(&self, access_token: &str) -> Result<PlatformProfile, TokenError> {
        let resp = self
            .http
            .get(self.url("/v2/profile"))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| TokenError::Unavailable(transport_error(e)))?;
        login_response(resp).await
    }
}
