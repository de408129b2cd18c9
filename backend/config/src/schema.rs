//! thinker runtime configuration schema.
//!
//! Typed for serde YAML/JSON deserialization. Every section defaults, so a
//! partial file (or none at all) still deserializes; required secrets are
//! enforced by [`crate::validation`].

use serde::{Deserialize, Serialize};

use crate::defaults;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Root configuration for the thinker service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThinkerConfig {
    /// HTTP listener
    pub server: ServerConfig,

    /// LINE channel credentials and login settings
    pub line: LineConfig,

    /// SQLite user/order store
    pub store: StoreConfig,

    /// Session issuance
    pub auth: AuthConfig,

    /// Order notifications
    pub notify: NotifyConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: defaults::DEFAULT_HOST.to_string(),
            port: defaults::DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// ---------------------------------------------------------------------------
// LINE
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LineConfig {
    /// LINE Login channel id; access tokens must carry it as `client_id`.
    pub channel_id: String,
    /// Messaging API channel secret (webhook HMAC key).
    pub channel_secret: String,
    /// Messaging API long-lived channel access token (push/reply).
    pub channel_access_token: String,
    /// Base URL of the LINE API.
    pub api_base: String,
    /// Domain used for synthetic account emails: `<userId>@<domain>`.
    pub synthetic_email_domain: String,
    /// Reply sent to new friends; `None` disables the welcome message.
    pub welcome_message: Option<String>,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            channel_id: String::new(),
            channel_secret: String::new(),
            channel_access_token: String::new(),
            api_base: defaults::DEFAULT_LINE_API_BASE.to_string(),
            synthetic_email_domain: defaults::DEFAULT_SYNTHETIC_EMAIL_DOMAIN.to_string(),
            welcome_message: Some(defaults::DEFAULT_WELCOME_MESSAGE.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreConfig {
    /// SQLite database path; `:memory:` opens a throwaway database.
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: defaults::DEFAULT_STORE_PATH.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthConfig {
    /// Lifetime of issued sessions, in seconds.
    pub session_ttl_secs: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_secs: defaults::DEFAULT_SESSION_TTL_SECS,
        }
    }
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotifyConfig {
    /// Public site URL; payment links are `<siteUrl>/order/<orderId>`.
    pub site_url: String,
    /// Shared key internal callers send as `x-api-key`. Unset = open endpoint.
    pub api_key: Option<String>,
    /// Brand shown in message alt text, e.g. `【思考者咖啡】`.
    pub brand_name: String,
    /// Hours after order creation before payment is due.
    pub payment_window_hours: i64,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            site_url: defaults::DEFAULT_SITE_URL.to_string(),
            api_key: None,
            brand_name: defaults::DEFAULT_BRAND_NAME.to_string(),
            payment_window_hours: defaults::DEFAULT_PAYMENT_WINDOW_HOURS,
        }
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    pub level: String,
    /// Directory for daily-rolling NDJSON logs; unset = console only.
    pub dir: Option<String>,
    /// Emit JSON on the console too.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::DEFAULT_LOG_LEVEL.to_string(),
            dir: None,
            json: false,
        }
    }
}
