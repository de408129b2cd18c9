//! Config validation: field-level checks with user-friendly error messages.

use crate::schema::ThinkerConfig;
use thiserror::Error;

/// One year.
pub const MAX_SESSION_TTL_SECS: i64 = 365 * 24 * 60 * 60;
/// One year.
pub const MAX_PAYMENT_WINDOW_HOURS: i64 = 365 * 24;

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &ThinkerConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_line(config, &mut report);
    validate_server(config, &mut report);
    validate_auth(config, &mut report);
    validate_notify(config, &mut report);
    report
}

/// The three LINE credentials are all required.
fn validate_line(config: &ThinkerConfig, report: &mut ValidationReport) {
    let line = &config.line;
    if line.channel_id.trim().is_empty() {
        report.error("line.channelId", "LINE Login channel id is required to verify access tokens");
    }
    if line.channel_secret.trim().is_empty() {
        report.error("line.channelSecret", "Channel secret is required to verify webhook signatures");
    }
    if line.channel_access_token.trim().is_empty() {
        report.error("line.channelAccessToken", "Channel access token is required to push messages");
    }
    if !line.api_base.starts_with("https://") && !line.api_base.starts_with("http://") {
        report.error("line.apiBase", format!("'{}' is not an http(s) URL", line.api_base));
    }
    if line.synthetic_email_domain.contains('@') {
        report.error("line.syntheticEmailDomain", "Use a bare domain without '@'");
    }
}

fn validate_server(config: &ThinkerConfig, report: &mut ValidationReport) {
    let port = config.server.port;
    if port == 0 {
        report.error("server.port", "Port must be > 0");
    } else if port < 1024 && port != 80 && port != 443 {
        report.warn(
            "server.port",
            format!("Port {port} requires elevated privileges; consider using a port >= 1024"),
        );
    }
}

fn validate_auth(config: &ThinkerConfig, report: &mut ValidationReport) {
    let ttl = config.auth.session_ttl_secs;
    if ttl <= 0 {
        report.error("auth.sessionTtlSecs", "Session lifetime must be positive");
    } else if ttl > MAX_SESSION_TTL_SECS {
        report.error(
            "auth.sessionTtlSecs",
            format!("Session lifetime must be at most {MAX_SESSION_TTL_SECS} seconds"),
        );
    }
}

fn validate_notify(config: &ThinkerConfig, report: &mut ValidationReport) {
    let notify = &config.notify;
    if notify.payment_window_hours <= 0 {
        report.error("notify.paymentWindowHours", "Payment window must be positive");
    } else if notify.payment_window_hours > MAX_PAYMENT_WINDOW_HOURS {
        report.error(
            "notify.paymentWindowHours",
            format!("Payment window must be at most {MAX_PAYMENT_WINDOW_HOURS} hours"),
        );
    }
    if notify.api_key.is_none() {
        report.warn(
            "notify.apiKey",
            "No API key configured; /api/line/notify accepts unauthenticated callers",
        );
    }
    if !notify.site_url.starts_with("https://") {
        report.warn("notify.siteUrl", "Payment links will not use https");
    }
}
