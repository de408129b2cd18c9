//! Config defaults and post-load normalization.

use crate::schema::ThinkerConfig;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

pub const DEFAULT_LINE_API_BASE: &str = "https://api.line.me";
pub const DEFAULT_SYNTHETIC_EMAIL_DOMAIN: &str = "line.thinker.cafe";
pub const DEFAULT_WELCOME_MESSAGE: &str = "歡迎加入思考者咖啡！\n\n您現在可以收到課程報名與繳費的即時通知了 🎉\n\n如有任何問題，歡迎隨時詢問我們！";

pub const DEFAULT_STORE_PATH: &str = "thinker.db";

/// Sessions live for one week.
pub const DEFAULT_SESSION_TTL_SECS: i64 = 7 * 24 * 60 * 60;

pub const DEFAULT_SITE_URL: &str = "https://thinker.cafe";
pub const DEFAULT_BRAND_NAME: &str = "思考者咖啡";
pub const DEFAULT_PAYMENT_WINDOW_HOURS: i64 = 24;

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Apply all normalizations to a freshly loaded config.
pub fn apply_all_defaults(config: ThinkerConfig) -> ThinkerConfig {
    let config = apply_url_defaults(config);
    let config = apply_line_defaults(config);
    apply_logging_defaults(config)
}

/// Strip trailing slashes so paths can be appended with `format!`.
fn apply_url_defaults(mut config: ThinkerConfig) -> ThinkerConfig {
    if config.line.api_base.trim().is_empty() {
        config.line.api_base = DEFAULT_LINE_API_BASE.to_string();
    }
    config.line.api_base = config.line.api_base.trim_end_matches('/').to_string();

    if config.notify.site_url.trim().is_empty() {
        config.notify.site_url = DEFAULT_SITE_URL.to_string();
    }
    config.notify.site_url = config.notify.site_url.trim_end_matches('/').to_string();
    config
}

/// Empty strings from env substitution mean "unset".
fn apply_line_defaults(mut config: ThinkerConfig) -> ThinkerConfig {
    if config.line.synthetic_email_domain.trim().is_empty() {
        config.line.synthetic_email_domain = DEFAULT_SYNTHETIC_EMAIL_DOMAIN.to_string();
    }
    if config
        .line
        .welcome_message
        .as_deref()
        .is_some_and(|m| m.trim().is_empty())
    {
        config.line.welcome_message = None;
    }
    if config.notify.api_key.as_deref().is_some_and(str::is_empty) {
        config.notify.api_key = None;
    }
    config
}

fn apply_logging_defaults(mut config: ThinkerConfig) -> ThinkerConfig {
    if config.logging.level.trim().is_empty() {
        config.logging.level = DEFAULT_LOG_LEVEL.to_string();
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_trailing_slashes() {
        let mut cfg = ThinkerConfig::default();
        cfg.line.api_base = "https://api.line.me/".into();
        cfg.notify.site_url = "https://thinker.cafe//".into();
        let cfg = apply_all_defaults(cfg);
        assert_eq!(cfg.line.api_base, "https://api.line.me");
        assert_eq!(cfg.notify.site_url, "https://thinker.cafe");
    }

    #[test]
    fn blank_optional_values_become_none() {
        let mut cfg = ThinkerConfig::default();
        cfg.line.welcome_message = Some("  ".into());
        cfg.notify.api_key = Some(String::new());
        cfg.logging.level = String::new();
        let cfg = apply_all_defaults(cfg);
        assert!(cfg.line.welcome_message.is_none());
        assert!(cfg.notify.api_key.is_none());
        assert_eq!(cfg.logging.level, DEFAULT_LOG_LEVEL);
    }
}
