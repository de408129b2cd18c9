//! Log Redaction Layer
//!
//! Scrubs bearer tokens, LINE access tokens and email addresses from
//! strings prior to logging.

use once_cell::sync::Lazy;
use regex::Regex;

static BEARER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Bearer\s+[A-Za-z0-9\-._~+/]+=*").expect("static regex"));

/// `access_token=...` query parameters and `"accessToken": "..."` JSON fields.
static ACCESS_TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(access_token=|"access_?[tT]oken"\s*:\s*")[A-Za-z0-9\-._~+/=]+"#)
        .expect("static regex")
});

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}").expect("static regex"));

/// Redacts sensitive patterns in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    let redacted = BEARER_RE.replace_all(input, "Bearer [REDACTED_TOKEN]");
    let redacted = ACCESS_TOKEN_RE.replace_all(&redacted, "${1}[REDACTED_TOKEN]");
    EMAIL_RE.replace_all(&redacted, "[REDACTED_EMAIL]").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_bearer_and_query_tokens() {
        let raw = "GET /oauth2/v2.1/verify?access_token=eyJhbGciOiJIUzI1NiJ9.abc with Bearer eyJzdWIiOiIxIn0";
        let clean = redact_sensitive_data(raw);
        assert!(!clean.contains("eyJhbGciOiJIUzI1NiJ9"));
        assert!(!clean.contains("eyJzdWIiOiIxIn0"));
        assert!(clean.contains("access_token=[REDACTED_TOKEN]"));
    }

    #[test]
    fn redacts_json_access_token_and_email() {
        let raw = r#"{"accessToken": "abc.def", "email": "Uabc@line.thinker.cafe"}"#;
        let clean = redact_sensitive_data(raw);
        assert!(!clean.contains("abc.def"));
        assert!(!clean.contains("Uabc@line.thinker.cafe"));
    }

    #[test]
    fn leaves_plain_text() {
        assert_eq!(redact_sensitive_data("order 12 confirmed"), "order 12 confirmed");
    }
}
