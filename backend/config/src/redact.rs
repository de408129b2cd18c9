//! Config redaction: safe-to-print config snapshots for `check-config` and
//! the startup log.

use serde_json::Value;

use crate::schema::ThinkerConfig;

/// Keys whose values are secrets (matched case-insensitively).
const SENSITIVE_KEYS: &[&str] = &[
    "channelSecret",
    "channelAccessToken",
    "apiKey",
    "accessToken",
    "password",
    "secret",
    "token",
];

fn is_sensitive_key(key: &str) -> bool {
    SENSITIVE_KEYS.iter().any(|k| k.eq_ignore_ascii_case(key))
}

/// Keep a four-character hint so operators can tell which secret is loaded.
fn mask(s: &str) -> String {
    let hint: String = s.chars().take(4).collect();
    if s.chars().count() > 8 {
        format!("{hint}***")
    } else {
        "***".to_string()
    }
}

/// Redact a config value tree, masking every sensitive string leaf.
pub fn redact(value: &Value) -> Value {
    redact_under(value, "")
}

/// Redact a typed config.
pub fn redact_config(config: &ThinkerConfig) -> Value {
    serde_json::to_value(config)
        .map(|v| redact(&v))
        .unwrap_or(Value::Null)
}

fn redact_under(value: &Value, key: &str) -> Value {
    match value {
        Value::String(s) if !s.is_empty() && is_sensitive_key(key) => Value::String(mask(s)),
        Value::Array(items) => Value::Array(items.iter().map(|v| redact_under(v, key)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), redact_under(v, k)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Dotted paths of every field [`redact`] would mask.
pub fn collect_redacted_paths(value: &Value) -> Vec<String> {
    fn collect(value: &Value, path: &str, key: &str, out: &mut Vec<String>) {
        match value {
            Value::String(s) if !s.is_empty() && is_sensitive_key(key) => out.push(path.to_string()),
            Value::Object(map) => {
                for (k, v) in map {
                    let child = if path.is_empty() {
                        k.clone()
                    } else {
                        format!("{path}.{k}")
                    };
                    collect(v, &child, k, out);
                }
            }
            _ => {}
        }
    }

    let mut paths = Vec::new();
    collect(value, "", "", &mut paths);
    paths.sort();
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn masks_line_credentials() {
        let mut cfg = ThinkerConfig::default();
        cfg.line.channel_secret = "0123456789abcdef".into();
        cfg.line.channel_access_token = "short".into();
        let v = redact_config(&cfg);
        assert_eq!(v["line"]["channelSecret"], "0123***");
        assert_eq!(v["line"]["channelAccessToken"], "***");
    }

    #[test]
    fn leaves_plain_fields_alone() {
        let v = redact(&json!({ "logging": { "level": "debug" }, "line": { "channelId": "1657" } }));
        assert_eq!(v["logging"]["level"], "debug");
        assert_eq!(v["line"]["channelId"], "1657");
    }

    #[test]
    fn lists_redacted_paths() {
        let v = json!({ "line": { "channelSecret": "x", "channelId": "1" }, "notify": { "apiKey": "k" } });
        assert_eq!(
            collect_redacted_paths(&v),
            vec!["line.channelSecret".to_string(), "notify.apiKey".to_string()]
        );
    }
}
