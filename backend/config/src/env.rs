//! Environment variable substitution for config values.
//!
//! String leaves may reference `${VAR_NAME}` (uppercase names only) or
//! `${VAR_NAME:-fallback}`. `$${VAR}` escapes to a literal `${VAR}`.
//! A reference without fallback to an unset or empty variable is an error,
//! so a forgotten secret fails at startup instead of at the first webhook.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;

/// `$` escape marker, variable name, optional `:-fallback`.
static REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$(\$)?\{([A-Z_][A-Z0-9_]*)(?::-([^}]*))?\}").expect("static regex")
});

/// Error returned for missing env vars.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Substitute references across a config tree using the process environment.
pub fn resolve_env_vars(value: &Value) -> Result<Value, MissingEnvVarError> {
    let env: HashMap<String, String> = std::env::vars().collect();
    resolve_env_vars_with(value, &env)
}

/// Substitute references using a provided map (useful for testing).
pub fn resolve_env_vars_with(
    value: &Value,
    env: &HashMap<String, String>,
) -> Result<Value, MissingEnvVarError> {
    walk(value, env, "")
}

fn walk(value: &Value, env: &HashMap<String, String>, path: &str) -> Result<Value, MissingEnvVarError> {
    match value {
        Value::String(s) => substitute(s, env, path).map(Value::String),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| walk(v, env, &format!("{path}[{i}]")))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Value::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (key, v) in map {
                let child = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                out.insert(key.clone(), walk(v, env, &child)?);
            }
            Ok(Value::Object(out))
        }
        other => Ok(other.clone()),
    }
}

fn substitute(s: &str, env: &HashMap<String, String>, path: &str) -> Result<String, MissingEnvVarError> {
    if !s.contains('$') {
        return Ok(s.to_string());
    }

    let mut missing: Option<MissingEnvVarError> = None;
    let replaced = REFERENCE.replace_all(s, |caps: &Captures| {
        let name = &caps[2];
        if caps.get(1).is_some() {
            // `$${NAME}` → literal `${NAME}` (fallback text preserved)
            return caps[0][1..].to_string();
        }
        match (env.get(name), caps.get(3)) {
            (Some(v), _) if !v.is_empty() => v.clone(),
            (_, Some(fallback)) => fallback.as_str().to_string(),
            _ => {
                missing.get_or_insert_with(|| MissingEnvVarError {
                    var_name: name.to_string(),
                    config_path: path.to_string(),
                });
                String::new()
            }
        }
    });

    match missing {
        Some(err) => Err(err),
        None => Ok(replaced.into_owned()),
    }
}

/// Collect all env var names referenced in a config tree (for `check-config`).
pub fn collect_referenced_vars(value: &Value) -> Vec<String> {
    fn collect(value: &Value, out: &mut Vec<String>) {
        match value {
            Value::String(s) => out.extend(
                REFERENCE
                    .captures_iter(s)
                    .filter(|c| c.get(1).is_none())
                    .map(|c| c[2].to_string()),
            ),
            Value::Array(items) => items.iter().for_each(|v| collect(v, out)),
            Value::Object(map) => map.values().for_each(|v| collect(v, out)),
            _ => {}
        }
    }

    let mut vars = Vec::new();
    collect(value, &mut vars);
    vars.sort();
    vars.dedup();
    vars
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn substitutes_nested_secret() {
        let v = json!({"line": {"channelSecret": "${LINE_CHANNEL_SECRET}"}});
        let out = resolve_env_vars_with(&v, &env(&[("LINE_CHANNEL_SECRET", "s3cr3t")])).unwrap();
        assert_eq!(out["line"]["channelSecret"], "s3cr3t");
    }

    #[test]
    fn missing_var_reports_path() {
        let v = json!({"line": {"channelId": "${LINE_CHANNEL_ID}"}});
        let err = resolve_env_vars_with(&v, &HashMap::new()).unwrap_err();
        assert_eq!(err.var_name, "LINE_CHANNEL_ID");
        assert_eq!(err.config_path, "line.channelId");
    }

    #[test]
    fn fallback_used_when_unset() {
        let v = json!({"notify": {"siteUrl": "${SITE_URL:-https://thinker.cafe}", "apiKey": "${NOTIFY_KEY:-}"}});
        let out = resolve_env_vars_with(&v, &HashMap::new()).unwrap();
        assert_eq!(out["notify"]["siteUrl"], "https://thinker.cafe");
        assert_eq!(out["notify"]["apiKey"], "");
    }

    #[test]
    fn escaped_reference_is_literal() {
        let v = json!({"k": "$${NOT_A_VAR}"});
        let out = resolve_env_vars_with(&v, &HashMap::new()).unwrap();
        assert_eq!(out["k"], "${NOT_A_VAR}");
    }

    #[test]
    fn non_string_leaves_pass_through() {
        let v = json!({"server": {"port": 8080}, "list": ["${A}", true]});
        let out = resolve_env_vars_with(&v, &env(&[("A", "x")])).unwrap();
        assert_eq!(out["server"]["port"], 8080);
        assert_eq!(out["list"][0], "x");
    }

    #[test]
    fn collects_referenced_vars_without_escapes() {
        let v = json!({"a": "${FOO}", "b": {"c": "${BAR:-x}"}, "d": "$${BAZ}"});
        assert_eq!(collect_referenced_vars(&v), vec!["BAR".to_string(), "FOO".to_string()]);
    }
}
