//! `thinker-config`: runtime configuration for the thinker service.
//!
//! Provides:
//! - Typed config schema (server, LINE channel, store, auth, notify, logging)
//! - YAML read/write
//! - `${ENV_VAR}` substitution
//! - Default value normalization
//! - Validation report
//! - Config redaction for safe logging/display

pub mod defaults;
pub mod env;
pub mod io;
pub mod redact;
pub mod schema;
pub mod validation;

pub use defaults::apply_all_defaults;
pub use env::{collect_referenced_vars, resolve_env_vars, resolve_env_vars_with, MissingEnvVarError};
pub use io::{config_dir, config_file_path, load_raw, write_config};
pub use redact::{collect_redacted_paths, redact, redact_config};
pub use schema::{
    AuthConfig, LineConfig, LoggingConfig, NotifyConfig, ServerConfig, StoreConfig, ThinkerConfig,
};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use std::collections::HashMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde_json::Value;

/// Turn an untyped config tree into a normalized config plus its report.
pub fn prepare(raw: &Value, env: &HashMap<String, String>) -> Result<(ThinkerConfig, ValidationReport)> {
    let value = resolve_env_vars_with(raw, env).context("Failed to resolve env vars in config")?;
    let config: ThinkerConfig =
        serde_json::from_value(value).context("Failed to deserialize config after processing")?;
    let config = apply_all_defaults(config);
    let report = validate(&config);
    Ok((config, report))
}

/// Load, substitute env vars, apply defaults and validate a config file.
///
/// This is the main entry point for loading a config at runtime. Warnings
/// are logged; any validation error aborts.
pub async fn load_and_prepare(path: &Path) -> Result<ThinkerConfig> {
    let raw = load_raw(path).await?;
    let env: HashMap<String, String> = std::env::vars().collect();
    let (config, report) = prepare(&raw, &env)?;

    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }
    if !report.is_valid() {
        bail!("config at {} has {} error(s)", path.display(), report.errors.len());
    }

    Ok(config)
}
