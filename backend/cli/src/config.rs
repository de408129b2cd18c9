use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use logging::LogOptions;
use thinker_config::{LoggingConfig, ThinkerConfig};
use tracing::{error, warn};

/// `--config` wins, otherwise `<config dir>/config.yaml`.
pub fn resolve_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit.unwrap_or_else(|| thinker_config::config_file_path(&thinker_config::config_dir()))
}

pub fn log_options(logging: &LoggingConfig) -> LogOptions {
    LogOptions {
        level: logging.level.clone(),
        dir: logging.dir.as_ref().map(PathBuf::from),
        json_console: logging.json,
    }
}

/// Load the config, then bring the logger up from its `logging` section
/// before reporting on it. Any validation error aborts.
pub async fn load_and_init_logging(path: &Path) -> Result<ThinkerConfig> {
    let raw = thinker_config::load_raw(path).await?;
    let env: HashMap<String, String> = std::env::vars().collect();
    let (config, report) = thinker_config::prepare(&raw, &env)?;

    logging::init_logger(&log_options(&config.logging));

    for warning in &report.warnings {
        warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for err in &report.errors {
        error!(path = %err.path, message = %err.message, "Config error");
    }
    if !report.is_valid() {
        bail!("config at {} has {} error(s)", path.display(), report.errors.len());
    }
    Ok(config)
}
