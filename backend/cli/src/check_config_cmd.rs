//! CLI Check-Config Command
//!
//! Prints the effective config with secrets masked, then every validation
//! finding.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{bail, Result};
use thinker_config::{ThinkerConfig, ValidationReport};

pub async fn run(path: &Path) -> Result<()> {
    println!("\n🔍 Checking {}\n", path.display());

    let raw = thinker_config::load_raw(path).await?;
    let env: HashMap<String, String> = std::env::vars().collect();
    let (config, report) = thinker_config::prepare(&raw, &env)?;

    println!("{}", render(&config)?);
    print_report(&report);

    if !report.is_valid() {
        bail!("{} config error(s)", report.errors.len());
    }
    Ok(())
}

/// Effective config as YAML, secrets masked.
pub fn render(config: &ThinkerConfig) -> Result<String> {
    Ok(serde_yaml::to_string(&thinker_config::redact_config(config))?)
}

fn print_report(report: &ValidationReport) {
    for error in &report.errors {
        println!("  🔴 {}: {}", error.path, error.message);
    }
    for warning in &report.warnings {
        println!("  🟡 {}: {}", warning.path, warning.message);
    }
    println!();
    if report.is_valid() {
        println!("✅ Config is valid.");
    } else {
        println!("❌ Config has errors. Fix the entries above.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rendered_config_hides_secrets() {
        let mut config = ThinkerConfig::default();
        config.line.channel_secret = "very-secret-value".into();
        config.line.channel_access_token = "long-lived-token".into();

        let yaml = render(&config).unwrap();
        assert!(!yaml.contains("very-secret-value"));
        assert!(!yaml.contains("long-lived-token"));
        assert!(yaml.contains("apiBase"));
    }
}
