//! CLI Status Command
//!
//! Asks a running gateway for its health and reports local store counts.

use anyhow::Result;
use thinker_config::ThinkerConfig;
use thinker_store::SqliteStore;

pub async fn run(config: &ThinkerConfig) -> Result<()> {
    println!("\n📊 thinker status\n");

    let url = health_url(config);
    println!("Gateway ({url}):");
    match reqwest::Client::new().get(&url).send().await {
        Ok(resp) => {
            let body: serde_json::Value = resp.json().await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        Err(_) => println!("  🔴 not running on port {}", config.server.port),
    }

    println!("\nStore ({}):", config.store.path);
    match SqliteStore::open(&config.store.path) {
        Ok(store) => println!("  🟢 {} account(s)", store.account_count().await?),
        Err(e) => println!("  🔴 {e:#}"),
    }
    println!();
    Ok(())
}

/// The gateway binds `0.0.0.0` by default; probe it on loopback.
fn health_url(config: &ThinkerConfig) -> String {
    let host = match config.server.host.as_str() {
        "0.0.0.0" | "::" | "" => "127.0.0.1",
        host => host,
    };
    format!("http://{}:{}/api/health", host, config.server.port)
}
