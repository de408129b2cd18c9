mod check_config_cmd;
mod config;
mod orders_cmd;
mod serve;
mod status_cmd;

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use logging::LogOptions;
use thinker_config::ThinkerConfig;

#[derive(Parser)]
#[command(name = "thinker")]
#[command(about = "LINE login, webhook and order notification service")]
#[command(version)]
struct Cli {
    /// Config file (default: ~/.thinker/config.yaml or $THINKER_CONFIG_DIR/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Print the effective config (secrets masked) and validate it
    CheckConfig,
    /// Show gateway health and store counts
    Status,
    /// Write a default config file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Upsert orders from a JSON array into the local store
    ImportOrders {
        /// Path to the JSON file
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let path = config::resolve_path(cli.config);

    match cli.command {
        Commands::Serve { port } => {
            let config = config::load_and_init_logging(&path).await?;
            serve::run(config, port).await?;
        }
        Commands::CheckConfig => {
            check_config_cmd::run(&path).await?;
        }
        Commands::Status => {
            logging::init_logger(&LogOptions::default());
            let config = thinker_config::load_and_prepare(&path).await?;
            status_cmd::run(&config).await?;
        }
        Commands::InitConfig { force } => {
            if path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }
            thinker_config::write_config(&ThinkerConfig::default(), &path).await?;
            println!("✅ Wrote default config to {}", path.display());
        }
        Commands::ImportOrders { file } => {
            logging::init_logger(&LogOptions::default());
            let config = thinker_config::load_and_prepare(&path).await?;
            orders_cmd::run(&config.store.path, &file).await?;
        }
    }

    Ok(())
}
