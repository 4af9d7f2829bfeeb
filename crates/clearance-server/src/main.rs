//! Clearance server binary
//!
//! Starts the HTTP server and the daily discount sweep.

use anyhow::Context;
use clap::Parser;
use clearance_server::{config::ServerConfig, start_server};
use std::path::PathBuf;

/// Automated discount tier engine
#[derive(Debug, Parser)]
#[command(name = "clearance-server")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Load configuration from TOML file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Churn service token (overrides the config file)
    #[arg(long, env = "CHURN_TOKEN", hide_env_values = true)]
    churn_token: Option<String>,

    /// Catalog service token (overrides the config file)
    #[arg(long, env = "CATALOG_TOKEN", hide_env_values = true)]
    catalog_token: Option<String>,

    /// Override the bind port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ServerConfig::from_file(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => {
            eprintln!("Warning: No config file specified, using local development defaults");
            eprintln!("Usage: clearance-server --config <path-to-config.toml>");
            eprintln!();
            ServerConfig::default_dev_config()
        }
    };

    let mut config = config.with_tokens(cli.churn_token, cli.catalog_token);
    if let Some(port) = cli.port {
        config.bind_port = port;
    }

    start_server(config).await?;
    Ok(())
}
