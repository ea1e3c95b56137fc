mod api;
mod config;
mod database;

use crate::api::ApiBuilder;
use crate::config::ServerConfig;
use crate::database::Database;
use clap::Parser;
use std::error::Error;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// cmdvault - store, search and export shell command snippets
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Print an example configuration file and exit
    #[arg(short = 'e', long = "print-example-config")]
    print_example_config: bool,

    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the SQLite database path from the configuration
    #[arg(short, long)]
    database: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    if args.print_example_config {
        ServerConfig::print_example_toml();
        return Ok(());
    }

    // Load configuration from file if specified, otherwise use default
    let mut config = match args.config {
        Some(config_path) => match ServerConfig::from_toml_file(&config_path) {
            Ok(config) => {
                info!("Loaded configuration from {}", config_path.display());
                config
            }
            Err(e) => {
                error!(
                    "Failed to load configuration from {}: {}",
                    config_path.display(),
                    e
                );
                info!("Falling back to default configuration");
                ServerConfig::default()
            }
        },
        None => ServerConfig::default(),
    };

    if let Some(path) = args.database {
        config = config.to_builder().database_path(path).build()?;
    }

    info!("cmdvault starting");

    let database = Database::new(&config.database)?;
    database.initialize_schema()?;
    info!("Using database at {}", config.database.path.display());

    let app = ApiBuilder::new(&database).build();

    let listener = TcpListener::bind(config.addr).await?;
    info!("HTTP server running on {}", config.addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("cmdvault stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
