//! lrs-reports - lecture report service
//!
//! Serves report submission, supervisory scopes, ratings and statistics over
//! HTTP. Configuration resolves from the command line, then environment
//! variables, then the TOML config file, then compiled defaults.

use anyhow::{Context, Result};
use clap::Parser;
use lrs_common::config::{resolve_config, CliOverrides, CONFIG_ENV_VAR, DATABASE_ENV_VAR, PORT_ENV_VAR};
use lrs_common::db::init_database;
use lrs_reports::{build_router, AppState};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "lrs-reports")]
#[command(about = "Lecture report service")]
#[command(version)]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long, env = CONFIG_ENV_VAR)]
    config: Option<PathBuf>,

    /// Path to the SQLite database file
    #[arg(short, long, env = DATABASE_ENV_VAR)]
    database: Option<PathBuf>,

    /// HTTP port
    #[arg(short, long, env = PORT_ENV_VAR)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let overrides = CliOverrides {
        config_file: args.config.clone(),
        database_path: args.database,
        port: args.port,
    };
    let config = resolve_config(&overrides).context("Failed to resolve configuration")?;

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .context("Invalid log level")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!(
        "Starting lrs-reports v{}",
        env!("CARGO_PKG_VERSION")
    );

    match (&config.config_file, &args.config) {
        (Some(path), _) => info!("Config file: {}", path.display()),
        (None, Some(requested)) => warn!(
            "Config file {} not found, using defaults",
            requested.display()
        ),
        (None, None) => info!("No config file found, using defaults"),
    }
    info!("Database path: {}", config.database_path.display());

    let pool = init_database(&config.database_path)
        .await
        .with_context(|| format!("Failed to open database {}", config.database_path.display()))?;

    let app = build_router(AppState::new(pool));

    let address = config.listen_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind to {}", address))?;
    info!("lrs-reports listening on http://{}", address);
    info!("Health check: http://{}/health", address);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
