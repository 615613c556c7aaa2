//! Rentcar CLI server
//!
//! ```sh
//! # Run with default config (~/.config/rentcar/config.toml)
//! rentcar-service
//!
//! # Custom config path and port
//! rentcar-service --config /etc/rentcar/config.toml --port 8080
//!
//! # Validate config without starting
//! rentcar-service --check
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use rentcar::config::AppConfig;
use rentcar::server::{init_tracing, ServerHandle, ServerOptions};

/// Rentcar: vehicle rental REST API.
#[derive(Parser, Debug)]
#[command(
    name = "rentcar-service",
    version,
    about = "Vehicle rental backend",
    long_about = "Rentcar REST API server for vehicle bookings, customers \
                  and fleet management.\n\n\
                  Default config: ~/.config/rentcar/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "RENTCAR_CONFIG")]
    config: Option<PathBuf>,

    /// Override the REST API listen port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration file and exit without starting the server.
    #[arg(long)]
    check: bool,

    /// Skip database migrations on startup.
    #[arg(long)]
    no_migrate: bool,

    /// Skip creating the default admin account.
    #[arg(long)]
    no_admin: bool,

    /// Do not start the periodic booking jobs.
    #[arg(long)]
    no_jobs: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(rentcar::default_config_path);

    let mut config = match AppConfig::load(&config_path) {
        Ok(mut cfg) => {
            if let Some(ref level) = cli.log_level {
                cfg.logging.level = level.clone();
            }
            init_tracing(&cfg);
            info!("Configuration loaded from {}", config_path.display());
            cfg
        }
        Err(e) => {
            tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::new(
                    cli.log_level.as_deref().unwrap_or("info"),
                ))
                .init();
            error!("Failed to load config from {}: {}", config_path.display(), e);
            error!("Using default configuration.");
            AppConfig::default()
        }
    };

    if let Some(port) = cli.port {
        info!("CLI override: port = {}", port);
        config.server.port = port;
    }
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }

    if cli.check {
        println!("Configuration is valid");
        println!("   Config file : {}", config_path.display());
        println!("   API address : {}", config.server.address());
        println!("   Database    : {}", config.database.url);
        println!("   Jobs        : {}", if config.jobs.enabled { "enabled" } else { "disabled" });
        println!("   Log level   : {}", config.logging.level);
        return Ok(());
    }

    let handle = ServerHandle::start(ServerOptions {
        config,
        auto_migrate: !cli.no_migrate,
        create_default_admin: !cli.no_admin,
        run_jobs: !cli.no_jobs,
        status_provider: None,
    })
    .await?;

    handle.install_signal_handler();
    info!("Press Ctrl+C to shut down gracefully.");

    handle.shutdown_signal().wait().await;
    handle.wait().await;

    Ok(())
}
