//! Venue check-in lifecycle daemon.
//!
//! Thin wiring around the engine library:
//! - layered configuration (defaults, config file, environment)
//! - durable slot store and HTTP registration client
//! - startup recovery and retention sweep
//! - background auto-checkout and retention loops

use anyhow::{Context, Result};
use tokio::signal;
use tracing::info;

use checkin_engine::{Config, Engine};
use checkin_telemetry::init_tracing_from_env;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    init_tracing_from_env();

    info!("Starting check-in engine v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = load_config()?;
    info!(
        store_path = %config.store_path,
        registration_url = %config.registration.base_url,
        retention_days = config.retention_days,
        "Loaded configuration"
    );

    // Open the engine (recovers any interrupted checkout)
    let engine = Engine::open(config)
        .await
        .context("Failed to open check-in engine")?;

    // Enforce retention once at startup; the scheduler takes over from here
    let purged = engine
        .sweep_now()
        .await
        .context("Startup retention sweep failed")?;
    if purged > 0 {
        info!(purged, "Startup retention sweep purged entries");
    }

    let handles = engine.start_scheduler();

    shutdown_signal().await;

    info!("Shutting down...");
    for handle in handles {
        handle.abort();
    }

    info!("Shutdown complete");
    Ok(())
}

/// Load configuration from files and environment.
fn load_config() -> Result<Config> {
    let config = config::Config::builder()
        // Start with defaults
        .add_source(config::Config::try_from(&Config::default())?)
        // Load from config file if exists
        .add_source(
            config::File::with_name("config/default")
                .required(false)
                .format(config::FileFormat::Toml),
        )
        // Override with environment variables
        .add_source(
            config::Environment::default()
                .separator("__")
                .prefix("CHECKIN")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    let mut config: Config = config
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    // Manual overrides for the nested registration config from environment
    // The config crate's nested parsing doesn't work reliably with underscored field names
    if let Ok(url) = std::env::var("CHECKIN_REGISTRATION_URL") {
        config.registration.base_url = url;
    }
    if let Ok(timeout) = std::env::var("CHECKIN_REGISTRATION_TIMEOUT_SECS") {
        if let Ok(secs) = timeout.parse() {
            config.registration.timeout_secs = secs;
        }
    }

    // Store path override
    if let Ok(path) = std::env::var("CHECKIN_STORE_PATH") {
        config.store_path = path;
    }

    Ok(config)
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received terminate signal");
        }
    }
}
