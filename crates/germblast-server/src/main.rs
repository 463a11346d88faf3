//! Session server binary for Germblast.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `germblast-config.yaml` (defaults if absent)
//! 2. Initialize structured logging (tracing)
//! 3. Create the game store and session registry
//! 4. Serve `/ws` and `/health` until `Ctrl-C`

use std::path::Path;
use std::sync::Arc;

use germblast_core::{AppConfig, SessionRegistry, SessionSettings};
use germblast_server::{AppError, AppState, start_server};
use germblast_store::MemoryStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Path of the configuration file, relative to the working directory.
const CONFIG_PATH: &str = "germblast-config.yaml";

/// Application entry point for the session server.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the server
/// cannot bind its listener.
#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Load configuration. Logging is not up yet, so whether the file
    //    was found is logged after init.
    let config_path = Path::new(CONFIG_PATH);
    let config_found = config_path.exists();
    let config = AppConfig::load_or_default(config_path)?;

    // 2. Initialize structured logging. RUST_LOG wins over the config.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!("germblast-server starting");
    info!(
        config_found,
        host = %config.server.host,
        port = config.server.port,
        duration_secs = config.game.duration_secs,
        sticky_session = config.sticky_session.enabled,
        "Configuration loaded"
    );

    // 3. Create the store and registry.
    let settings = SessionSettings::from_config(&config);
    if let Some(domain) = &settings.sticky_domain {
        info!(%domain, "Sticky session domain resolved");
    }
    let registry = SessionRegistry::new(Arc::new(MemoryStore::new()), settings);
    let state = Arc::new(AppState::new(registry));

    // 4. Serve until shutdown.
    start_server(&config.server, state).await?;

    info!("germblast-server exiting");
    Ok(())
}
