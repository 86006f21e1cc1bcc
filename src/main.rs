//! # Saucedemo E2E runner
//!
//! Runs the login (`@reto1`) and checkout (`@reto2`) journeys against an
//! Appium server, or against the in-process simulator, and writes the
//! configured reports.
//!
//! ## Environment variables
//! - `SAUCEDEMO_CONFIG`: optional TOML configuration file
//! - `SAUCEDEMO_APPIUM_URL` / `SAUCEDEMO_APPIUM_PATH`: automation server (default: http://localhost:4723/wd/hub)
//! - `SAUCEDEMO_PLATFORM`: `Android` (default) or `iOS`
//! - `SAUCEDEMO_BACKEND`: `appium` (default) or `simulator`
//! - `SAUCEDEMO_TAGS`: tag expression (default: `@reto1 or @reto2`)
//! - `RUST_LOG`: log filter, falls back to `SAUCEDEMO_LOG_LEVEL`

use saucedemo_e2e::{bdd, config::Config};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    // Initialize tracing - RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Saucedemo E2E v{}", saucedemo_e2e::VERSION);
    info!(
        "Configuration loaded: platform={}, endpoint={}, backend={:?}",
        config.platform,
        config.appium.endpoint(),
        config.runner.backend
    );

    let summary = tokio::select! {
        result = bdd::run(config) => result?,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, open sessions expire after the new-command timeout");
            std::process::exit(130);
        }
    };

    if summary.has_failures() {
        error!("{} of {} scenarios failed", summary.failed, summary.total);
        std::process::exit(1);
    }

    info!("All {} scenarios passed", summary.total);
    Ok(())
}
