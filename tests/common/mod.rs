//! Common test utilities
//!
//! Shared configuration and fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use saucedemo_e2e::config::Config;
use saucedemo_e2e::driver::{AutomationDriver, DriverConnector, RemoteConnector};
use saucedemo_e2e::pages::{Pages, Screen};
use saucedemo_e2e::session::{DriverManager, Interaction};

pub const BACKPACK: &str = "Sauce Labs Backpack";
pub const BIKE_LIGHT: &str = "Sauce Labs Bike Light";

/// Configuration pointing at `endpoint` with short waits
pub fn test_config(endpoint: &str) -> Config {
    let mut config = Config::default();
    config.appium.server_url = endpoint.to_string();
    config.appium.server_path = String::new();
    config.appium.implicit_wait_secs = 0;
    config.appium.explicit_wait_secs = 2;
    config.appium.poll_interval_ms = 25;
    config.appium.new_command_timeout_secs = 10;
    config
}

/// HTTP connector with a short request timeout
pub fn remote_connector() -> Arc<dyn DriverConnector> {
    Arc::new(RemoteConnector::new(Duration::from_secs(10)).expect("HTTP client"))
}

/// Session manager talking HTTP to `endpoint`
pub fn remote_manager(endpoint: &str) -> DriverManager {
    DriverManager::new(Arc::new(test_config(endpoint)), remote_connector())
}

/// Page objects over an open session
pub fn pages_for(driver: Arc<dyn AutomationDriver>, config: &Config) -> Pages {
    Pages::new(Interaction::from_config(driver, &config.appium))
}

/// Log in with the default journey credentials and wait for the catalog
pub async fn login(pages: &Pages, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    pages.login.open_from_menu().await?;
    pages
        .login
        .perform_login(&config.journey.valid_username, &config.journey.valid_password)
        .await?;
    pages.inventory.wait_until_loaded().await?;
    Ok(())
}

/// Whether a real automation server answers `GET {endpoint}/status`
pub async fn appium_available(endpoint: &str) -> bool {
    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()
    {
        Ok(client) => client,
        Err(_) => return false,
    };

    match client
        .get(format!("{}/status", endpoint.trim_end_matches('/')))
        .send()
        .await
    {
        Ok(response) => response.status().is_success(),
        Err(_) => false,
    }
}

/// Install a test subscriber once per test binary
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}
