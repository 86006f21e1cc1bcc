//! Driver lifecycle manager
//!
//! Owns at most one live automation session and creates it on first use.

use std::sync::Arc;
use tracing::{info, warn};

use crate::config::Config;
use crate::driver::{AutomationDriver, Capabilities, DriverConnector, Platform};
use crate::{Error, Result};

/// Lazily created automation session for one scenario
#[derive(Debug)]
pub struct DriverManager {
    config: Arc<Config>,
    connector: Arc<dyn DriverConnector>,
    driver: Option<Arc<dyn AutomationDriver>>,
}

impl DriverManager {
    /// Create a manager without a session
    ///
    /// # Arguments
    /// * `config` - suite configuration (platform, device profiles, endpoint, waits)
    /// * `connector` - backend the session is opened on
    pub fn new(config: Arc<Config>, connector: Arc<dyn DriverConnector>) -> Self {
        Self {
            config,
            connector,
            driver: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Platform named by the configuration
    pub fn platform(&self) -> Result<Platform> {
        self.config.platform.parse()
    }

    /// Return the live session, opening it on first call
    pub async fn get_or_create(&mut self) -> Result<Arc<dyn AutomationDriver>> {
        if let Some(driver) = &self.driver {
            return Ok(Arc::clone(driver));
        }

        let platform = self.platform()?;
        let capabilities = Capabilities::for_platform(platform, &self.config);
        let endpoint = self.config.appium.endpoint();
        info!("Creating {} driver against {}", platform, endpoint);

        let driver = self
            .connector
            .connect(&endpoint, &capabilities)
            .await
            .map_err(Error::session_creation)?;

        if let Err(e) = driver.set_implicit_wait(self.config.appium.implicit_wait()).await {
            if let Err(close) = driver.quit().await {
                warn!("Failed to close half-initialised session: {}", close);
            }
            return Err(Error::session_creation(e));
        }

        info!("Driver created, session {}", driver.session_id());
        self.driver = Some(Arc::clone(&driver));
        Ok(driver)
    }

    /// Close the session if one is open; close errors are only logged
    pub async fn quit(&mut self) {
        let Some(driver) = self.driver.take() else {
            return;
        };

        info!("Closing driver session {}", driver.session_id());
        if let Err(e) = driver.quit().await {
            warn!("Error closing driver: {}", e);
        }
    }

    /// Whether a session is currently held
    pub fn is_active(&self) -> bool {
        self.driver.is_some()
    }

    /// Live session without creating one
    pub fn current(&self) -> Option<Arc<dyn AutomationDriver>> {
        self.driver.clone()
    }
}
