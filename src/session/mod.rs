//! # Session layer
//!
//! Owns the automation session of a scenario and the primitives pages use to
//! talk to it.
//!
//! ## Core concepts
//! - **DriverManager**: lazily opens one session per scenario and closes it at the end
//! - **Interaction**: explicit waits, taps, typing, reads, probes and scroll gestures
//! - **Presence**: result of a single lookup, instead of a swallowed error
//!
//! ## Example
//! ```rust,no_run
//! use saucedemo_e2e::config::Config;
//! use saucedemo_e2e::driver::{Locator, MockConnector};
//! use saucedemo_e2e::session::{DriverManager, Interaction};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Arc::new(Config::default());
//! let connector = Arc::new(MockConnector::new(config.journey.clone()));
//! let mut manager = DriverManager::new(config.clone(), connector);
//!
//! let driver = manager.get_or_create().await?;
//! let ui = Interaction::from_config(driver, &config.appium);
//! ui.click(&Locator::id("com.saucelabs.mydemoapp.android:id/cartIV")).await?;
//!
//! manager.quit().await;
//! # Ok(())
//! # }
//! ```

pub mod manager;
pub mod interaction;

#[cfg(test)]
pub mod tests;

pub use manager::DriverManager;
pub use interaction::{Interaction, Presence, DEFAULT_MAX_SWIPES, SCROLL_DISTANCE};
