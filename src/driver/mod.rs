//! # Automation driver layer
//!
//! Talks to a device-automation server over the W3C WebDriver protocol, or to
//! an in-process simulator of the demo app.
//!
//! ## Module structure
//! - `traits`: `AutomationDriver` / `DriverConnector` and the value types they use
//! - `locator`: element locators
//! - `capabilities`: per-platform session capabilities
//! - `types`: wire format
//! - `client` / `connector`: HTTP implementation
//! - `ui_tree`, `xpath`, `simulator`, `mock`: simulator backend
//!
//! ## Example
//! ```rust,no_run
//! use saucedemo_e2e::config::Config;
//! use saucedemo_e2e::driver::{Capabilities, DriverConnector, Locator, Platform, RemoteConnector};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let connector = RemoteConnector::new(Duration::from_secs(60))?;
//! let caps = Capabilities::for_platform(Platform::Android, &config);
//! let driver = connector.connect(&config.appium.endpoint(), &caps).await?;
//!
//! let login = driver.find_element(&Locator::id("com.saucelabs.mydemoapp.android:id/loginBtn")).await?;
//! driver.click(&login).await?;
//! driver.quit().await?;
//! # Ok(())
//! # }
//! ```

pub mod traits;
pub mod locator;
pub mod capabilities;
pub mod types;
pub mod client;
pub mod connector;
pub mod ui_tree;
pub mod xpath;
pub mod simulator;
pub mod mock;


pub use traits::{AutomationDriver, DriverConnector, ElementHandle, Point, Swipe, WindowRect};
pub use locator::{xpath_literal, Locator, Strategy};
pub use capabilities::{Capabilities, Platform};

pub use client::WebDriverClient;
pub use connector::RemoteConnector;

pub use mock::{MockConnector, MockDriver, MockStats};
