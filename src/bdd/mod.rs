//! # Behaviour-driven layer
//!
//! Cucumber world, hooks and the Spanish step vocabulary for the login
//! (`@reto1`) and checkout (`@reto2`) journeys.
//!
//! ## Module structure
//! - `world`: per-scenario [`ShopWorld`] and the process-wide [`Suite`]
//! - `hooks`: driver and report lifecycle around each scenario
//! - `steps`: step definitions
//! - `runner`: entry point used by the binary and the journey tests, tag selection
//!
//! ## Example
//! ```rust,no_run
//! use saucedemo_e2e::bdd;
//! use saucedemo_e2e::config::{Backend, Config};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let mut config = Config::load()?;
//! config.runner.backend = Backend::Simulator;
//!
//! let summary = bdd::run(config).await?;
//! assert!(!summary.has_failures());
//! # Ok(())
//! # }
//! ```

pub mod world;
pub mod hooks;
pub mod steps;
pub mod runner;

#[cfg(test)]
mod tests;

pub use runner::{parse_tags, run, run_installed, selects};
pub use world::{ErrorScreen, ShopWorld, Suite};
