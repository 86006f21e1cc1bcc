//! Saucedemo E2E: mobile UI journeys for the Sauce Labs demo shopping app
//!
//! This library drives the app through a WebDriver automation server (or an
//! in-process simulator) with page objects and a cucumber step vocabulary.

pub mod error;
pub mod config;

pub mod driver;
pub mod session;
pub mod pages;
pub mod report;
pub mod bdd;

mod markup;

// Re-exports
pub use error::{Error, Result};

/// Saucedemo E2E library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
