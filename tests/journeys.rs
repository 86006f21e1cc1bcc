//! Cucumber journeys
//!
//! Runs `tests/features` end to end: the suite talks HTTP to a mock Appium
//! server started on a local port, exactly as it would to a real one.

mod common;
mod mock_appium;

use std::path::PathBuf;

use mock_appium::MockAppiumServer;
use saucedemo_e2e::bdd::{self, Suite};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    common::init_tracing();

    let server = MockAppiumServer::start().await?;

    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let mut config = common::test_config(&server.endpoint());
    config.runner.features = root.join("tests/features");
    config.runner.plugins = vec![
        "pretty".to_string(),
        format!("html:{}", root.join("target/journey-reports").display()),
        format!(
            "json:{}",
            root.join("target/journey-reports/cucumber.json").display()
        ),
    ];

    let suite = Suite::from_config(config)?.install()?;
    let summary = bdd::run_installed(suite).await?;

    let stats = server.stats();
    tracing::info!(
        "Mock Appium served {} sessions, {} still open",
        stats.connects(),
        stats.live()
    );

    if summary.has_failures() || stats.live() != 0 {
        eprintln!(
            "{} of {} journeys failed ({} sessions left open)",
            summary.failed,
            summary.total,
            stats.live()
        );
        std::process::exit(1);
    }
    Ok(())
}
