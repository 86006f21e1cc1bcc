//! Scenario teardown through the cucumber runner
//!
//! A failing step must still reach the `after` hook: the session is quit,
//! and the report carries the failure and a screenshot.

mod common;
mod mock_appium;

use std::path::PathBuf;

use mock_appium::MockAppiumServer;
use saucedemo_e2e::bdd::{self, Suite};
use saucedemo_e2e::report::ScenarioStatus;

/// The suite is process-wide, so this binary runs exactly one suite
#[tokio::test]
async fn test_failing_step_still_quits_the_driver() {
    common::init_tracing();
    let server = MockAppiumServer::start().await.unwrap();

    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let mut config = common::test_config(&server.endpoint());
    config.runner.features = root.join("tests/fixtures/failing_login.feature");
    config.runner.tags = "@teardown".to_string();
    config.runner.plugins = Vec::new();

    let suite = Suite::from_config(config).unwrap().install().unwrap();
    let summary = bdd::run_installed(suite.clone()).await.unwrap();

    assert_eq!(summary.total, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.passed, 1);

    let stats = server.stats();
    assert_eq!(stats.connects(), 2);
    assert_eq!(stats.quits(), 2);
    assert_eq!(stats.live(), 0);

    let scenarios = suite.recorder().scenarios().await;
    let failed = scenarios
        .iter()
        .find(|s| s.name == "Mensaje de error inesperado")
        .expect("failed scenario recorded");
    assert_eq!(failed.status, ScenarioStatus::Failed);
    let failure = failed.failure.as_deref().unwrap_or_default();
    assert!(failure.contains("zzz-not-there"), "failure detail: {failure}");
    assert!(failed.screenshot.is_some());
    assert!(failed.tags.contains(&"@fallido".to_string()));

    let passed = scenarios
        .iter()
        .find(|s| s.name == "Login exitoso después de un fallo")
        .expect("passing scenario recorded");
    assert_eq!(passed.status, ScenarioStatus::Passed);
    assert!(passed.screenshot.is_none());
}
