//! World lifecycle tests against the simulator

use std::sync::Arc;

use super::*;
use crate::config::Config;
use crate::driver::{DriverConnector, MockConnector};
use crate::pages::Screen;
use crate::report::ScenarioStatus;
use crate::Error;

fn fast_config() -> Config {
    let mut config = Config::default();
    config.appium.explicit_wait_secs = 1;
    config.appium.poll_interval_ms = 20;
    config
}

fn create_test_suite(connector: MockConnector) -> Arc<Suite> {
    let connector: Arc<dyn DriverConnector> = Arc::new(connector);
    Arc::new(Suite::new(fast_config(), connector))
}

#[tokio::test]
async fn test_scenario_opens_and_closes_driver() {
    let connector = MockConnector::new(fast_config().journey);
    let stats = connector.stats();
    let suite = create_test_suite(connector);
    let mut world = ShopWorld::with_suite(Arc::clone(&suite));

    world
        .start("Login", "Login exitoso", &["@reto1".to_string()])
        .await;
    assert!(world.is_driver_active());
    assert!(world.pages().unwrap().inventory.is_loaded().await);
    world.record("Paso ejecutado").await;

    world.finish(ScenarioStatus::Passed, None).await;
    assert!(!world.is_driver_active());
    assert!(world.pages().is_err());
    assert_eq!(stats.connects(), 1);
    assert_eq!(stats.quits(), 1);

    let scenarios = suite.recorder().scenarios().await;
    assert_eq!(scenarios.len(), 1);
    assert_eq!(scenarios[0].status, ScenarioStatus::Passed);
    assert_eq!(scenarios[0].tags, vec!["@reto1"]);
    assert!(scenarios[0].entries[0].message.starts_with("Scenario started: Login exitoso"));
    assert_eq!(scenarios[0].entries[1].message, "Paso ejecutado");
    assert!(scenarios[0].screenshot.is_none());
}

#[tokio::test]
async fn test_failed_scenario_gets_screenshot() {
    let suite = create_test_suite(MockConnector::new(fast_config().journey));
    let mut world = ShopWorld::with_suite(Arc::clone(&suite));

    world.start("Checkout", "Checkout sin datos", &[]).await;
    world
        .finish(ScenarioStatus::Failed, Some("boom".to_string()))
        .await;

    let report = &suite.recorder().scenarios().await[0];
    assert_eq!(report.status, ScenarioStatus::Failed);
    assert_eq!(report.failure.as_deref(), Some("boom"));
    assert!(report.screenshot.is_some());
}

#[tokio::test]
async fn test_driver_failure_aborts_steps() {
    let connector = MockConnector::new(fast_config().journey).failing_with("no device");
    let stats = connector.stats();
    let suite = create_test_suite(connector);
    let mut world = ShopWorld::with_suite(Arc::clone(&suite));

    world.start("Login", "Login fallido", &[]).await;
    assert!(!world.is_driver_active());
    let err = world.pages().unwrap_err().to_string();
    assert!(err.contains("Scenario aborted"), "{}", err);

    world.finish(ScenarioStatus::Failed, Some(err)).await;
    assert_eq!(stats.quits(), 0);

    let report = &suite.recorder().scenarios().await[0];
    assert!(report.entries[0].message.starts_with("Driver creation failed"));
}

#[tokio::test]
async fn test_finish_twice_quits_once() {
    let connector = MockConnector::new(fast_config().journey);
    let stats = connector.stats();
    let mut world = ShopWorld::with_suite(create_test_suite(connector));

    world.start("Login", "Doble cierre", &[]).await;
    world.finish(ScenarioStatus::Passed, None).await;
    world.finish(ScenarioStatus::Passed, None).await;
    assert_eq!(stats.quits(), 1);
}

#[test]
fn test_world_defaults() {
    let world = ShopWorld::with_suite(create_test_suite(MockConnector::new(
        fast_config().journey,
    )));
    assert_eq!(world.error_screen, ErrorScreen::Login);
    assert!(world.selected_product.is_none());
    assert!(world.cart_products.is_empty());
    assert_eq!(world.journey().default_product, "Sauce Labs Backpack");
}

#[test]
fn test_default_tag_expression() {
    let filter = parse_tags("@reto1 or @reto2").unwrap();
    assert!(selects(&filter, &["@reto1"]));
    assert!(selects(&filter, &["reto2", "smoke"]));
    assert!(!selects(&filter, &["@smoke"]));
    assert!(!selects::<&str>(&filter, &[]));
}

#[test]
fn test_tag_expression_precedence() {
    let filter = parse_tags("@a or @b and not @c").unwrap();
    assert!(selects(&filter, &["@a", "@c"]));
    assert!(!selects(&filter, &["@b", "@c"]));
    assert!(selects(&filter, &["@b"]));
}

#[test]
fn test_tag_expression_parentheses() {
    let grouped = parse_tags("(@a or @b) and not @c").unwrap();
    assert!(!selects(&grouped, &["@a", "@c"]));
    assert!(selects(&grouped, &["@b"]));

    let negated = parse_tags("not (@wip or @manual)").unwrap();
    assert!(selects(&negated, &["@reto1"]));
    assert!(!selects(&negated, &["@manual"]));
}

#[test]
fn test_invalid_tag_expressions() {
    for bad in ["", "reto1", "@a and", "(@a or @b", "@a not @b", "@a )"] {
        match parse_tags(bad) {
            Err(Error::Configuration(msg)) => assert!(msg.contains("Invalid tag expression")),
            other => panic!("accepted '{}': {:?}", bad, other),
        }
    }
}
