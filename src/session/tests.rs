//! Tests for the driver lifecycle and interaction primitives

use std::sync::Arc;
use std::time::Duration;

use crate::config::{Config, JourneyData};
use crate::driver::{AutomationDriver, Locator, MockConnector, MockDriver};
use crate::session::{DriverManager, Interaction, Presence};
use crate::Error;

/// Helper function to create a manager over a mock connector
fn create_test_manager(connector: MockConnector) -> DriverManager {
    DriverManager::new(Arc::new(Config::default()), Arc::new(connector))
}

fn create_interaction() -> (Arc<MockDriver>, Interaction) {
    let driver = Arc::new(MockDriver::new(JourneyData::default()));
    let dyn_driver: Arc<dyn AutomationDriver> = driver.clone();
    let ui = Interaction::new(dyn_driver, Duration::from_millis(200), Duration::from_millis(20));
    (driver, ui)
}

#[tokio::test]
async fn test_driver_lifecycle() {
    let connector = MockConnector::new(JourneyData::default());
    let stats = connector.stats();
    let mut manager = create_test_manager(connector);

    assert!(!manager.is_active());
    let first = manager.get_or_create().await.expect("Failed to create driver");
    let second = manager.get_or_create().await.expect("Failed to reuse driver");

    assert_eq!(first.session_id(), second.session_id());
    assert!(manager.is_active());
    assert_eq!(stats.connects(), 1);

    manager.quit().await;
    assert!(!manager.is_active());
    assert!(manager.current().is_none());
    assert_eq!(stats.quits(), 1);

    // Idempotent
    manager.quit().await;
    assert_eq!(stats.quits(), 1);
}

#[tokio::test]
async fn test_new_driver_after_quit() {
    let connector = MockConnector::new(JourneyData::default());
    let stats = connector.stats();
    let mut manager = create_test_manager(connector);

    let first = manager.get_or_create().await.unwrap().session_id().to_string();
    manager.quit().await;
    let second = manager.get_or_create().await.unwrap().session_id().to_string();

    assert_ne!(first, second);
    assert_eq!(stats.connects(), 2);
    assert_eq!(stats.live(), 1);
}

#[tokio::test]
async fn test_capabilities_follow_configured_platform() {
    let connector = MockConnector::new(JourneyData::default());
    let mut config = Config::default();
    config.platform = "ios".to_string();
    let mut manager = DriverManager::new(Arc::new(config), Arc::new(connector.clone()));

    manager.get_or_create().await.unwrap();

    let caps = connector.last_capabilities().await.expect("No connection attempt recorded");
    assert_eq!(caps.get("platformName").and_then(|v| v.as_str()), Some("iOS"));
    assert_eq!(caps.get("appium:automationName").and_then(|v| v.as_str()), Some("XCUITest"));
}

#[tokio::test]
async fn test_unsupported_platform_fails_fast() {
    let connector = MockConnector::new(JourneyData::default());
    let mut config = Config::default();
    config.platform = "Windows Phone".to_string();
    let mut manager = DriverManager::new(Arc::new(config), Arc::new(connector.clone()));

    let err = manager.get_or_create().await.unwrap_err();

    assert!(matches!(err, Error::UnsupportedPlatform(ref name) if name == "Windows Phone"));
    assert!(!manager.is_active());
    assert!(connector.last_capabilities().await.is_none());
}

#[tokio::test]
async fn test_connect_failure_is_wrapped() {
    let mut manager =
        create_test_manager(MockConnector::new(JourneyData::default()).failing_with("device offline"));

    let err = manager.get_or_create().await.unwrap_err();

    match err {
        Error::SessionCreation(source) => assert_eq!(source.w3c_code(), "session not created"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!manager.is_active());
}

#[tokio::test]
async fn test_rejected_implicit_wait_closes_session() {
    let connector = MockConnector::new(JourneyData::default()).rejecting_timeouts();
    let stats = connector.stats();
    let mut manager = create_test_manager(connector);

    let err = manager.get_or_create().await.unwrap_err();

    assert!(matches!(err, Error::SessionCreation(_)));
    assert!(!manager.is_active());
    assert_eq!(stats.live(), 0);
}

#[tokio::test]
async fn test_implicit_wait_applied() {
    let connector = MockConnector::new(JourneyData::default());
    let caps = crate::driver::Capabilities::for_platform(
        crate::driver::Platform::Android,
        &Config::default(),
    );
    // Same path the manager takes, with the concrete driver kept for inspection
    let driver = connector.open(&caps).await.unwrap();
    driver.set_implicit_wait(Config::default().appium.implicit_wait()).await.unwrap();
    assert_eq!(driver.implicit_wait().await, Duration::from_secs(10));
}

#[tokio::test]
async fn test_wait_for_visible() {
    let (_, ui) = create_interaction();
    let element = ui.wait_for_visible(&Locator::id("cartIV")).await;
    assert!(element.is_ok());
}

#[tokio::test]
async fn test_wait_times_out_on_missing_element() {
    let (_, ui) = create_interaction();

    let started = tokio::time::Instant::now();
    let err = ui.wait_for_visible(&Locator::id("errorTV")).await.unwrap_err();

    assert!(matches!(err, Error::Timeout(_)), "unexpected error: {err:?}");
    assert!(started.elapsed() >= Duration::from_millis(150));
}

#[tokio::test]
async fn test_unbounded_waits_do_not_overflow() {
    let driver: Arc<dyn AutomationDriver> = Arc::new(MockDriver::new(JourneyData::default()));

    let ui = Interaction::new(driver.clone(), Duration::MAX, Duration::from_millis(20));
    assert!(ui.wait_for_visible(&Locator::id("cartIV")).await.is_ok());

    // A poll interval past the deadline gives up after one attempt
    let ui = Interaction::new(driver, Duration::from_millis(200), Duration::MAX);
    let started = tokio::time::Instant::now();
    let err = ui.wait_for_visible(&Locator::id("errorTV")).await.unwrap_err();
    assert!(matches!(err, Error::Timeout(_)), "unexpected error: {err:?}");
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_wait_aborts_on_invalid_selector() {
    let (_, ui) = create_interaction();
    let err = ui.wait_for_visible(&Locator::xpath("not a path")).await.unwrap_err();
    assert!(matches!(err, Error::InvalidSelector(_)));
}

#[tokio::test]
async fn test_wait_for_invisible() {
    let (_, ui) = create_interaction();
    ui.wait_for_invisible(&Locator::id("errorTV")).await.unwrap();

    let err = ui.wait_for_invisible(&Locator::id("cartIV")).await.unwrap_err();
    assert!(matches!(err, Error::Timeout(_)));
}

#[tokio::test]
async fn test_soft_queries_degrade_to_false() {
    let (_, ui) = create_interaction();

    assert_eq!(ui.probe(&Locator::id("errorTV")).await, Presence::Absent);
    assert!(!ui.is_present(&Locator::id("errorTV")).await);
    assert!(!ui.is_visible(&Locator::id("errorTV")).await);
    assert!(!ui.is_enabled(&Locator::id("errorTV")).await);
    assert!(!ui.is_visible(&Locator::xpath("((broken")).await);

    assert!(ui.probe(&Locator::id("menuIV")).await.element().is_some());
    assert!(ui.is_visible(&Locator::id("menuIV")).await);
    assert!(ui.is_enabled(&Locator::id("menuIV")).await);
}

#[tokio::test]
async fn test_type_into_replaces_text() {
    let (_, ui) = create_interaction();
    ui.click(&Locator::id("menuIV")).await.unwrap();
    ui.click(&Locator::xpath("//*[@text='Log In']")).await.unwrap();

    let name = Locator::id("nameET");
    ui.type_into(&name, "first").await.unwrap();
    ui.type_into(&name, "bob@example.com").await.unwrap();
    assert_eq!(ui.read_text(&name).await.unwrap(), "bob@example.com");

    ui.clear(&name).await.unwrap();
    assert_eq!(ui.read_text(&name).await.unwrap(), "");
}

#[tokio::test]
async fn test_texts_and_attributes() {
    let (_, ui) = create_interaction();
    let titles = ui.texts_of(&Locator::id("titleTV")).await.unwrap();
    assert_eq!(titles.len(), 4);
    assert!(ui.texts_of(&Locator::id("removeBt")).await.unwrap().is_empty());

    assert_eq!(
        ui.read_attribute(&Locator::id("menuIV"), "content-desc").await.unwrap().as_deref(),
        Some("View menu")
    );
    assert_eq!(ui.title().await.unwrap(), "Products");
}

#[tokio::test]
async fn test_scroll_to_reveals_lower_rows() {
    let (driver, ui) = create_interaction();
    let onesie = Locator::xpath("//android.widget.TextView[@text='Sauce Labs Onesie']");

    assert!(!ui.is_present(&onesie).await);
    ui.scroll_to(&onesie, 3).await.unwrap();

    let swipes = driver
        .commands()
        .await
        .iter()
        .filter(|c| c.starts_with("swipe"))
        .count();
    assert_eq!(swipes, 1);
}

#[tokio::test]
async fn test_scroll_to_gives_up() {
    let (_, ui) = create_interaction();
    let err = ui.scroll_to(&Locator::id("completeTV"), 2).await.unwrap_err();
    assert!(matches!(err, Error::ElementNotFound(_)));
}

#[tokio::test]
async fn test_scroll_up_and_down() {
    let (_, ui) = create_interaction();
    ui.scroll_down().await.unwrap();
    assert_eq!(ui.texts_of(&Locator::id("titleTV")).await.unwrap()[0], "Sauce Labs Bike Light");
    ui.scroll_up().await.unwrap();
    assert_eq!(ui.texts_of(&Locator::id("titleTV")).await.unwrap()[0], "Sauce Labs Backpack");
}

#[tokio::test]
async fn test_contains_text_and_pause() {
    let (driver, ui) = create_interaction();
    assert!(ui.contains_text("Sauce Labs Backpack").await);
    assert!(!ui.contains_text("Checkout Complete").await);

    ui.pause(Duration::from_millis(10)).await;

    driver.quit().await.unwrap();
    // Closed session degrades to false
    assert!(!ui.contains_text("Sauce Labs Backpack").await);
}

#[tokio::test]
async fn test_contains_text_matches_escaped_source() {
    let (driver, ui) = create_interaction();
    ui.click(&Locator::id("menuIV")).await.unwrap();
    ui.click(&Locator::xpath("//*[@text='Log In']")).await.unwrap();

    ui.type_into(&Locator::id("nameET"), "R&D <team> \"qa\"").await.unwrap();
    assert!(driver.page_source().await.unwrap().contains("R&amp;D &lt;team&gt;"));
    assert!(ui.contains_text("R&D <team> \"qa\"").await);
    assert!(!ui.contains_text("R&D <ops>").await);
}
