//! End-to-end integration tests
//!
//! These tests drive the app over real HTTP: the WebDriver client and the
//! page objects talk to a mock Appium server on a local port.

mod common;
mod mock_appium;

use std::time::Duration;

use common::{login, pages_for, remote_connector, remote_manager, test_config, BACKPACK, BIKE_LIGHT};
use mock_appium::MockAppiumServer;
use saucedemo_e2e::config::{Config, JourneyData};
use saucedemo_e2e::driver::{
    AutomationDriver, Capabilities, DriverConnector, Locator, MockConnector, Platform,
};
use saucedemo_e2e::pages::Screen;
use saucedemo_e2e::Error;

/// Test 1: Session lifecycle over HTTP
#[tokio::test]
async fn test_session_lifecycle() {
    common::init_tracing();
    let server = MockAppiumServer::start().await.unwrap();
    let config = test_config(&server.endpoint());
    let caps = Capabilities::for_platform(Platform::Android, &config);

    let driver = remote_connector()
        .connect(&server.endpoint(), &caps)
        .await
        .unwrap();
    assert!(!driver.session_id().is_empty());
    assert_eq!(server.stats().live(), 1);

    assert_eq!(driver.title().await.unwrap(), "Products");

    driver.quit().await.unwrap();
    assert_eq!(server.stats().quits(), 1);
    assert_eq!(server.stats().live(), 0);

    // Deleted session is gone on the server
    let err = driver.title().await.unwrap_err();
    assert!(matches!(err, Error::SessionNotFound(_)), "{err:?}");
}

/// Test 2: Server receives the configured capabilities
#[tokio::test]
async fn test_capabilities_reach_server() {
    let server = MockAppiumServer::start().await.unwrap();
    let mut config = test_config(&server.endpoint());
    config.platform = "iOS".to_string();
    config.ios.app = Some("/apps/MyDemoApp.app".to_string());

    let mut manager = saucedemo_e2e::session::DriverManager::new(
        std::sync::Arc::new(config),
        remote_connector(),
    );
    manager.get_or_create().await.unwrap();

    let received = server.last_capabilities().await.unwrap();
    assert_eq!(received.platform(), Some(Platform::Ios));
    assert_eq!(
        received.get("appium:automationName").and_then(|v| v.as_str()),
        Some("XCUITest")
    );
    assert_eq!(
        received.get("appium:app").and_then(|v| v.as_str()),
        Some("/apps/MyDemoApp.app")
    );

    manager.quit().await;
    assert_eq!(server.stats().quits(), 1);
}

/// Test 3: Refused session surfaces as a session creation error
#[tokio::test]
async fn test_session_creation_failure() {
    let connector = MockConnector::new(JourneyData::default()).failing_with("no device attached");
    let server = MockAppiumServer::start_with(connector).await.unwrap();
    let mut manager = remote_manager(&server.endpoint());

    let err = manager.get_or_create().await.unwrap_err();
    assert!(matches!(err, Error::SessionCreation(_)), "{err:?}");
    assert!(err.to_string().contains("Could not create automation session"));
    assert!(!manager.is_active());
    assert_eq!(server.stats().connects(), 0);
}

/// Test 4: Lookup errors map back onto typed errors
#[tokio::test]
async fn test_error_mapping() {
    let server = MockAppiumServer::start().await.unwrap();
    let mut manager = remote_manager(&server.endpoint());
    let driver = manager.get_or_create().await.unwrap();

    let missing = driver
        .find_element(&Locator::id("com.saucelabs.mydemoapp.android:id/errorTV"))
        .await
        .unwrap_err();
    assert!(matches!(missing, Error::ElementNotFound(_)), "{missing:?}");
    assert!(missing.is_transient_lookup());

    let none = driver
        .find_elements(&Locator::id("com.saucelabs.mydemoapp.android:id/errorTV"))
        .await
        .unwrap();
    assert!(none.is_empty());

    let invalid = driver
        .find_element(&Locator::xpath("//*[@text="))
        .await
        .unwrap_err();
    assert!(matches!(invalid, Error::InvalidSelector(_)), "{invalid:?}");

    // Stale after navigation
    let title = driver
        .find_element(&Locator::id("com.saucelabs.mydemoapp.android:id/titleTV"))
        .await
        .unwrap();
    let cart = driver
        .find_element(&Locator::id("com.saucelabs.mydemoapp.android:id/cartIV"))
        .await
        .unwrap();
    driver.click(&cart).await.unwrap();
    let stale = driver.text(&title).await.unwrap_err();
    assert!(stale.is_transient_lookup(), "{stale:?}");

    manager.quit().await;
}

/// Test 5: Element commands over HTTP
#[tokio::test]
async fn test_element_commands() {
    let server = MockAppiumServer::start().await.unwrap();
    let mut manager = remote_manager(&server.endpoint());
    let driver = manager.get_or_create().await.unwrap();

    let image = driver
        .find_element(&Locator::id("com.saucelabs.mydemoapp.android:id/productIV"))
        .await
        .unwrap();
    assert!(driver.is_displayed(&image).await.unwrap());
    assert!(driver.is_enabled(&image).await.unwrap());
    assert_eq!(
        driver.attribute(&image, "content-desc").await.unwrap().as_deref(),
        Some(BACKPACK)
    );

    let titles = driver
        .find_elements(&Locator::id("com.saucelabs.mydemoapp.android:id/titleTV"))
        .await
        .unwrap();
    assert_eq!(titles.len(), 4);
    assert_eq!(driver.text(&titles[0]).await.unwrap(), BACKPACK);

    let source = driver.page_source().await.unwrap();
    assert!(source.contains(BIKE_LIGHT));

    let rect = driver.window_rect().await.unwrap();
    assert_eq!((rect.width, rect.height), (1080.0, 2400.0));

    let png = driver.screenshot().await.unwrap();
    assert_eq!(&png[1..4], b"PNG");

    manager.quit().await;
}

/// Test 6: Login journey through page objects
#[tokio::test]
async fn test_login_journey() {
    let server = MockAppiumServer::start().await.unwrap();
    let config = test_config(&server.endpoint());
    let mut manager = remote_manager(&server.endpoint());
    let pages = pages_for(manager.get_or_create().await.unwrap(), &config);

    pages.login.open_from_menu().await.unwrap();
    pages.login.wait_until_loaded().await.unwrap();
    pages
        .login
        .perform_login(&config.journey.invalid_username, &config.journey.invalid_password)
        .await
        .unwrap();
    assert!(pages.login.is_error_displayed().await);
    assert!(pages.login.error_contains("Provided credentials do not match").await);
    assert!(pages.login.is_loaded().await);

    pages.login.clear_username().await.unwrap();
    pages.login.clear_password().await.unwrap();
    pages
        .login
        .perform_login(&config.journey.valid_username, &config.journey.valid_password)
        .await
        .unwrap();
    pages.inventory.wait_until_loaded().await.unwrap();
    assert!(pages.inventory.products_available().await.unwrap());

    manager.quit().await;
}

/// Test 7: Cart and checkout validation journey
#[tokio::test]
async fn test_checkout_validation_journey() {
    let server = MockAppiumServer::start().await.unwrap();
    let config = test_config(&server.endpoint());
    let mut manager = remote_manager(&server.endpoint());
    let pages = pages_for(manager.get_or_create().await.unwrap(), &config);
    login(&pages, &config).await.unwrap();

    pages.inventory.add_product_to_cart(BACKPACK).await.unwrap();
    pages.inventory.add_product_to_cart(BIKE_LIGHT).await.unwrap();
    assert_eq!(pages.inventory.cart_items_count().await, 2);

    pages.inventory.click_cart_icon().await.unwrap();
    pages.cart.wait_until_loaded().await.unwrap();
    assert_eq!(pages.cart.cart_items().await.unwrap(), vec![BACKPACK, BIKE_LIGHT]);

    pages.cart.remove_product(BIKE_LIGHT).await.unwrap();
    assert!(!pages.cart.is_product_in_cart(BIKE_LIGHT).await.unwrap());
    assert_eq!(pages.cart.cart_items_count().await, 1);

    pages.cart.click_checkout().await.unwrap();
    pages.checkout.wait_until_loaded().await.unwrap();
    assert!(pages.checkout.fields_empty().await.unwrap());

    pages.checkout.perform_checkout_without_data().await.unwrap();
    assert!(pages.checkout.is_error_displayed().await);
    assert!(pages
        .checkout
        .validate_error_message_exists(&config.journey.checkout_error)
        .await
        .unwrap());

    manager.quit().await;
    assert_eq!(server.stats().live(), 0);
}

/// Test 8: Swipe gestures travel as W3C actions
#[tokio::test]
async fn test_scroll_to_lower_product() {
    let server = MockAppiumServer::start().await.unwrap();
    let config = test_config(&server.endpoint());
    let mut manager = remote_manager(&server.endpoint());
    let pages = pages_for(manager.get_or_create().await.unwrap(), &config);

    pages
        .inventory
        .scroll_to_product("Test.allTheThings() T-Shirt")
        .await
        .unwrap();
    assert!(pages
        .inventory
        .is_product_present("Test.allTheThings() T-Shirt")
        .await
        .unwrap());

    pages.inventory.scroll_up_products().await.unwrap();
    manager.quit().await;
}

/// Test 9: Independent sessions do not share state
#[tokio::test]
async fn test_concurrent_sessions() {
    let server = MockAppiumServer::start().await.unwrap();
    let config = test_config(&server.endpoint());

    let mut first = remote_manager(&server.endpoint());
    let mut second = remote_manager(&server.endpoint());
    let first_pages = pages_for(first.get_or_create().await.unwrap(), &config);
    let second_pages = pages_for(second.get_or_create().await.unwrap(), &config);
    assert_eq!(server.stats().live(), 2);

    login(&first_pages, &config).await.unwrap();
    first_pages.inventory.add_product_to_cart(BACKPACK).await.unwrap();

    assert_eq!(first_pages.inventory.cart_items_count().await, 1);
    assert_eq!(second_pages.inventory.cart_items_count().await, 0);

    first.quit().await;
    second.quit().await;
    assert_eq!(server.stats().quits(), 2);
}

/// Test 10: Login against a real Appium server, when one is running
#[tokio::test]
async fn test_live_appium_login() {
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Skipping live test, configuration unavailable: {}", e);
            return;
        }
    };
    let endpoint = config.appium.endpoint();
    if !common::appium_available(&endpoint).await {
        eprintln!("Skipping live test, no Appium server at {}", endpoint);
        return;
    }

    let connector = saucedemo_e2e::driver::RemoteConnector::new(Duration::from_secs(
        config.appium.new_command_timeout_secs,
    ))
    .unwrap();
    let config = std::sync::Arc::new(config);
    let mut manager =
        saucedemo_e2e::session::DriverManager::new(config.clone(), std::sync::Arc::new(connector));
    let pages = pages_for(manager.get_or_create().await.unwrap(), &config);

    login(&pages, &config).await.unwrap();
    assert!(pages.inventory.products_available().await.unwrap());

    manager.quit().await;
}
