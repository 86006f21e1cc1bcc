//! Mock automation backend for testing
//!
//! [`MockDriver`] answers every driver command from a [`DemoApp`] model, so
//! the page objects and journeys can run without a device.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

use super::capabilities::Capabilities;
use super::locator::Locator;
use super::simulator::DemoApp;
use super::traits::*;
use super::ui_tree::{FlatNode, UiTree};
use crate::config::JourneyData;
use crate::Error;

/// 1x1 transparent PNG
const SCREENSHOT_PNG: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk+M9QDwADhgGAWjR9awAAAABJRU5ErkJggg==";

const WINDOW: WindowRect = WindowRect {
    x: 0.0,
    y: 0.0,
    width: 1080.0,
    height: 2400.0,
};

/// Session counters shared by a connector and its drivers
#[derive(Debug, Default)]
pub struct MockStats {
    connects: AtomicUsize,
    quits: AtomicUsize,
}

impl MockStats {
    /// Sessions opened
    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    /// Sessions closed
    pub fn quits(&self) -> usize {
        self.quits.load(Ordering::SeqCst)
    }

    /// Sessions still open
    pub fn live(&self) -> usize {
        self.connects().saturating_sub(self.quits())
    }
}

#[derive(Debug)]
struct MockState {
    app: DemoApp,
    /// Element id -> node key
    elements: HashMap<String, String>,
    implicit_wait: Duration,
    closed: bool,
    commands: Vec<String>,
}

/// Mock automation driver backed by the app simulator
#[derive(Debug)]
pub struct MockDriver {
    session_id: String,
    state: Mutex<MockState>,
    stats: Arc<MockStats>,
    reject_timeouts: bool,
}

impl MockDriver {
    /// Create a standalone mock session
    pub fn new(journey: JourneyData) -> Self {
        Self::with_stats(journey, Arc::new(MockStats::default()), false)
    }

    fn with_stats(journey: JourneyData, stats: Arc<MockStats>, reject_timeouts: bool) -> Self {
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            state: Mutex::new(MockState {
                app: DemoApp::new(journey),
                elements: HashMap::new(),
                implicit_wait: Duration::ZERO,
                closed: false,
                commands: Vec::new(),
            }),
            stats,
            reject_timeouts,
        }
    }

    /// Commands received so far, e.g. `click login.button`
    pub async fn commands(&self) -> Vec<String> {
        self.state.lock().await.commands.clone()
    }

    /// Last implicit wait applied to the session
    pub async fn implicit_wait(&self) -> Duration {
        self.state.lock().await.implicit_wait
    }

    /// Inspect the simulated app
    pub async fn app(&self) -> DemoApp {
        self.state.lock().await.app.clone()
    }

    /// Lock the session state, failing once the session is closed
    async fn open_state(&self, command: String) -> Result<tokio::sync::MutexGuard<'_, MockState>, Error> {
        let mut state = self.state.lock().await;
        if state.closed {
            return Err(Error::session_not_found(self.session_id.clone()));
        }
        debug!("Mock session {}: {}", self.session_id, command);
        state.commands.push(command);
        Ok(state)
    }

    /// Key of the node `element` refers to; stale when it is no longer rendered
    fn resolve_key(state: &MockState, element: &ElementHandle) -> Result<String, Error> {
        let key = state
            .elements
            .get(element.id())
            .ok_or_else(|| Error::stale_element(element.id()))?;
        let tree = UiTree::build(&state.app.render());
        match tree.position(key) {
            Some(_) => Ok(key.clone()),
            None => Err(Error::stale_element(element.id())),
        }
    }

    fn resolve_node(state: &MockState, element: &ElementHandle) -> Result<FlatNode, Error> {
        let key = Self::resolve_key(state, element)?;
        let tree = UiTree::build(&state.app.render());
        tree.position(&key)
            .map(|i| tree.node(i).clone())
            .ok_or_else(|| Error::stale_element(element.id()))
    }

    fn register(state: &mut MockState, key: &str) -> ElementHandle {
        let id = uuid::Uuid::new_v4().to_string();
        state.elements.insert(id.clone(), key.to_string());
        ElementHandle::new(id)
    }
}

#[async_trait]
impl AutomationDriver for MockDriver {
    fn session_id(&self) -> &str {
        &self.session_id
    }

    async fn find_element(&self, locator: &Locator) -> Result<ElementHandle, Error> {
        let mut state = self.open_state(format!("find {}", locator)).await?;
        let tree = UiTree::build(&state.app.render());
        let first = tree
            .find_all(locator)?
            .first()
            .map(|&i| tree.node(i).key.clone())
            .ok_or_else(|| Error::element_not_found(locator.to_string()))?;
        Ok(Self::register(&mut state, &first))
    }

    async fn find_elements(&self, locator: &Locator) -> Result<Vec<ElementHandle>, Error> {
        let mut state = self.open_state(format!("find_all {}", locator)).await?;
        let tree = UiTree::build(&state.app.render());
        let keys: Vec<String> = tree
            .find_all(locator)?
            .into_iter()
            .map(|i| tree.node(i).key.clone())
            .collect();
        Ok(keys.iter().map(|k| Self::register(&mut state, k)).collect())
    }

    async fn click(&self, element: &ElementHandle) -> Result<(), Error> {
        let mut state = self.open_state(format!("click {}", element.id())).await?;
        let node = Self::resolve_node(&state, element)?;
        if !node.enabled {
            return Err(Error::webdriver(
                "element not interactable",
                format!("{} is disabled", node.key),
            ));
        }
        if let Some(last) = state.commands.last_mut() {
            *last = format!("click {}", node.key);
        }
        state.app.click(&node.key)
    }

    async fn clear(&self, element: &ElementHandle) -> Result<(), Error> {
        let mut state = self.open_state(format!("clear {}", element.id())).await?;
        let key = Self::resolve_key(&state, element)?;
        state.app.clear(&key)
    }

    async fn send_keys(&self, element: &ElementHandle, text: &str) -> Result<(), Error> {
        let mut state = self.open_state(format!("send_keys {}", element.id())).await?;
        let key = Self::resolve_key(&state, element)?;
        state.app.type_text(&key, text)
    }

    async fn text(&self, element: &ElementHandle) -> Result<String, Error> {
        let state = self.open_state(format!("text {}", element.id())).await?;
        Ok(Self::resolve_node(&state, element)?.text)
    }

    async fn attribute(&self, element: &ElementHandle, name: &str) -> Result<Option<String>, Error> {
        let state = self.open_state(format!("attribute {} {}", element.id(), name)).await?;
        Ok(Self::resolve_node(&state, element)?.attribute(name))
    }

    async fn is_displayed(&self, element: &ElementHandle) -> Result<bool, Error> {
        let state = self.open_state(format!("displayed {}", element.id())).await?;
        Ok(Self::resolve_node(&state, element)?.displayed)
    }

    async fn is_enabled(&self, element: &ElementHandle) -> Result<bool, Error> {
        let state = self.open_state(format!("enabled {}", element.id())).await?;
        Ok(Self::resolve_node(&state, element)?.enabled)
    }

    async fn page_source(&self) -> Result<String, Error> {
        let state = self.open_state("source".to_string()).await?;
        Ok(UiTree::build(&state.app.render()).to_xml())
    }

    async fn title(&self) -> Result<String, Error> {
        let state = self.open_state("title".to_string()).await?;
        Ok(state.app.title())
    }

    async fn window_rect(&self) -> Result<WindowRect, Error> {
        self.open_state("window_rect".to_string()).await?;
        Ok(WINDOW)
    }

    async fn swipe(&self, swipe: Swipe) -> Result<(), Error> {
        let mut state = self
            .open_state(format!("swipe {:.0}", swipe.content_offset()))
            .await?;
        state.app.scroll(swipe.content_offset());
        Ok(())
    }

    async fn set_implicit_wait(&self, timeout: Duration) -> Result<(), Error> {
        let mut state = self
            .open_state(format!("timeouts implicit={}ms", timeout.as_millis()))
            .await?;
        if self.reject_timeouts {
            return Err(Error::webdriver("unknown error", "timeouts rejected"));
        }
        state.implicit_wait = timeout;
        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>, Error> {
        self.open_state("screenshot".to_string()).await?;
        BASE64
            .decode(SCREENSHOT_PNG)
            .map_err(|e| Error::internal(format!("Invalid screenshot data: {}", e)))
    }

    async fn quit(&self) -> Result<(), Error> {
        let mut state = self.open_state("quit".to_string()).await?;
        state.closed = true;
        state.elements.clear();
        self.stats.quits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Mock connector opening simulator-backed sessions
#[derive(Debug, Clone)]
pub struct MockConnector {
    journey: JourneyData,
    stats: Arc<MockStats>,
    connect_failure: Option<String>,
    reject_timeouts: bool,
    last_capabilities: Arc<Mutex<Option<Capabilities>>>,
}

impl MockConnector {
    /// Create a connector whose sessions simulate the app with `journey` data
    pub fn new(journey: JourneyData) -> Self {
        Self {
            journey,
            stats: Arc::new(MockStats::default()),
            connect_failure: None,
            reject_timeouts: false,
            last_capabilities: Arc::new(Mutex::new(None)),
        }
    }

    /// Refuse every session with `message`
    pub fn failing_with<S: Into<String>>(mut self, message: S) -> Self {
        self.connect_failure = Some(message.into());
        self
    }

    /// Open sessions that reject timeout changes
    pub fn rejecting_timeouts(mut self) -> Self {
        self.reject_timeouts = true;
        self
    }

    pub fn stats(&self) -> Arc<MockStats> {
        Arc::clone(&self.stats)
    }

    /// Capabilities of the most recent connection attempt
    pub async fn last_capabilities(&self) -> Option<Capabilities> {
        self.last_capabilities.lock().await.clone()
    }

    /// Open a session and keep the concrete driver type
    pub async fn open(&self, capabilities: &Capabilities) -> Result<Arc<MockDriver>, Error> {
        *self.last_capabilities.lock().await = Some(capabilities.clone());

        if let Some(message) = &self.connect_failure {
            return Err(Error::webdriver("session not created", message.clone()));
        }
        if capabilities.platform().is_none() {
            return Err(Error::webdriver(
                "session not created",
                "platformName capability is missing or unknown",
            ));
        }

        self.stats.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(MockDriver::with_stats(
            self.journey.clone(),
            Arc::clone(&self.stats),
            self.reject_timeouts,
        )))
    }
}

#[async_trait]
impl DriverConnector for MockConnector {
    async fn connect(
        &self,
        _endpoint: &str,
        capabilities: &Capabilities,
    ) -> Result<Arc<dyn AutomationDriver>, Error> {
        let driver: Arc<dyn AutomationDriver> = self.open(capabilities).await?;
        Ok(driver)
    }
}
