//! Automation driver traits
//!
//! This module defines the abstract interfaces for talking to a device-automation server.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use super::capabilities::Capabilities;
use super::locator::Locator;

/// Reference to a UI element inside an automation session
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementHandle {
    id: String,
}

impl ElementHandle {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self { id: id.into() }
    }

    /// Server-side element id
    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Screen point in device pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Window geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl WindowRect {
    pub fn center(&self) -> Point {
        Point {
            x: self.x + self.width / 2.0,
            y: self.y + self.height / 2.0,
        }
    }
}

/// Single-finger touch swipe
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Swipe {
    pub from: Point,
    pub to: Point,
    /// Duration of the finger movement
    pub duration: Duration,
}

impl Swipe {
    /// Vertical content offset produced by the swipe (positive scrolls content down the list)
    pub fn content_offset(&self) -> f64 {
        self.from.y - self.to.y
    }
}

/// Automation driver trait
///
/// One live session on the automation server.
#[async_trait]
pub trait AutomationDriver: Send + Sync + std::fmt::Debug {
    /// Get session ID
    fn session_id(&self) -> &str;

    /// Find the first element matching a locator
    async fn find_element(&self, locator: &Locator) -> Result<ElementHandle, crate::Error>;

    /// Find every element matching a locator (empty when none match)
    async fn find_elements(&self, locator: &Locator) -> Result<Vec<ElementHandle>, crate::Error>;

    /// Click element
    async fn click(&self, element: &ElementHandle) -> Result<(), crate::Error>;

    /// Clear an editable element
    async fn clear(&self, element: &ElementHandle) -> Result<(), crate::Error>;

    /// Type text into element
    async fn send_keys(&self, element: &ElementHandle, text: &str) -> Result<(), crate::Error>;

    /// Get element text
    async fn text(&self, element: &ElementHandle) -> Result<String, crate::Error>;

    /// Get element attribute
    async fn attribute(&self, element: &ElementHandle, name: &str) -> Result<Option<String>, crate::Error>;

    /// Check if element is displayed
    async fn is_displayed(&self, element: &ElementHandle) -> Result<bool, crate::Error>;

    /// Check if element is enabled
    async fn is_enabled(&self, element: &ElementHandle) -> Result<bool, crate::Error>;

    /// Full rendered UI hierarchy
    async fn page_source(&self) -> Result<String, crate::Error>;

    /// Current screen title
    async fn title(&self) -> Result<String, crate::Error>;

    /// Window geometry
    async fn window_rect(&self) -> Result<WindowRect, crate::Error>;

    /// Perform a touch swipe
    async fn swipe(&self, swipe: Swipe) -> Result<(), crate::Error>;

    /// Set the implicit element-lookup timeout
    async fn set_implicit_wait(&self, timeout: Duration) -> Result<(), crate::Error>;

    /// Capture a PNG screenshot
    async fn screenshot(&self) -> Result<Vec<u8>, crate::Error>;

    /// End the session
    async fn quit(&self) -> Result<(), crate::Error>;
}

/// Driver connector trait
///
/// Opens new sessions on an automation server.
#[async_trait]
pub trait DriverConnector: Send + Sync + std::fmt::Debug {
    /// Open a session at `endpoint` with the given capabilities
    async fn connect(
        &self,
        endpoint: &str,
        capabilities: &Capabilities,
    ) -> Result<Arc<dyn AutomationDriver>, crate::Error>;
}
