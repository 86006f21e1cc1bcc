//! Wait, act and query primitives shared by every page
//!
//! Waits poll the driver until a condition holds or the explicit wait runs
//! out. Lookups that miss or hit a stale reference are retried; any other
//! driver error ends the wait.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, instrument};

use crate::config::AppiumConfig;
use crate::driver::{AutomationDriver, ElementHandle, Locator, Point, Swipe};
use crate::markup::unescape_markup;
use crate::{Error, Result};

/// Vertical finger travel of one scroll gesture, in pixels
pub const SCROLL_DISTANCE: f64 = 500.0;

/// Swipes attempted by [`Interaction::scroll_to`] before giving up
pub const DEFAULT_MAX_SWIPES: usize = 5;

const SWIPE_DURATION: Duration = Duration::from_millis(300);

/// Cap on explicit waits too long to represent as a deadline
const MAX_DEADLINE: Duration = Duration::from_secs(24 * 60 * 60);

/// Outcome of a single lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presence {
    Present(ElementHandle),
    Absent,
}

impl Presence {
    pub fn is_present(&self) -> bool {
        matches!(self, Presence::Present(_))
    }

    pub fn element(&self) -> Option<&ElementHandle> {
        match self {
            Presence::Present(element) => Some(element),
            Presence::Absent => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Condition {
    Visible,
    Clickable,
    Invisible,
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Condition::Visible => "visible",
            Condition::Clickable => "clickable",
            Condition::Invisible => "invisible",
        })
    }
}

enum Check {
    Met(Option<ElementHandle>),
    Pending,
}

/// Interaction primitives over one automation session
#[derive(Debug, Clone)]
pub struct Interaction {
    driver: Arc<dyn AutomationDriver>,
    explicit_wait: Duration,
    poll_interval: Duration,
}

impl Interaction {
    pub fn new(driver: Arc<dyn AutomationDriver>, explicit_wait: Duration, poll_interval: Duration) -> Self {
        Self {
            driver,
            explicit_wait,
            poll_interval,
        }
    }

    /// Use the explicit wait and polling interval from configuration
    pub fn from_config(driver: Arc<dyn AutomationDriver>, appium: &AppiumConfig) -> Self {
        Self::new(driver, appium.explicit_wait(), appium.poll_interval())
    }

    pub fn driver(&self) -> &Arc<dyn AutomationDriver> {
        &self.driver
    }

    pub fn explicit_wait(&self) -> Duration {
        self.explicit_wait
    }

    async fn check(&self, locator: &Locator, condition: Condition) -> Result<Check> {
        match condition {
            Condition::Visible => {
                let element = self.driver.find_element(locator).await?;
                if self.driver.is_displayed(&element).await? {
                    return Ok(Check::Met(Some(element)));
                }
            }
            Condition::Clickable => {
                let element = self.driver.find_element(locator).await?;
                if self.driver.is_displayed(&element).await? && self.driver.is_enabled(&element).await? {
                    return Ok(Check::Met(Some(element)));
                }
            }
            Condition::Invisible => {
                for element in self.driver.find_elements(locator).await? {
                    match self.driver.is_displayed(&element).await {
                        Ok(true) => return Ok(Check::Pending),
                        Ok(false) => {}
                        Err(e) if e.is_transient_lookup() => {}
                        Err(e) => return Err(e),
                    }
                }
                return Ok(Check::Met(None));
            }
        }
        Ok(Check::Pending)
    }

    async fn wait_for(&self, locator: &Locator, condition: Condition) -> Result<Option<ElementHandle>> {
        let started = Instant::now();
        let deadline = started
            .checked_add(self.explicit_wait)
            .unwrap_or_else(|| started + MAX_DEADLINE);
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            match self.check(locator, condition).await {
                Ok(Check::Met(element)) => {
                    debug!("{} became {} after {} attempts", locator, condition, attempts);
                    return Ok(element);
                }
                Ok(Check::Pending) => {}
                Err(e) if e.is_transient_lookup() => {
                    debug!("Attempt {} for {}: {}", attempts, locator, e);
                }
                Err(e) => return Err(e),
            }

            let next_poll = Instant::now().checked_add(self.poll_interval);
            if next_poll.map_or(true, |next| next > deadline) {
                return Err(Error::timeout(format!(
                    "{} not {} within {:?}",
                    locator, condition, self.explicit_wait
                )));
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Wait until the element exists and is displayed
    #[instrument(skip_all, fields(locator = %locator))]
    pub async fn wait_for_visible(&self, locator: &Locator) -> Result<ElementHandle> {
        self.wait_for(locator, Condition::Visible)
            .await?
            .ok_or_else(|| Error::element_not_found(locator.to_string()))
    }

    /// Wait until the element is displayed and enabled
    #[instrument(skip_all, fields(locator = %locator))]
    pub async fn wait_for_clickable(&self, locator: &Locator) -> Result<ElementHandle> {
        self.wait_for(locator, Condition::Clickable)
            .await?
            .ok_or_else(|| Error::element_not_found(locator.to_string()))
    }

    /// Wait until no matching element is displayed
    #[instrument(skip_all, fields(locator = %locator))]
    pub async fn wait_for_invisible(&self, locator: &Locator) -> Result<()> {
        self.wait_for(locator, Condition::Invisible).await?;
        Ok(())
    }

    /// Click once the element is clickable
    pub async fn click(&self, locator: &Locator) -> Result<()> {
        debug!("Clicking {}", locator);
        let element = self.wait_for_clickable(locator).await?;
        match self.driver.click(&element).await {
            Err(e) if e.is_transient_lookup() => {
                // Re-rendered between lookup and tap
                let element = self.wait_for_clickable(locator).await?;
                self.driver.click(&element).await
            }
            other => other,
        }
    }

    /// Clear the field, then type `text`
    pub async fn type_into(&self, locator: &Locator, text: &str) -> Result<()> {
        debug!("Typing {} characters into {}", text.chars().count(), locator);
        let element = self.wait_for_visible(locator).await?;
        self.driver.clear(&element).await?;
        self.driver.send_keys(&element, text).await
    }

    pub async fn clear(&self, locator: &Locator) -> Result<()> {
        let element = self.wait_for_visible(locator).await?;
        self.driver.clear(&element).await
    }

    pub async fn read_text(&self, locator: &Locator) -> Result<String> {
        let element = self.wait_for_visible(locator).await?;
        self.driver.text(&element).await
    }

    pub async fn read_attribute(&self, locator: &Locator, name: &str) -> Result<Option<String>> {
        let element = self.wait_for_visible(locator).await?;
        self.driver.attribute(&element, name).await
    }

    /// Text of every match, in screen order; elements that vanish meanwhile are skipped
    pub async fn texts_of(&self, locator: &Locator) -> Result<Vec<String>> {
        let mut texts = Vec::new();
        for element in self.driver.find_elements(locator).await? {
            match self.driver.text(&element).await {
                Ok(text) => texts.push(text),
                Err(e) if e.is_transient_lookup() => debug!("Skipping vanished element: {}", e),
                Err(e) => return Err(e),
            }
        }
        Ok(texts)
    }

    /// Single lookup without explicit waiting
    pub async fn probe(&self, locator: &Locator) -> Presence {
        match self.driver.find_element(locator).await {
            Ok(element) => Presence::Present(element),
            Err(e) => {
                debug!("Probe {}: {}", locator, e);
                Presence::Absent
            }
        }
    }

    pub async fn is_present(&self, locator: &Locator) -> bool {
        self.probe(locator).await.is_present()
    }

    pub async fn is_visible(&self, locator: &Locator) -> bool {
        match self.probe(locator).await {
            Presence::Present(element) => self.driver.is_displayed(&element).await.unwrap_or(false),
            Presence::Absent => false,
        }
    }

    pub async fn is_enabled(&self, locator: &Locator) -> bool {
        match self.probe(locator).await {
            Presence::Present(element) => self.driver.is_enabled(&element).await.unwrap_or(false),
            Presence::Absent => false,
        }
    }

    /// Swipe down until the element is visible, at most `max_swipes` times
    pub async fn scroll_to(&self, locator: &Locator, max_swipes: usize) -> Result<ElementHandle> {
        for swipe in 0..=max_swipes {
            if let Presence::Present(element) = self.probe(locator).await {
                if self.driver.is_displayed(&element).await.unwrap_or(false) {
                    debug!("{} visible after {} swipes", locator, swipe);
                    return Ok(element);
                }
            }
            if swipe < max_swipes {
                self.scroll_down().await?;
            }
        }
        Err(Error::element_not_found(format!(
            "{} not found after {} swipes",
            locator, max_swipes
        )))
    }

    async fn vertical_swipe(&self, offset: f64) -> Result<()> {
        let center = self.driver.window_rect().await?.center();
        let half = offset / 2.0;
        self.driver
            .swipe(Swipe {
                from: Point { x: center.x, y: center.y + half },
                to: Point { x: center.x, y: center.y - half },
                duration: SWIPE_DURATION,
            })
            .await
    }

    /// Move the content towards its end by [`SCROLL_DISTANCE`]
    pub async fn scroll_down(&self) -> Result<()> {
        debug!("Scrolling down");
        self.vertical_swipe(SCROLL_DISTANCE).await
    }

    /// Move the content towards its start by [`SCROLL_DISTANCE`]
    pub async fn scroll_up(&self) -> Result<()> {
        debug!("Scrolling up");
        self.vertical_swipe(-SCROLL_DISTANCE).await
    }

    pub async fn pause(&self, duration: Duration) {
        info!("Pausing for {:?}", duration);
        tokio::time::sleep(duration).await;
    }

    /// Whether `text` occurs anywhere in the rendered hierarchy
    pub async fn contains_text(&self, text: &str) -> bool {
        match self.driver.page_source().await {
            Ok(source) => unescape_markup(&source).contains(text),
            Err(e) => {
                debug!("Page source unavailable: {}", e);
                false
            }
        }
    }

    pub async fn title(&self) -> Result<String> {
        self.driver.title().await
    }
}
