//! WebDriver HTTP client
//!
//! Implements [`AutomationDriver`] over the W3C WebDriver wire protocol as
//! spoken by Appium.

use super::locator::Locator;
use super::traits::*;
use super::types::*;
use crate::Error;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use reqwest::Method;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// WebDriver client bound to one remote session
#[derive(Debug, Clone)]
pub struct WebDriverClient {
    /// Shared HTTP client
    http: reqwest::Client,
    /// Server endpoint, e.g. `http://localhost:4723/wd/hub`
    endpoint: String,
    /// Remote session id
    session_id: String,
}

impl WebDriverClient {
    /// Attach to an existing session
    ///
    /// # Arguments
    /// * `http` - HTTP client used for every command
    /// * `endpoint` - server endpoint the session lives on
    /// * `session_id` - id returned by `POST /session`
    pub fn new(http: reqwest::Client, endpoint: &str, session_id: String) -> Self {
        info!("Attaching WebDriver client to session {}", session_id);
        Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            session_id,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send one command and unwrap the `value` of its response
    pub(crate) async fn execute(
        http: &reqwest::Client,
        method: Method,
        url: &str,
        body: Option<Value>,
    ) -> Result<Value, Error> {
        debug!("{} {}", method, url);

        let mut request = http.request(method, url);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        let envelope: WireResponse = if text.trim().is_empty() {
            WireResponse::new(Value::Null)
        } else {
            serde_json::from_str(&text)?
        };

        if let Some(err) = envelope.error() {
            debug!("Server returned error '{}': {}", err.error, err.message);
            return Err(Error::from_w3c(&err.error, &err.message));
        }

        if !status.is_success() {
            return Err(Error::webdriver(
                "unknown error",
                format!("HTTP {} without error body", status),
            ));
        }

        Ok(envelope.value)
    }

    /// Send a session-scoped command
    async fn command(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value, Error> {
        let url = if path.is_empty() {
            format!("{}/session/{}", self.endpoint, self.session_id)
        } else {
            format!("{}/session/{}/{}", self.endpoint, self.session_id, path)
        };
        Self::execute(&self.http, method, &url, body).await
    }

    async fn element_command(
        &self,
        method: Method,
        element: &ElementHandle,
        action: &str,
        body: Option<Value>,
    ) -> Result<Value, Error> {
        self.command(method, &format!("element/{}/{}", element.id(), action), body)
            .await
    }

    fn expect_bool(value: Value, what: &str) -> Result<bool, Error> {
        value
            .as_bool()
            .ok_or_else(|| Error::internal(format!("Expected boolean for {}, got {}", what, value)))
    }

    fn expect_string(value: Value, what: &str) -> Result<String, Error> {
        match value {
            Value::String(s) => Ok(s),
            Value::Null => Ok(String::new()),
            other => Err(Error::internal(format!("Expected string for {}, got {}", what, other))),
        }
    }
}

#[async_trait]
impl AutomationDriver for WebDriverClient {
    fn session_id(&self) -> &str {
        &self.session_id
    }

    #[instrument(skip(self), fields(session = %self.session_id))]
    async fn find_element(&self, locator: &Locator) -> Result<ElementHandle, Error> {
        let value = self
            .command(Method::POST, "element", Some(locator.to_wire()))
            .await?;
        element_from_wire(&value)
            .ok_or_else(|| Error::internal(format!("Malformed element reference for {}", locator)))
    }

    #[instrument(skip(self), fields(session = %self.session_id))]
    async fn find_elements(&self, locator: &Locator) -> Result<Vec<ElementHandle>, Error> {
        let value = self
            .command(Method::POST, "elements", Some(locator.to_wire()))
            .await?;
        let items = value.as_array().cloned().unwrap_or_default();
        debug!("{} matched {} elements", locator, items.len());
        Ok(items.iter().filter_map(element_from_wire).collect())
    }

    async fn click(&self, element: &ElementHandle) -> Result<(), Error> {
        self.element_command(Method::POST, element, "click", Some(json!({})))
            .await?;
        Ok(())
    }

    async fn clear(&self, element: &ElementHandle) -> Result<(), Error> {
        self.element_command(Method::POST, element, "clear", Some(json!({})))
            .await?;
        Ok(())
    }

    async fn send_keys(&self, element: &ElementHandle, text: &str) -> Result<(), Error> {
        let body = serde_json::to_value(SendKeysRequest {
            text: text.to_string(),
        })?;
        self.element_command(Method::POST, element, "value", Some(body))
            .await?;
        Ok(())
    }

    async fn text(&self, element: &ElementHandle) -> Result<String, Error> {
        let value = self.element_command(Method::GET, element, "text", None).await?;
        Self::expect_string(value, "element text")
    }

    async fn attribute(&self, element: &ElementHandle, name: &str) -> Result<Option<String>, Error> {
        let value = self
            .element_command(Method::GET, element, &format!("attribute/{}", name), None)
            .await?;
        Ok(match value {
            Value::Null => None,
            Value::String(s) => Some(s),
            other => Some(other.to_string()),
        })
    }

    async fn is_displayed(&self, element: &ElementHandle) -> Result<bool, Error> {
        let value = self
            .element_command(Method::GET, element, "displayed", None)
            .await?;
        Self::expect_bool(value, "displayed")
    }

    async fn is_enabled(&self, element: &ElementHandle) -> Result<bool, Error> {
        let value = self
            .element_command(Method::GET, element, "enabled", None)
            .await?;
        Self::expect_bool(value, "enabled")
    }

    async fn page_source(&self) -> Result<String, Error> {
        let value = self.command(Method::GET, "source", None).await?;
        Self::expect_string(value, "page source")
    }

    async fn title(&self) -> Result<String, Error> {
        let value = self.command(Method::GET, "title", None).await?;
        Self::expect_string(value, "title")
    }

    async fn window_rect(&self) -> Result<WindowRect, Error> {
        let value = self.command(Method::GET, "window/rect", None).await?;
        let rect: RectValue = serde_json::from_value(value)?;
        Ok(rect.into())
    }

    async fn swipe(&self, swipe: Swipe) -> Result<(), Error> {
        debug!("Swiping from {:?} to {:?}", swipe.from, swipe.to);
        self.command(Method::POST, "actions", Some(swipe_actions(&swipe)))
            .await?;
        Ok(())
    }

    async fn set_implicit_wait(&self, timeout: Duration) -> Result<(), Error> {
        let body = serde_json::to_value(TimeoutsRequest {
            implicit: Some(timeout.as_millis() as u64),
        })?;
        self.command(Method::POST, "timeouts", Some(body)).await?;
        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>, Error> {
        let value = self.command(Method::GET, "screenshot", None).await?;
        let encoded = Self::expect_string(value, "screenshot")?;
        BASE64
            .decode(encoded.as_bytes())
            .map_err(|e| Error::internal(format!("Invalid screenshot data: {}", e)))
    }

    async fn quit(&self) -> Result<(), Error> {
        info!("Deleting session {}", self.session_id);
        self.command(Method::DELETE, "", None).await?;
        Ok(())
    }
}
