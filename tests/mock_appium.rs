//! Mock Appium server
//!
//! Serves the W3C WebDriver HTTP protocol under `/wd/hub` on a random local
//! port, backed by simulator sessions, so the HTTP client can be tested
//! without a device.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use saucedemo_e2e::config::JourneyData;
use saucedemo_e2e::driver::types::{element_to_wire, swipe_from_actions, RectValue};
use saucedemo_e2e::driver::{
    AutomationDriver, Capabilities, ElementHandle, Locator, MockConnector, MockDriver, MockStats,
    Strategy,
};
use saucedemo_e2e::Error;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::RwLock;

/// Error rendered as a W3C error response
struct WireFailure(Error);

impl From<Error> for WireFailure {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for WireFailure {
    fn into_response(self) -> Response {
        let code = self.0.w3c_code().to_string();
        let status = match code.as_str() {
            "no such element" | "stale element reference" | "invalid session id" => StatusCode::NOT_FOUND,
            "invalid selector" | "invalid argument" | "invalid element state"
            | "element not interactable" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = json!({
            "value": {
                "error": code,
                "message": self.0.to_string(),
                "stacktrace": "",
            }
        });
        (status, Json(body)).into_response()
    }
}

type WireResult = Result<Json<Value>, WireFailure>;

fn ok(value: Value) -> WireResult {
    Ok(Json(json!({ "value": value })))
}

#[derive(Clone)]
struct AppiumState {
    connector: MockConnector,
    sessions: Arc<RwLock<HashMap<String, Arc<MockDriver>>>>,
}

impl AppiumState {
    async fn session(&self, id: &str) -> Result<Arc<MockDriver>, WireFailure> {
        self.sessions
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| WireFailure(Error::session_not_found(id)))
    }
}

fn locator_from(body: &Value) -> Result<Locator, WireFailure> {
    let using = body.get("using").and_then(Value::as_str).unwrap_or_default();
    let value = body.get("value").and_then(Value::as_str).unwrap_or_default();
    let strategy = Strategy::parse(using).ok_or_else(|| {
        WireFailure(Error::webdriver(
            "invalid argument",
            format!("Unsupported locator strategy '{}'", using),
        ))
    })?;
    Ok(Locator::from_parts(strategy, value))
}

async fn status() -> WireResult {
    ok(json!({ "ready": true, "message": "mock appium" }))
}

async fn create_session(State(state): State<AppiumState>, Json(body): Json<Value>) -> WireResult {
    let capabilities = Capabilities::from_new_session_body(&body);
    let driver = state.connector.open(&capabilities).await?;
    let session_id = driver.session_id().to_string();
    state
        .sessions
        .write()
        .await
        .insert(session_id.clone(), driver);
    ok(json!({
        "sessionId": session_id,
        "capabilities": body.pointer("/capabilities/alwaysMatch").cloned().unwrap_or(Value::Null),
    }))
}

async fn delete_session(State(state): State<AppiumState>, Path(id): Path<String>) -> WireResult {
    let driver = state.session(&id).await?;
    driver.quit().await?;
    state.sessions.write().await.remove(&id);
    ok(Value::Null)
}

async fn set_timeouts(
    State(state): State<AppiumState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> WireResult {
    let driver = state.session(&id).await?;
    if let Some(ms) = body.get("implicit").and_then(Value::as_u64) {
        driver
            .set_implicit_wait(std::time::Duration::from_millis(ms))
            .await?;
    }
    ok(Value::Null)
}

async fn find_element(
    State(state): State<AppiumState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> WireResult {
    let driver = state.session(&id).await?;
    let element = driver.find_element(&locator_from(&body)?).await?;
    ok(element_to_wire(&element))
}

async fn find_elements(
    State(state): State<AppiumState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> WireResult {
    let driver = state.session(&id).await?;
    let elements = driver.find_elements(&locator_from(&body)?).await?;
    ok(Value::Array(elements.iter().map(element_to_wire).collect()))
}

async fn click(State(state): State<AppiumState>, Path((id, eid)): Path<(String, String)>) -> WireResult {
    state.session(&id).await?.click(&ElementHandle::new(eid)).await?;
    ok(Value::Null)
}

async fn clear(State(state): State<AppiumState>, Path((id, eid)): Path<(String, String)>) -> WireResult {
    state.session(&id).await?.clear(&ElementHandle::new(eid)).await?;
    ok(Value::Null)
}

async fn send_keys(
    State(state): State<AppiumState>,
    Path((id, eid)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> WireResult {
    let text = body.get("text").and_then(Value::as_str).unwrap_or_default();
    state
        .session(&id)
        .await?
        .send_keys(&ElementHandle::new(eid), text)
        .await?;
    ok(Value::Null)
}

async fn text(State(state): State<AppiumState>, Path((id, eid)): Path<(String, String)>) -> WireResult {
    let text = state.session(&id).await?.text(&ElementHandle::new(eid)).await?;
    ok(Value::String(text))
}

async fn attribute(
    State(state): State<AppiumState>,
    Path((id, eid, name)): Path<(String, String, String)>,
) -> WireResult {
    let value = state
        .session(&id)
        .await?
        .attribute(&ElementHandle::new(eid), &name)
        .await?;
    ok(value.map(Value::String).unwrap_or(Value::Null))
}

async fn displayed(State(state): State<AppiumState>, Path((id, eid)): Path<(String, String)>) -> WireResult {
    let shown = state
        .session(&id)
        .await?
        .is_displayed(&ElementHandle::new(eid))
        .await?;
    ok(Value::Bool(shown))
}

async fn enabled(State(state): State<AppiumState>, Path((id, eid)): Path<(String, String)>) -> WireResult {
    let enabled = state
        .session(&id)
        .await?
        .is_enabled(&ElementHandle::new(eid))
        .await?;
    ok(Value::Bool(enabled))
}

async fn source(State(state): State<AppiumState>, Path(id): Path<String>) -> WireResult {
    ok(Value::String(state.session(&id).await?.page_source().await?))
}

async fn title(State(state): State<AppiumState>, Path(id): Path<String>) -> WireResult {
    ok(Value::String(state.session(&id).await?.title().await?))
}

async fn window_rect(State(state): State<AppiumState>, Path(id): Path<String>) -> WireResult {
    let rect = RectValue::from(state.session(&id).await?.window_rect().await?);
    ok(serde_json::to_value(rect).map_err(Error::from)?)
}

async fn screenshot(State(state): State<AppiumState>, Path(id): Path<String>) -> WireResult {
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
    let png = state.session(&id).await?.screenshot().await?;
    ok(Value::String(BASE64.encode(png)))
}

async fn actions(
    State(state): State<AppiumState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> WireResult {
    let driver = state.session(&id).await?;
    let swipe = swipe_from_actions(&body).ok_or_else(|| {
        WireFailure(Error::webdriver("invalid argument", "Only single-finger swipes are supported"))
    })?;
    driver.swipe(swipe).await?;
    ok(Value::Null)
}

fn routes(state: AppiumState) -> Router {
    let hub = Router::new()
        .route("/status", get(status))
        .route("/session", post(create_session))
        .route("/session/:id", axum::routing::delete(delete_session))
        .route("/session/:id/timeouts", post(set_timeouts))
        .route("/session/:id/element", post(find_element))
        .route("/session/:id/elements", post(find_elements))
        .route("/session/:id/element/:eid/click", post(click))
        .route("/session/:id/element/:eid/clear", post(clear))
        .route("/session/:id/element/:eid/value", post(send_keys))
        .route("/session/:id/element/:eid/text", get(text))
        .route("/session/:id/element/:eid/attribute/:name", get(attribute))
        .route("/session/:id/element/:eid/displayed", get(displayed))
        .route("/session/:id/element/:eid/enabled", get(enabled))
        .route("/session/:id/source", get(source))
        .route("/session/:id/title", get(title))
        .route("/session/:id/window/rect", get(window_rect))
        .route("/session/:id/screenshot", get(screenshot))
        .route("/session/:id/actions", post(actions))
        .with_state(state);

    Router::new().nest("/wd/hub", hub)
}

/// Mock Appium server
pub struct MockAppiumServer {
    addr: SocketAddr,
    connector: MockConnector,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl MockAppiumServer {
    /// Start a server with default journey data
    pub async fn start() -> Result<Self, Box<dyn std::error::Error>> {
        Self::start_with(MockConnector::new(JourneyData::default())).await
    }

    /// Start a server whose sessions are opened by `connector`
    pub async fn start_with(connector: MockConnector) -> Result<Self, Box<dyn std::error::Error>> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let app = routes(AppiumState {
            connector: connector.clone(),
            sessions: Arc::new(RwLock::new(HashMap::new())),
        });

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async {
                shutdown_rx.await.ok();
                tracing::info!("Mock Appium: shutdown signal received");
            });
            if let Err(e) = server.await {
                tracing::error!("Mock Appium: server error: {}", e);
            }
        });

        tracing::info!("Mock Appium listening on {}", addr);
        Ok(Self {
            addr,
            connector,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn path(&self) -> &'static str {
        "/wd/hub"
    }

    /// Full WebDriver endpoint
    pub fn endpoint(&self) -> String {
        format!("{}{}", self.url(), self.path())
    }

    pub fn stats(&self) -> Arc<MockStats> {
        self.connector.stats()
    }

    /// Capabilities sent with the most recent new-session request
    pub async fn last_capabilities(&self) -> Option<Capabilities> {
        self.connector.last_capabilities().await
    }

    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockAppiumServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}
