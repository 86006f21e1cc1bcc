//! WebDriver wire types
//!
//! JSON bodies exchanged with a W3C WebDriver (Appium) server.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::traits::{ElementHandle, Swipe, WindowRect};

/// Key under which W3C servers return element references
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

/// Pointer id used for touch gestures
pub const TOUCH_POINTER_ID: &str = "finger1";

/// Response envelope (`{"value": ...}`)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WireResponse {
    /// Command result or error body
    #[serde(default)]
    pub value: Value,
}

impl WireResponse {
    pub fn new(value: Value) -> Self {
        Self { value }
    }

    /// Error body carried by the envelope, if any
    pub fn error(&self) -> Option<WireError> {
        let code = self.value.get("error")?.as_str()?;
        Some(WireError {
            error: code.to_string(),
            message: self
                .value
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        })
    }
}

/// W3C error body
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct WireError {
    /// W3C error code (e.g. "no such element")
    pub error: String,
    pub message: String,
}

/// Result of `POST /session`
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSessionValue {
    pub session_id: String,
    #[serde(default)]
    pub capabilities: Value,
}

/// Timeouts body
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct TimeoutsRequest {
    /// Implicit element-lookup wait in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implicit: Option<u64>,
}

/// `POST /element/{id}/value` body
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SendKeysRequest {
    pub text: String,
}

/// Window rect result
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct RectValue {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl From<RectValue> for WindowRect {
    fn from(rect: RectValue) -> Self {
        WindowRect {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
        }
    }
}

impl From<WindowRect> for RectValue {
    fn from(rect: WindowRect) -> Self {
        RectValue {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
        }
    }
}

/// Element reference as serialized on the wire
pub fn element_to_wire(element: &ElementHandle) -> Value {
    let mut map = serde_json::Map::new();
    map.insert(ELEMENT_KEY.to_string(), Value::String(element.id().to_string()));
    Value::Object(map)
}

/// Extract an element reference from a wire value
pub fn element_from_wire(value: &Value) -> Option<ElementHandle> {
    value
        .get(ELEMENT_KEY)
        .or_else(|| value.get("ELEMENT"))
        .and_then(Value::as_str)
        .map(ElementHandle::new)
}

/// W3C actions body for a single-finger swipe
pub fn swipe_actions(swipe: &Swipe) -> Value {
    serde_json::json!({
        "actions": [{
            "type": "pointer",
            "id": TOUCH_POINTER_ID,
            "parameters": { "pointerType": "touch" },
            "actions": [
                { "type": "pointerMove", "duration": 0, "x": swipe.from.x.round() as i64, "y": swipe.from.y.round() as i64 },
                { "type": "pointerDown", "button": 0 },
                { "type": "pause", "duration": 100 },
                {
                    "type": "pointerMove",
                    "duration": swipe.duration.as_millis() as u64,
                    "origin": "viewport",
                    "x": swipe.to.x.round() as i64,
                    "y": swipe.to.y.round() as i64,
                },
                { "type": "pointerUp", "button": 0 },
            ],
        }]
    })
}

/// Recover a swipe from a W3C actions body produced by [`swipe_actions`]
pub fn swipe_from_actions(body: &Value) -> Option<Swipe> {
    let steps = body
        .pointer("/actions/0/actions")
        .and_then(Value::as_array)?;

    let moves: Vec<&Value> = steps
        .iter()
        .filter(|step| step.get("type").and_then(Value::as_str) == Some("pointerMove"))
        .collect();
    let (first, last) = (moves.first()?, moves.last()?);

    let point = |step: &Value| -> Option<super::traits::Point> {
        Some(super::traits::Point {
            x: step.get("x")?.as_f64()?,
            y: step.get("y")?.as_f64()?,
        })
    };

    Some(Swipe {
        from: point(first)?,
        to: point(last)?,
        duration: std::time::Duration::from_millis(
            last.get("duration").and_then(Value::as_u64).unwrap_or(0),
        ),
    })
}
