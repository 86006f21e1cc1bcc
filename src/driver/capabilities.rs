//! Session capabilities per platform

use serde_json::{json, Map, Value};
use std::fmt;
use std::str::FromStr;
use tracing::info;

use crate::config::{Config, DeviceProfile};
use crate::Error;

/// Target mobile platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Android,
    Ios,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Android => "Android",
            Platform::Ios => "iOS",
        }
    }

    /// Appium automation engine for this platform
    pub fn automation_name(&self) -> &'static str {
        match self {
            Platform::Android => "UiAutomator2",
            Platform::Ios => "XCUITest",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        if s.eq_ignore_ascii_case("android") {
            Ok(Platform::Android)
        } else if s.eq_ignore_ascii_case("ios") {
            Ok(Platform::Ios)
        } else {
            Err(Error::unsupported_platform(s))
        }
    }
}

/// Desired session capabilities (key/value pairs sent at session creation)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Capabilities {
    entries: Map<String, Value>,
}

impl Capabilities {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the capability set for `platform` from configuration
    pub fn for_platform(platform: Platform, config: &Config) -> Self {
        let mut caps = Capabilities::new();
        caps.set("platformName", platform.as_str());
        caps.set("appium:automationName", platform.automation_name());
        caps.set("appium:newCommandTimeout", config.appium.new_command_timeout_secs);
        caps.set("appium:noReset", false);
        caps.set("appium:autoAcceptAlerts", true);

        match platform {
            Platform::Android => {
                caps.apply_profile(&config.android);
                caps.set("appium:autoGrantPermissions", true);
            }
            Platform::Ios => caps.apply_profile(&config.ios),
        }

        info!("{} capabilities configured", platform);
        caps
    }

    fn apply_profile(&mut self, profile: &DeviceProfile) {
        self.set("appium:deviceName", profile.device_name.as_str());
        self.set("appium:platformVersion", profile.platform_version.as_str());
        if let Some(app) = &profile.app {
            self.set("appium:app", app.as_str());
        }
        if let Some(package) = &profile.app_package {
            self.set("appium:appPackage", package.as_str());
        }
        if let Some(activity) = &profile.app_activity {
            self.set("appium:appActivity", activity.as_str());
        }
    }

    pub fn set<K: Into<String>, V: Into<Value>>(&mut self, key: K, value: V) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Platform named by `platformName`, if any
    pub fn platform(&self) -> Option<Platform> {
        self.get("platformName")
            .and_then(Value::as_str)
            .and_then(|name| name.parse().ok())
    }

    /// New-session request body
    pub fn to_new_session_body(&self) -> Value {
        json!({
            "capabilities": {
                "alwaysMatch": Value::Object(self.entries.clone()),
                "firstMatch": [{}],
            }
        })
    }

    /// Read capabilities back from a new-session request body
    pub fn from_new_session_body(body: &Value) -> Self {
        let entries = body
            .pointer("/capabilities/alwaysMatch")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        Self { entries }
    }
}
