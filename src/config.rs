//! Configuration management for saucedemo-e2e

use crate::{Error, Result};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Automation server and wait settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppiumConfig {
    /// Base URL of the automation server
    pub server_url: String,

    /// Path prefix of the WebDriver endpoints
    pub server_path: String,

    /// Implicit wait applied to every session, in seconds
    pub implicit_wait_secs: u64,

    /// Upper bound of explicit waits, in seconds
    pub explicit_wait_secs: u64,

    /// Polling interval of explicit waits, in milliseconds
    pub poll_interval_ms: u64,

    /// Idle time after which the server drops the session, in seconds
    pub new_command_timeout_secs: u64,
}

impl Default for AppiumConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:4723".to_string(),
            server_path: "/wd/hub".to_string(),
            implicit_wait_secs: 10,
            explicit_wait_secs: 20,
            poll_interval_ms: 500,
            new_command_timeout_secs: 300,
        }
    }
}

impl AppiumConfig {
    /// Full WebDriver endpoint (`server_url` + `server_path`)
    pub fn endpoint(&self) -> String {
        let base = self.server_url.trim_end_matches('/');
        let path = self.server_path.trim_matches('/');
        if path.is_empty() {
            base.to_string()
        } else {
            format!("{}/{}", base, path)
        }
    }

    pub fn implicit_wait(&self) -> Duration {
        Duration::from_secs(self.implicit_wait_secs)
    }

    pub fn explicit_wait(&self) -> Duration {
        Duration::from_secs(self.explicit_wait_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Device and application identifiers for one platform
#[derive(Debug, Clone)]
pub struct DeviceProfile {
    pub device_name: String,
    pub platform_version: String,
    /// Path to the app binary; when unset the installed app is launched
    pub app: Option<String>,
    pub app_package: Option<String>,
    pub app_activity: Option<String>,
}

impl DeviceProfile {
    pub fn android() -> Self {
        Self {
            device_name: "sdk_gphone64_x86_64".to_string(),
            platform_version: "16".to_string(),
            app: None,
            app_package: Some("com.saucelabs.mydemoapp.android".to_string()),
            app_activity: Some(
                "com.saucelabs.mydemoapp.android.view.activities.SplashActivity".to_string(),
            ),
        }
    }

    pub fn ios() -> Self {
        Self {
            device_name: "iPhone Simulator".to_string(),
            platform_version: "15.0".to_string(),
            app: None,
            app_package: None,
            app_activity: None,
        }
    }

    fn merged(mut self, section: DeviceSection) -> Self {
        if let Some(device_name) = section.device_name {
            self.device_name = device_name;
        }
        if let Some(platform_version) = section.platform_version {
            self.platform_version = platform_version;
        }
        if section.app.is_some() {
            self.app = section.app;
        }
        if section.app_package.is_some() {
            self.app_package = section.app_package;
        }
        if section.app_activity.is_some() {
            self.app_activity = section.app_activity;
        }
        self
    }
}

/// `[android]` / `[ios]` file section; keys left out keep the platform default
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DeviceSection {
    device_name: Option<String>,
    platform_version: Option<String>,
    app: Option<String>,
    app_package: Option<String>,
    app_activity: Option<String>,
}

fn android_section<'de, D>(deserializer: D) -> std::result::Result<DeviceProfile, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(DeviceProfile::android().merged(DeviceSection::deserialize(deserializer)?))
}

fn ios_section<'de, D>(deserializer: D) -> std::result::Result<DeviceProfile, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(DeviceProfile::ios().merged(DeviceSection::deserialize(deserializer)?))
}

/// Data the two journeys feed into the app
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JourneyData {
    pub valid_username: String,
    pub valid_password: String,
    pub invalid_username: String,
    pub invalid_password: String,
    /// Product used when a step does not name one
    pub default_product: String,
    /// Validation message expected after continuing an empty checkout form
    pub checkout_error: String,
}

impl Default for JourneyData {
    fn default() -> Self {
        Self {
            valid_username: "bob@example.com".to_string(),
            valid_password: "10203040my".to_string(),
            invalid_username: "invalid_user".to_string(),
            invalid_password: "invalid_password".to_string(),
            default_product: "Sauce Labs Backpack".to_string(),
            checkout_error: "Please provide your full name.".to_string(),
        }
    }
}

/// Automation backend the runner connects to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Remote automation server over HTTP
    #[default]
    Appium,
    /// In-process device simulator
    Simulator,
}

impl FromStr for Backend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "appium" => Ok(Backend::Appium),
            "simulator" => Ok(Backend::Simulator),
            other => Err(Error::configuration(format!("Unknown backend: {}", other))),
        }
    }
}

/// Test runner settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Directory (or single file) with `.feature` files
    pub features: PathBuf,

    /// Tag expression selecting scenarios
    pub tags: String,

    /// Output plugins, e.g. `pretty`, `html:<dir>`, `json:<file>`
    pub plugins: Vec<String>,

    pub backend: Backend,

    pub max_concurrent_scenarios: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            features: PathBuf::from("tests/features"),
            tags: "@reto1 or @reto2".to_string(),
            plugins: vec![
                "pretty".to_string(),
                "html:target/cucumber-reports".to_string(),
                "json:target/cucumber-reports/cucumber.json".to_string(),
            ],
            backend: Backend::Appium,
            max_concurrent_scenarios: 1,
        }
    }
}

/// Suite configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub appium: AppiumConfig,

    /// Platform name, `Android` or `iOS`
    pub platform: String,

    #[serde(deserialize_with = "android_section")]
    pub android: DeviceProfile,

    #[serde(deserialize_with = "ios_section")]
    pub ios: DeviceProfile,

    pub journey: JourneyData,

    pub runner: RunnerConfig,

    /// Log level
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            appium: AppiumConfig::default(),
            platform: "Android".to_string(),
            android: DeviceProfile::android(),
            ios: DeviceProfile::ios(),
            journey: JourneyData::default(),
            runner: RunnerConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Config::default().with_overrides(|key| env::var(key).ok())
    }

    /// Load the file named by `SAUCEDEMO_CONFIG` (if any), then apply environment overrides
    pub fn load() -> Result<Self> {
        let base = match env::var("SAUCEDEMO_CONFIG") {
            Ok(path) => Config::from_file(&path)?,
            Err(_) => Config::default(),
        };
        base.with_overrides(|key| env::var(key).ok())
    }

    /// Load configuration from a file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::configuration(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::configuration(format!("Failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Apply `SAUCEDEMO_*` overrides read through `lookup`
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("SAUCEDEMO_APPIUM_URL") {
            self.appium.server_url = url;
        }

        if let Some(path) = lookup("SAUCEDEMO_APPIUM_PATH") {
            self.appium.server_path = path;
        }

        if let Some(wait) = lookup("SAUCEDEMO_IMPLICIT_WAIT") {
            self.appium.implicit_wait_secs = parse_var("SAUCEDEMO_IMPLICIT_WAIT", &wait)?;
        }

        if let Some(wait) = lookup("SAUCEDEMO_EXPLICIT_WAIT") {
            self.appium.explicit_wait_secs = parse_var("SAUCEDEMO_EXPLICIT_WAIT", &wait)?;
        }

        if let Some(poll) = lookup("SAUCEDEMO_POLL_INTERVAL_MS") {
            self.appium.poll_interval_ms = parse_var("SAUCEDEMO_POLL_INTERVAL_MS", &poll)?;
        }

        if let Some(platform) = lookup("SAUCEDEMO_PLATFORM") {
            self.platform = platform;
        }

        if let Some(device) = lookup("SAUCEDEMO_ANDROID_DEVICE") {
            self.android.device_name = device;
        }

        if let Some(version) = lookup("SAUCEDEMO_ANDROID_OS_VERSION") {
            self.android.platform_version = version;
        }

        if let Some(app) = lookup("SAUCEDEMO_ANDROID_APP") {
            self.android.app = Some(app);
        }

        if let Some(package) = lookup("SAUCEDEMO_ANDROID_PACKAGE") {
            self.android.app_package = Some(package);
        }

        if let Some(activity) = lookup("SAUCEDEMO_ANDROID_ACTIVITY") {
            self.android.app_activity = Some(activity);
        }

        if let Some(device) = lookup("SAUCEDEMO_IOS_DEVICE") {
            self.ios.device_name = device;
        }

        if let Some(version) = lookup("SAUCEDEMO_IOS_OS_VERSION") {
            self.ios.platform_version = version;
        }

        if let Some(app) = lookup("SAUCEDEMO_IOS_APP") {
            self.ios.app = Some(app);
        }

        if let Some(features) = lookup("SAUCEDEMO_FEATURES") {
            self.runner.features = PathBuf::from(features);
        }

        if let Some(tags) = lookup("SAUCEDEMO_TAGS") {
            self.runner.tags = tags;
        }

        if let Some(plugins) = lookup("SAUCEDEMO_PLUGINS") {
            self.runner.plugins = plugins
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect();
        }

        if let Some(backend) = lookup("SAUCEDEMO_BACKEND") {
            self.runner.backend = backend.parse()?;
        }

        if let Some(max) = lookup("SAUCEDEMO_MAX_SCENARIOS") {
            self.runner.max_concurrent_scenarios = parse_var("SAUCEDEMO_MAX_SCENARIOS", &max)?;
        }

        if let Some(user) = lookup("SAUCEDEMO_VALID_USER") {
            self.journey.valid_username = user;
        }

        if let Some(password) = lookup("SAUCEDEMO_VALID_PASSWORD") {
            self.journey.valid_password = password;
        }

        if let Some(log_level) = lookup("SAUCEDEMO_LOG_LEVEL") {
            self.log_level = log_level;
        }

        Ok(self)
    }
}

fn parse_var<T: FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::configuration(format!("Invalid {}", name)))
}
