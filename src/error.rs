//! Unified error types for saucedemo-e2e

use thiserror::Error;

/// Unified Result type
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for saucedemo-e2e
#[derive(Error, Debug)]
pub enum Error {
    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Error reported by the automation server
    #[error("WebDriver error [{code}]: {message}")]
    WebDriver { code: String, message: String },

    /// Unknown or deleted automation session
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// No element matched a locator
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// Element reference no longer attached to the UI
    #[error("Stale element reference: {0}")]
    StaleElement(String),

    /// Locator the backend cannot evaluate
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    /// Platform name outside Android/iOS
    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    /// Opening the automation session failed
    #[error("Could not create automation session: {0}")]
    SessionCreation(#[source] Box<Error>),

    /// Timeout
    #[error("Operation timeout: {0}")]
    Timeout(String),

    /// A scenario expectation did not hold
    #[error("Assertion failed: {0}")]
    Assertion(String),

    /// The expected error label never appeared
    #[error("Error message '{expected}' did not appear. Current message: '{actual}'")]
    ErrorMessageMissing { expected: String, actual: String },

    /// The error label appeared with different text
    #[error("Error message does not contain the expected text. Expected: '{expected}', actual: '{actual}'")]
    ErrorMessageMismatch { expected: String, actual: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new WebDriver protocol error
    pub fn webdriver<C: Into<String>, M: Into<String>>(code: C, message: M) -> Self {
        Error::WebDriver {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Create a new session not found error
    pub fn session_not_found<S: Into<String>>(id: S) -> Self {
        Error::SessionNotFound(id.into())
    }

    /// Create a new element not found error
    pub fn element_not_found<S: Into<String>>(what: S) -> Self {
        Error::ElementNotFound(what.into())
    }

    /// Create a new stale element error
    pub fn stale_element<S: Into<String>>(id: S) -> Self {
        Error::StaleElement(id.into())
    }

    /// Create a new invalid selector error
    pub fn invalid_selector<S: Into<String>>(msg: S) -> Self {
        Error::InvalidSelector(msg.into())
    }

    /// Create a new unsupported platform error
    pub fn unsupported_platform<S: Into<String>>(name: S) -> Self {
        Error::UnsupportedPlatform(name.into())
    }

    /// Wrap a failure raised while opening a session
    pub fn session_creation(source: Error) -> Self {
        Error::SessionCreation(Box::new(source))
    }

    /// Create a new timeout error
    pub fn timeout<S: Into<String>>(msg: S) -> Self {
        Error::Timeout(msg.into())
    }

    /// Create a new assertion error
    pub fn assertion<S: Into<String>>(msg: S) -> Self {
        Error::Assertion(msg.into())
    }

    /// Create a new configuration error
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Error::Configuration(msg.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Error::Internal(msg.into())
    }

    /// Whether an element lookup may still succeed on a later poll
    pub fn is_transient_lookup(&self) -> bool {
        matches!(self, Error::ElementNotFound(_) | Error::StaleElement(_))
    }

    /// W3C error code for this error, as an automation server would report it
    pub fn w3c_code(&self) -> &str {
        match self {
            Error::WebDriver { code, .. } => code,
            Error::SessionNotFound(_) => "invalid session id",
            Error::ElementNotFound(_) => "no such element",
            Error::StaleElement(_) => "stale element reference",
            Error::InvalidSelector(_) => "invalid selector",
            Error::Timeout(_) => "timeout",
            Error::UnsupportedPlatform(_) | Error::Configuration(_) => "invalid argument",
            Error::SessionCreation(_) => "session not created",
            _ => "unknown error",
        }
    }

    /// Map a W3C error code from a server response back onto a typed error
    pub fn from_w3c(code: &str, message: &str) -> Self {
        match code {
            "no such element" => Error::element_not_found(message),
            "stale element reference" => Error::stale_element(message),
            "invalid session id" => Error::session_not_found(message),
            "invalid selector" => Error::invalid_selector(message),
            "timeout" => Error::timeout(message),
            _ => Error::webdriver(code, message),
        }
    }
}
