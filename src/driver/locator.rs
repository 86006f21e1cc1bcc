//! Element locators

use serde_json::{json, Value};
use std::borrow::Cow;
use std::fmt;

/// Element location strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Platform resource id (`resource-id` on Android)
    Id,
    /// XPath over the rendered hierarchy
    XPath,
    /// Accessibility label (`content-desc` on Android)
    AccessibilityId,
    /// Native widget class
    ClassName,
}

impl Strategy {
    /// Strategy name on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Id => "id",
            Strategy::XPath => "xpath",
            Strategy::AccessibilityId => "accessibility id",
            Strategy::ClassName => "class name",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "id" => Some(Strategy::Id),
            "xpath" => Some(Strategy::XPath),
            "accessibility id" => Some(Strategy::AccessibilityId),
            "class name" => Some(Strategy::ClassName),
            _ => None,
        }
    }
}

/// Immutable identifier of a logical UI element
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator {
    strategy: Strategy,
    value: Cow<'static, str>,
}

impl Locator {
    pub const fn id(value: &'static str) -> Self {
        Self {
            strategy: Strategy::Id,
            value: Cow::Borrowed(value),
        }
    }

    pub const fn accessibility_id(value: &'static str) -> Self {
        Self {
            strategy: Strategy::AccessibilityId,
            value: Cow::Borrowed(value),
        }
    }

    pub const fn class_name(value: &'static str) -> Self {
        Self {
            strategy: Strategy::ClassName,
            value: Cow::Borrowed(value),
        }
    }

    pub fn xpath<S: Into<Cow<'static, str>>>(value: S) -> Self {
        Self {
            strategy: Strategy::XPath,
            value: value.into(),
        }
    }

    /// Build a locator from wire values
    pub fn from_parts<S: Into<String>>(strategy: Strategy, value: S) -> Self {
        Self {
            strategy,
            value: Cow::Owned(value.into()),
        }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Request body for `POST /element(s)`
    pub fn to_wire(&self) -> Value {
        json!({
            "using": self.strategy.as_str(),
            "value": self.value(),
        })
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.strategy.as_str(), self.value)
    }
}

/// Quote `text` as an XPath 1.0 string literal
pub fn xpath_literal(text: &str) -> String {
    if !text.contains('\'') {
        format!("'{}'", text)
    } else if !text.contains('"') {
        format!("\"{}\"", text)
    } else {
        let parts: Vec<String> = text.split('\'').map(|p| format!("'{}'", p)).collect();
        format!("concat({})", parts.join(", \"'\", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USERNAME: Locator = Locator::id("com.saucelabs.mydemoapp.android:id/nameET");

    #[test]
    fn test_const_locator() {
        assert_eq!(USERNAME.strategy(), Strategy::Id);
        assert_eq!(USERNAME.to_string(), "id=com.saucelabs.mydemoapp.android:id/nameET");
        assert_eq!(
            USERNAME.to_wire(),
            json!({"using": "id", "value": "com.saucelabs.mydemoapp.android:id/nameET"})
        );
    }

    #[test]
    fn test_strategy_names_round_trip() {
        for s in [Strategy::Id, Strategy::XPath, Strategy::AccessibilityId, Strategy::ClassName] {
            assert_eq!(Strategy::parse(s.as_str()), Some(s));
        }
        assert_eq!(Strategy::parse("css selector"), None);
    }

    #[test]
    fn test_xpath_literal_quoting() {
        assert_eq!(xpath_literal("Sauce Labs Backpack"), "'Sauce Labs Backpack'");
        assert_eq!(xpath_literal("Bob's Bag"), "\"Bob's Bag\"");
        assert_eq!(
            xpath_literal(r#"a'b"c"#),
            r#"concat('a', "'", 'b"c')"#
        );
    }
}
