//! Shared model types crossing the port boundary.

use serde::{Deserialize, Serialize};

/// A structural query handed verbatim to the backend's query engine.
///
/// The locator never parses these itself; it only knows which dialect a
/// string belongs to and that the backend answers with nodes in document
/// order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "dialect", content = "expression", rename_all = "snake_case")]
pub enum StructuralQuery {
    /// Selector dialect, e.g. `form.login input[type=submit]`.
    Css(String),
    /// Path dialect, e.g. `//form[@name='login']//input`.
    #[serde(rename = "xpath")]
    XPath(String),
}

impl StructuralQuery {
    pub fn css(expression: impl Into<String>) -> Self {
        Self::Css(expression.into())
    }

    pub fn xpath(expression: impl Into<String>) -> Self {
        Self::XPath(expression.into())
    }

    /// Dialect name, mainly for diagnostics.
    pub fn dialect(&self) -> &'static str {
        match self {
            Self::Css(_) => "css",
            Self::XPath(_) => "xpath",
        }
    }

    /// The raw query text.
    pub fn expression(&self) -> &str {
        match self {
            Self::Css(expression) | Self::XPath(expression) => expression,
        }
    }
}

impl std::fmt::Display for StructuralQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.dialect(), self.expression())
    }
}
