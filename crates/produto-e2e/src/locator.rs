//! Locator bindings: symbolic element names mapped to selector strategies.
//!
//! A locator carries no behavior of its own. It is resolved against the
//! current page by a [`PageDriver`](crate::driver::PageDriver) every time an
//! action or wait needs the element, so a reload never leaves a page object
//! holding a dead handle.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Selector strategy for locating elements
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Selector {
    /// Element id (e.g., "btn-salvar")
    Id(String),
    /// CSS selector (e.g., "table tbody tr:first-child")
    Css(String),
}

impl Selector {
    /// Create an id selector
    #[must_use]
    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Render as a CSS selector string
    #[must_use]
    pub fn to_css(&self) -> String {
        match self {
            Self::Id(id) => format!("#{id}"),
            Self::Css(css) => css.clone(),
        }
    }

    /// Convert to a JavaScript expression evaluating to the element (or null)
    #[must_use]
    pub fn to_query(&self) -> String {
        match self {
            Self::Id(id) => format!("document.getElementById({id:?})"),
            Self::Css(css) => format!("document.querySelector({css:?})"),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

/// A named selector bound to one element of a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    name: &'static str,
    selector: Selector,
}

impl Locator {
    /// Bind a symbolic name to a selector
    #[must_use]
    pub const fn new(name: &'static str, selector: Selector) -> Self {
        Self { name, selector }
    }

    /// Shorthand for an id-bound locator
    #[must_use]
    pub fn by_id(name: &'static str, id: impl Into<String>) -> Self {
        Self::new(name, Selector::id(id))
    }

    /// Shorthand for a CSS-bound locator
    #[must_use]
    pub fn by_css(name: &'static str, css: impl Into<String>) -> Self {
        Self::new(name, Selector::css(css))
    }

    /// Symbolic name (used in logs and error messages)
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// The selector
    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.selector)
    }
}
