//! PageDriver - abstract browser automation seam.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │  PageDriver (async trait)                                      │
//! ├───────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────┐        ┌─────────────────────────┐   │
//! │  │  ChromiumDriver     │        │  SimulatedApp           │   │
//! │  │  (feature=browser)  │        │  (always available)     │   │
//! │  │  CDP via            │        │  in-process model of    │   │
//! │  │  chromiumoxide      │        │  the registration page  │   │
//! │  └─────────────────────┘        └─────────────────────────┘   │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! Drivers are deliberately thin: every method resolves the selector anew and
//! performs exactly one primitive. Waiting lives in [`crate::wait`].

use crate::locator::Selector;
use crate::result::E2eResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Snapshot of the properties explicit waits care about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ElementState {
    /// Rendered and not hidden by CSS
    pub displayed: bool,
    /// Not disabled
    pub enabled: bool,
}

impl ElementState {
    /// A displayed and enabled element
    pub const INTERACTIVE: Self = Self {
        displayed: true,
        enabled: true,
    };

    /// A present but hidden element
    pub const HIDDEN: Self = Self {
        displayed: false,
        enabled: true,
    };

    /// Selenium-style clickability: displayed and enabled
    #[must_use]
    pub const fn is_clickable(&self) -> bool {
        self.displayed && self.enabled
    }
}

/// Special keys the suite sends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Tab (moves focus, fires blur on the current field)
    Tab,
    /// Enter
    Enter,
}

impl Key {
    /// DOM key name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Tab => "Tab",
            Self::Enter => "Enter",
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Abstract driver trait for browser automation
///
/// Methods taking a selector return [`E2eError::ElementNotFound`] when the
/// selector does not resolve, except [`probe`](Self::probe) which reports
/// absence as `Ok(None)`.
///
/// [`E2eError::ElementNotFound`]: crate::E2eError::ElementNotFound
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate to URL
    async fn navigate(&self, url: &str) -> E2eResult<()>;

    /// Reload the current page (client-side state is reset)
    async fn reload(&self) -> E2eResult<()>;

    /// Current document title
    async fn title(&self) -> E2eResult<String>;

    /// Look up an element and report its state, `None` when absent
    async fn probe(&self, selector: &Selector) -> E2eResult<Option<ElementState>>;

    /// Click element
    async fn click(&self, selector: &Selector) -> E2eResult<()>;

    /// Clear the value of an input
    async fn clear(&self, selector: &Selector) -> E2eResult<()>;

    /// Type text into element
    async fn send_keys(&self, selector: &Selector, text: &str) -> E2eResult<()>;

    /// Press a special key while the element has focus
    async fn press_key(&self, selector: &Selector, key: Key) -> E2eResult<()>;

    /// Rendered text of the element
    async fn text(&self, selector: &Selector) -> E2eResult<String>;

    /// Attribute value, falling back to the DOM property of the same name
    /// (so `innerHTML` works like it does in WebDriver)
    async fn attribute(&self, selector: &Selector, name: &str) -> E2eResult<Option<String>>;

    /// Close the browser
    async fn close(&self) -> E2eResult<()>;
}

/// Forward every driver method through a smart pointer
macro_rules! forward_page_driver {
    ($($wrapper:ident),+) => {$(
        #[async_trait]
        impl<D: PageDriver + ?Sized> PageDriver for $wrapper<D> {
            async fn navigate(&self, url: &str) -> E2eResult<()> {
                (**self).navigate(url).await
            }

            async fn reload(&self) -> E2eResult<()> {
                (**self).reload().await
            }

            async fn title(&self) -> E2eResult<String> {
                (**self).title().await
            }

            async fn probe(&self, selector: &Selector) -> E2eResult<Option<ElementState>> {
                (**self).probe(selector).await
            }

            async fn click(&self, selector: &Selector) -> E2eResult<()> {
                (**self).click(selector).await
            }

            async fn clear(&self, selector: &Selector) -> E2eResult<()> {
                (**self).clear(selector).await
            }

            async fn send_keys(&self, selector: &Selector, text: &str) -> E2eResult<()> {
                (**self).send_keys(selector, text).await
            }

            async fn press_key(&self, selector: &Selector, key: Key) -> E2eResult<()> {
                (**self).press_key(selector, key).await
            }

            async fn text(&self, selector: &Selector) -> E2eResult<String> {
                (**self).text(selector).await
            }

            async fn attribute(&self, selector: &Selector, name: &str) -> E2eResult<Option<String>> {
                (**self).attribute(selector, name).await
            }

            async fn close(&self) -> E2eResult<()> {
                (**self).close().await
            }
        }
    )+};
}

// Box for trait objects, Arc for handles shared with a session
forward_page_driver!(Box, Arc);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clickable_requires_displayed_and_enabled() {
        assert!(ElementState::INTERACTIVE.is_clickable());
        assert!(!ElementState::HIDDEN.is_clickable());
        let disabled = ElementState {
            displayed: true,
            enabled: false,
        };
        assert!(!disabled.is_clickable());
    }

    #[test]
    fn test_element_state_from_js_payload() {
        let state: ElementState =
            serde_json::from_str(r#"{"displayed":true,"enabled":false}"#).unwrap();
        assert!(state.displayed);
        assert!(!state.enabled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shared_handle_sees_the_same_page() {
        use crate::sim::{SimConfig, SimulatedApp};

        let app = Arc::new(SimulatedApp::logged_in(SimConfig::default()));
        let handle: Box<dyn PageDriver> = Box::new(Arc::clone(&app));

        handle.reload().await.unwrap();
        handle.close().await.unwrap();

        assert_eq!(app.history().await, vec!["reload", "close"]);
    }

    #[test]
    fn test_key_names() {
        assert_eq!(Key::Tab.to_string(), "Tab");
        assert_eq!(Key::Enter.as_str(), "Enter");
    }
}
