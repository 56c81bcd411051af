//! Result and error types for the product registration suite.

use thiserror::Error;

/// Result type for suite operations
pub type E2eResult<T> = Result<T, E2eError>;

/// Errors that can occur while driving the product registration UI
#[derive(Debug, Error)]
pub enum E2eError {
    /// An explicit wait did not resolve before its deadline
    #[error("{step}: timed out after {ms}ms waiting for {condition}")]
    Timeout {
        /// Step that was waiting (e.g. "click #btn-salvar")
        step: String,
        /// Condition that never became true
        condition: String,
        /// Bound in milliseconds
        ms: u64,
    },

    /// Observed UI state differs from the expected value
    #[error("{context}: expected {expected:?}, got {actual:?}")]
    AssertionFailed {
        /// What was being checked
        context: String,
        /// Expected value
        expected: String,
        /// Observed value
        actual: String,
    },

    /// Selector does not resolve on the current page
    #[error("No element matches {selector}")]
    ElementNotFound {
        /// Selector that was looked up
        selector: String,
    },

    /// Element was resolved but detached from the document before use
    #[error("Element {selector} is no longer attached to the page")]
    StaleElement {
        /// Selector of the detached element
        selector: String,
    },

    /// Element exists but cannot receive the action (hidden, disabled, covered)
    #[error("Element {selector} is not interactable")]
    NotInteractable {
        /// Selector of the element
        selector: String,
    },

    /// Operation called in the wrong page or modal state
    #[error("Invalid state: {message}")]
    InvalidState {
        /// Error message
        message: String,
    },

    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Any other error reported by the underlying driver
    #[error("Driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// Invalid or unreadable configuration
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl E2eError {
    /// Create an assertion failure
    #[must_use]
    pub fn assertion(
        context: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::AssertionFailed {
            context: context.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create an invalid state error
    #[must_use]
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Create a driver error
    #[must_use]
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether the error means the selector did not resolve to a live element.
    ///
    /// Waits treat these as "condition not met yet" instead of failing.
    #[must_use]
    pub const fn is_missing_element(&self) -> bool {
        matches!(self, Self::ElementNotFound { .. } | Self::StaleElement { .. })
    }

    /// Whether the error is a wait timeout
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message_names_step_and_condition() {
        let err = E2eError::Timeout {
            step: "click #btn-adicionar".to_string(),
            condition: "#btn-adicionar to be clickable".to_string(),
            ms: 2000,
        };
        assert_eq!(
            err.to_string(),
            "click #btn-adicionar: timed out after 2000ms waiting for #btn-adicionar to be clickable"
        );
        assert!(err.is_timeout());
        assert!(!err.is_missing_element());
    }

    #[test]
    fn test_assertion_message_shows_expected_and_actual() {
        let err = E2eError::assertion("first row code", "007", "006");
        assert_eq!(
            err.to_string(),
            "first row code: expected \"007\", got \"006\""
        );
    }

    #[test]
    fn test_missing_element_classification() {
        let missing = E2eError::ElementNotFound {
            selector: "#mensagem".to_string(),
        };
        let stale = E2eError::StaleElement {
            selector: "#mensagem".to_string(),
        };
        let hidden = E2eError::NotInteractable {
            selector: "#mensagem".to_string(),
        };
        assert!(missing.is_missing_element());
        assert!(stale.is_missing_element());
        assert!(!hidden.is_missing_element());
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "suite.yaml");
        let err: E2eError = io.into();
        assert!(matches!(err, E2eError::Io(_)));
    }
}
