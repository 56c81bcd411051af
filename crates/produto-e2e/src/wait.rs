//! Explicit waits.
//!
//! A wait is a bounded polling loop: probe the page, sleep for the poll
//! interval, probe again, until the condition holds or the deadline passes.
//! Missing or stale elements count as "not yet"; every other driver error
//! aborts the wait immediately.
//!
//! Time is read from `tokio::time`, so tests can run waits under a paused
//! clock.

use crate::driver::PageDriver;
use crate::locator::{Locator, Selector};
use crate::result::{E2eError, E2eResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, trace};

/// Default timeout for wait operations (10 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 10_000;

/// Default polling interval (100ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Check the options describe a usable wait
    pub fn validate(&self) -> E2eResult<()> {
        if self.timeout_ms == 0 {
            return Err(E2eError::config("wait timeout_ms must be greater than zero"));
        }
        if self.poll_interval_ms == 0 {
            return Err(E2eError::config(
                "wait poll_interval_ms must be greater than zero",
            ));
        }
        if self.poll_interval_ms > self.timeout_ms {
            return Err(E2eError::config(format!(
                "wait poll_interval_ms ({}) exceeds timeout_ms ({})",
                self.poll_interval_ms, self.timeout_ms
            )));
        }
        Ok(())
    }
}

/// Element conditions an explicit wait can block on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// Selector resolves to an element
    Present,
    /// Element is present and displayed
    Visible,
    /// Element is displayed and enabled
    Clickable,
    /// Element is absent or not displayed
    Invisible,
    /// Attribute (or DOM property) contains a substring
    AttributeContains {
        /// Attribute name (e.g., "class")
        name: String,
        /// Substring to look for
        value: String,
    },
}

impl Condition {
    /// Attribute-contains condition
    #[must_use]
    pub fn attribute_contains(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::AttributeContains {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Evaluate the condition once against the current page
    pub async fn is_met<D: PageDriver + ?Sized>(
        &self,
        driver: &D,
        selector: &Selector,
    ) -> E2eResult<bool> {
        match self {
            Self::Present => Ok(driver.probe(selector).await?.is_some()),
            Self::Visible => Ok(driver
                .probe(selector)
                .await?
                .is_some_and(|state| state.displayed)),
            Self::Clickable => Ok(driver
                .probe(selector)
                .await?
                .is_some_and(|state| state.is_clickable())),
            Self::Invisible => Ok(driver
                .probe(selector)
                .await?
                .map_or(true, |state| !state.displayed)),
            Self::AttributeContains { name, value } => Ok(driver
                .attribute(selector, name)
                .await?
                .is_some_and(|actual| actual.contains(value.as_str()))),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Present => f.write_str("present"),
            Self::Visible => f.write_str("visible"),
            Self::Clickable => f.write_str("clickable"),
            Self::Invisible => f.write_str("invisible"),
            Self::AttributeContains { name, value } => {
                write!(f, "{name} containing {value:?}")
            }
        }
    }
}

/// Result of a wait operation
#[derive(Debug, Clone)]
pub struct WaitResult {
    /// Time spent waiting
    pub elapsed: Duration,
    /// Description of what was waited for
    pub waited_for: String,
    /// Number of probes issued
    pub polls: u32,
}

/// Waiter for synchronization operations
#[derive(Debug, Clone, Copy, Default)]
pub struct Waiter {
    options: WaitOptions,
}

impl Waiter {
    /// Create a waiter with the given options
    #[must_use]
    pub const fn new(options: WaitOptions) -> Self {
        Self { options }
    }

    /// The options this waiter polls with
    #[must_use]
    pub const fn options(&self) -> &WaitOptions {
        &self.options
    }

    /// Block until `target` satisfies `condition`
    ///
    /// `step` names the action the wait belongs to; it ends up in the
    /// timeout error.
    pub async fn until<D: PageDriver + ?Sized>(
        &self,
        driver: &D,
        step: &str,
        target: &Locator,
        condition: &Condition,
    ) -> E2eResult<WaitResult> {
        let selector = target.selector();
        let waited_for = format!("{} to be {condition}", target.selector());
        self.poll(step, waited_for, move || condition.is_met(driver, selector))
            .await
    }

    /// Block until the document title contains `needle`
    pub async fn until_title_contains<D: PageDriver + ?Sized>(
        &self,
        driver: &D,
        step: &str,
        needle: &str,
    ) -> E2eResult<WaitResult> {
        let waited_for = format!("title containing {needle:?}");
        self.poll(step, waited_for, move || async move {
            Ok::<bool, E2eError>(driver.title().await?.contains(needle))
        })
        .await
    }

    /// Poll `check` until it returns `true` or the deadline passes
    pub async fn poll<F, Fut>(
        &self,
        step: &str,
        waited_for: String,
        mut check: F,
    ) -> E2eResult<WaitResult>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = E2eResult<bool>>,
    {
        let start = Instant::now();
        let timeout = self.options.timeout();
        let poll_interval = self.options.poll_interval();
        let mut polls = 0_u32;

        loop {
            polls += 1;
            match check().await {
                Ok(true) => {
                    let elapsed = start.elapsed();
                    debug!(step, %waited_for, ?elapsed, polls, "wait satisfied");
                    return Ok(WaitResult {
                        elapsed,
                        waited_for,
                        polls,
                    });
                }
                Ok(false) => {}
                Err(e) if e.is_missing_element() => {
                    trace!(step, error = %e, "element not resolvable yet");
                }
                Err(e) => return Err(e),
            }

            let elapsed = start.elapsed();
            if elapsed >= timeout {
                debug!(step, %waited_for, polls, "wait timed out");
                return Err(E2eError::Timeout {
                    step: step.to_string(),
                    condition: waited_for,
                    ms: self.options.timeout_ms,
                });
            }
            tokio::time::sleep(poll_interval.min(timeout - elapsed)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimConfig, SimulatedApp};

    fn fast() -> WaitOptions {
        WaitOptions::new().with_timeout(2_000).with_poll_interval(10)
    }

    mod options_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let opts = WaitOptions::default();
            assert_eq!(opts.timeout_ms, 10_000);
            assert_eq!(opts.poll_interval_ms, 100);
            assert_eq!(opts.timeout(), Duration::from_secs(10));
            assert!(opts.validate().is_ok());
        }

        #[test]
        fn test_validate_rejects_zero_and_inverted_bounds() {
            assert!(WaitOptions::new().with_timeout(0).validate().is_err());
            assert!(WaitOptions::new().with_poll_interval(0).validate().is_err());
            assert!(WaitOptions::new()
                .with_timeout(50)
                .with_poll_interval(100)
                .validate()
                .is_err());
        }

        #[test]
        fn test_partial_yaml_keeps_defaults() {
            let opts: WaitOptions = serde_yaml_ng::from_str("timeout_ms: 2000").unwrap();
            assert_eq!(opts.timeout_ms, 2000);
            assert_eq!(opts.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
        }
    }

    mod condition_tests {
        use super::*;

        #[test]
        fn test_display() {
            assert_eq!(Condition::Clickable.to_string(), "clickable");
            assert_eq!(
                Condition::attribute_contains("class", "show").to_string(),
                "class containing \"show\""
            );
        }
    }

    mod waiter_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_until_returns_immediately_when_condition_holds() {
            let app = SimulatedApp::logged_in(SimConfig::default());
            let create = Locator::by_id("create button", "btn-adicionar");

            let result = Waiter::new(fast())
                .until(&app, "reset", &create, &Condition::Clickable)
                .await
                .unwrap();

            assert_eq!(result.polls, 1);
            assert_eq!(result.elapsed, Duration::ZERO);
        }

        #[tokio::test(start_paused = true)]
        async fn test_until_waits_for_modal_fade_in() {
            let app = SimulatedApp::logged_in(SimConfig::default().with_transition_ms(300));
            let create = Locator::by_id("create button", "btn-adicionar");
            let modal = Locator::by_id("modal", "cadastro-produto");
            app.click(create.selector()).await.unwrap();

            let result = Waiter::new(fast())
                .until(
                    &app,
                    "open modal",
                    &modal,
                    &Condition::attribute_contains("class", "show"),
                )
                .await
                .unwrap();

            assert!(result.elapsed >= Duration::from_millis(300));
            assert!(result.polls > 1);
        }

        #[tokio::test(start_paused = true)]
        async fn test_until_times_out_with_configured_bound() {
            let app = SimulatedApp::logged_in(SimConfig::default());
            let ghost = Locator::by_id("ghost", "does-not-exist");

            let err = Waiter::new(fast())
                .until(&app, "look for ghost", &ghost, &Condition::Visible)
                .await
                .unwrap_err();

            match err {
                E2eError::Timeout { step, condition, ms } => {
                    assert_eq!(step, "look for ghost");
                    assert_eq!(condition, "#does-not-exist to be visible");
                    assert_eq!(ms, 2_000);
                }
                other => panic!("expected timeout, got {other:?}"),
            }
        }

        #[tokio::test(start_paused = true)]
        async fn test_invisible_holds_for_absent_element() {
            let app = SimulatedApp::logged_in(SimConfig::default());
            let ghost = Locator::by_id("ghost", "does-not-exist");

            let result = Waiter::new(fast())
                .until(&app, "check", &ghost, &Condition::Invisible)
                .await;

            assert!(result.is_ok());
        }

        #[tokio::test(start_paused = true)]
        async fn test_missing_element_during_attribute_wait_is_not_fatal() {
            let app = SimulatedApp::logged_in(SimConfig::default());
            let ghost = Locator::by_id("ghost", "does-not-exist");

            let err = Waiter::new(fast())
                .until(
                    &app,
                    "check",
                    &ghost,
                    &Condition::attribute_contains("class", "show"),
                )
                .await
                .unwrap_err();

            assert!(err.is_timeout());
        }

        #[tokio::test(start_paused = true)]
        async fn test_poll_propagates_hard_errors() {
            let err = Waiter::new(fast())
                .poll("step", "anything".to_string(), || async {
                    Err::<bool, _>(E2eError::driver("connection reset"))
                })
                .await
                .unwrap_err();

            assert!(matches!(err, E2eError::Driver { .. }));
        }

        #[tokio::test(start_paused = true)]
        async fn test_until_title_contains() {
            let app = SimulatedApp::logged_in(SimConfig::default());

            let result = Waiter::new(fast())
                .until_title_contains(&app, "login", "Controle de Produtos")
                .await;
            assert!(result.is_ok());

            let err = Waiter::new(fast())
                .until_title_contains(&app, "login", "Painel")
                .await
                .unwrap_err();
            assert!(err.is_timeout());
        }
    }
}
