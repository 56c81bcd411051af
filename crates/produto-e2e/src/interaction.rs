//! Interaction layer: raw element actions guarded by explicit waits.
//!
//! Every action first blocks until its precondition holds, then issues the
//! primitive. A UI command and the DOM mutation it triggers are asynchronous;
//! these helpers are where the two are lined up.

use crate::driver::{Key, PageDriver};
use crate::locator::Locator;
use crate::result::E2eResult;
use crate::wait::{Condition, WaitOptions, WaitResult, Waiter};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Settle window granted to a first click before it is repeated
pub const DEFAULT_SETTLE_MS: u64 = 1_000;

/// How a click is dispatched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClickDispatch {
    /// One click
    #[default]
    Single,
    /// Click, and click once more when the expected effect has not shown up
    /// within `settle_ms`.
    ///
    /// Workaround for widgets whose handler is bound twice and swallows the
    /// first click. The target's own state is not consulted: a button under
    /// a modal backdrop still reports itself displayed and enabled.
    Double {
        /// How long the first click gets to take effect
        settle_ms: u64,
    },
}

impl ClickDispatch {
    /// Dispatch policy from the workaround flag
    #[must_use]
    pub const fn from_workaround(enabled: bool, settle_ms: u64) -> Self {
        if enabled {
            Self::Double { settle_ms }
        } else {
            Self::Single
        }
    }
}

/// Wait-then-act helper bound to one driver
#[derive(Debug)]
pub struct Interactor<'d, D: PageDriver + ?Sized> {
    driver: &'d D,
    waiter: Waiter,
}

impl<'d, D: PageDriver + ?Sized> Interactor<'d, D> {
    /// Create an interactor polling with `options`
    #[must_use]
    pub const fn new(driver: &'d D, options: WaitOptions) -> Self {
        Self {
            driver,
            waiter: Waiter::new(options),
        }
    }

    /// The underlying driver
    #[must_use]
    pub const fn driver(&self) -> &'d D {
        self.driver
    }

    /// The waiter used for preconditions
    #[must_use]
    pub const fn waiter(&self) -> &Waiter {
        &self.waiter
    }

    /// Block until `target` satisfies `condition`
    pub async fn wait_for(
        &self,
        step: &str,
        target: &Locator,
        condition: &Condition,
    ) -> E2eResult<WaitResult> {
        self.waiter
            .until(self.driver, step, target, condition)
            .await
    }

    /// Block until the document title contains `needle`
    pub async fn wait_for_title(&self, step: &str, needle: &str) -> E2eResult<WaitResult> {
        self.waiter
            .until_title_contains(self.driver, step, needle)
            .await
    }

    /// Replace the content of an input
    ///
    /// Waits for the field to be clickable, clears it, types `text` and
    /// presses Tab so blur-triggered validation runs. An empty `text`
    /// leaves the field empty.
    pub async fn write(&self, target: &Locator, text: &str) -> E2eResult<()> {
        let step = format!("write {}", target.name());
        self.wait_for(&step, target, &Condition::Clickable).await?;

        let selector = target.selector();
        self.driver.clear(selector).await?;
        if !text.is_empty() {
            self.driver.send_keys(selector, text).await?;
        }
        self.driver.press_key(selector, Key::Tab).await?;
        debug!(field = target.name(), text, "wrote field");
        Ok(())
    }

    /// Click once the target is clickable
    pub async fn click(&self, target: &Locator) -> E2eResult<()> {
        let step = format!("click {}", target.name());
        self.wait_for(&step, target, &Condition::Clickable).await?;
        self.driver.click(target.selector()).await?;
        debug!(target = target.name(), "clicked");
        Ok(())
    }

    /// Block until a click just issued on `target` shows its effect, i.e.
    /// `observed` satisfies `effect`.
    ///
    /// Under [`ClickDispatch::Double`] a click with no visible effect after
    /// the settle window is repeated once before the full wait.
    pub async fn await_click_effect(
        &self,
        step: &str,
        target: &Locator,
        dispatch: ClickDispatch,
        observed: &Locator,
        effect: &Condition,
    ) -> E2eResult<WaitResult> {
        if let ClickDispatch::Double { settle_ms } = dispatch {
            let poll_ms = self.waiter.options().poll_interval_ms.min(settle_ms);
            let settle = Waiter::new(
                WaitOptions::new()
                    .with_timeout(settle_ms)
                    .with_poll_interval(poll_ms),
            );
            match settle.until(self.driver, step, observed, effect).await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_timeout() => {
                    debug!(target = target.name(), settle_ms, "click had no effect, clicking again");
                    self.click(target).await?;
                }
                Err(e) => return Err(e),
            }
        }
        self.wait_for(step, observed, effect).await
    }

    /// Rendered text of `target` once it is visible
    pub async fn read_text(&self, target: &Locator) -> E2eResult<String> {
        let step = format!("read {}", target.name());
        self.wait_for(&step, target, &Condition::Visible).await?;
        self.driver.text(target.selector()).await
    }

    /// Attribute of `target` once it is present
    pub async fn read_attribute(&self, target: &Locator, name: &str) -> E2eResult<Option<String>> {
        let step = format!("read {} of {}", name, target.name());
        self.wait_for(&step, target, &Condition::Present).await?;
        self.driver.attribute(target.selector(), name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::E2eError;
    use crate::sim::{SimConfig, SimulatedApp};

    fn opts() -> WaitOptions {
        WaitOptions::new().with_timeout(1_000).with_poll_interval(10)
    }

    fn create() -> Locator {
        Locator::by_id("create button", "btn-adicionar")
    }

    fn code() -> Locator {
        Locator::by_id("code field", "codigo")
    }

    #[tokio::test(start_paused = true)]
    async fn test_write_waits_for_field_then_clears_types_and_tabs() {
        let app = SimulatedApp::logged_in(SimConfig::default().with_transition_ms(120));
        let ui = Interactor::new(&app, opts());
        ui.click(&create()).await.unwrap();
        app.clear_history().await;

        ui.write(&code(), "007").await.unwrap();

        assert_eq!(
            app.history().await,
            vec!["clear #codigo", "type #codigo \"007\"", "key #codigo Tab"]
        );
        assert_eq!(
            app.attribute(code().selector(), "value").await.unwrap().as_deref(),
            Some("007")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_write_empty_text_only_clears() {
        let app = SimulatedApp::logged_in(SimConfig::default().with_transition_ms(0));
        let ui = Interactor::new(&app, opts());
        ui.click(&create()).await.unwrap();
        ui.write(&code(), "001").await.unwrap();
        app.clear_history().await;

        ui.write(&code(), "").await.unwrap();

        assert_eq!(app.history().await, vec!["clear #codigo", "key #codigo Tab"]);
        assert_eq!(
            app.attribute(code().selector(), "value").await.unwrap().as_deref(),
            Some("")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_write_into_hidden_field_times_out() {
        let app = SimulatedApp::logged_in(SimConfig::default());
        let ui = Interactor::new(&app, opts());

        let err = ui.write(&code(), "001").await.unwrap_err();

        match err {
            E2eError::Timeout { step, ms, .. } => {
                assert_eq!(step, "write code field");
                assert_eq!(ms, 1_000);
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    fn modal() -> Locator {
        Locator::by_id("registration modal", "cadastro-produto")
    }

    fn shown() -> Condition {
        Condition::attribute_contains("class", "show")
    }

    async fn create_clicks(app: &SimulatedApp) -> usize {
        app.history()
            .await
            .into_iter()
            .filter(|entry| entry == "click #btn-adicionar")
            .count()
    }

    #[tokio::test(start_paused = true)]
    async fn test_double_dispatch_recovers_swallowed_click() {
        let app = SimulatedApp::logged_in(SimConfig::default().with_swallow_first_click(true));
        let ui = Interactor::new(&app, opts());
        let double = ClickDispatch::Double { settle_ms: 300 };

        ui.click(&create()).await.unwrap();
        ui.await_click_effect("open", &create(), double, &modal(), &shown())
            .await
            .unwrap();

        assert_eq!(create_clicks(&app).await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_double_dispatch_keeps_single_click_when_target_stays_clickable() {
        let app = SimulatedApp::logged_in(SimConfig::default());
        let ui = Interactor::new(&app, opts());
        let double = ClickDispatch::Double { settle_ms: 300 };

        ui.click(&create()).await.unwrap();
        ui.await_click_effect("open", &create(), double, &modal(), &shown())
            .await
            .unwrap();

        // Create sits under the backdrop but still reports displayed and enabled
        assert!(app.probe(create().selector()).await.unwrap().unwrap().is_clickable());
        assert_eq!(create_clicks(&app).await, 1);
        tokio::time::sleep(std::time::Duration::from_millis(500)).await;
        assert!(shown()
            .is_met(&app, modal().selector())
            .await
            .unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_dispatch_times_out_on_swallowed_click() {
        let app = SimulatedApp::logged_in(SimConfig::default().with_swallow_first_click(true));
        let ui = Interactor::new(&app, opts());

        ui.click(&create()).await.unwrap();
        let err = ui
            .await_click_effect("open", &create(), ClickDispatch::Single, &modal(), &shown())
            .await
            .unwrap_err();

        assert!(err.is_timeout());
        assert_eq!(create_clicks(&app).await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_text_waits_for_visibility() {
        let app = SimulatedApp::logged_in(SimConfig::default());
        let ui = Interactor::new(&app, opts());
        let message = Locator::by_id("message", "mensagem");

        let err = ui.read_text(&message).await.unwrap_err();
        assert!(err.is_timeout());
    }

    #[test]
    fn test_dispatch_from_flag() {
        assert_eq!(
            ClickDispatch::from_workaround(true, 250),
            ClickDispatch::Double { settle_ms: 250 }
        );
        assert_eq!(ClickDispatch::from_workaround(false, 250), ClickDispatch::Single);
        assert_eq!(ClickDispatch::default(), ClickDispatch::Single);
    }
}
