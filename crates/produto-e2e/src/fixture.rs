//! Browser session fixture.
//!
//! A [`Session`] is acquired once per suite run: navigate to the
//! application, log in, wait for the product page. Scenarios borrow it and
//! build fresh page objects from it. It is released explicitly with
//! [`Session::close`], also when setup fails halfway.

use crate::config::SuiteConfig;
use crate::driver::PageDriver;
use crate::page_object::{LoginPage, ProductPage};
use crate::result::{E2eError, E2eResult};
use tracing::{debug, info, warn};

/// Lifecycle state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Logged in and on the product page
    Active,
    /// Driver closed
    Released,
    /// Closing the driver failed
    Failed,
}

/// Logged-in browser session shared by all scenarios of a run
#[derive(Debug)]
pub struct Session<D: PageDriver> {
    driver: D,
    config: SuiteConfig,
    state: SessionState,
}

impl<D: PageDriver> Session<D> {
    /// Navigate to the configured URL, log in and wait for the product page.
    ///
    /// The driver is closed before returning an error.
    pub async fn open(driver: D, config: SuiteConfig) -> E2eResult<Self> {
        let mut session = Self {
            driver,
            config,
            state: SessionState::Active,
        };
        if let Err(e) = session.login().await {
            warn!(error = %e, "session setup failed");
            if let Err(close_err) = session.close().await {
                debug!(error = %close_err, "closing after failed setup also failed");
            }
            return Err(e);
        }
        info!(url = %session.config.base_url, "session ready");
        Ok(session)
    }

    async fn login(&self) -> E2eResult<()> {
        self.driver.navigate(&self.config.base_url).await?;
        let login = LoginPage::new(&self.driver, &self.config.login_locators, self.config.wait)
            .with_title(self.config.login_title.clone());
        login
            .login(&self.config.credentials.email, &self.config.credentials.password)
            .await?;
        self.product_page().wait_until_ready().await
    }

    fn ensure_active(&self) -> E2eResult<()> {
        if self.state == SessionState::Active {
            Ok(())
        } else {
            Err(E2eError::invalid_state("session has been released"))
        }
    }

    /// Reload the page and wait until Create is clickable again.
    ///
    /// Client-side state (modal, inputs, message) is discarded; saved
    /// products stay.
    pub async fn reset(&self) -> E2eResult<()> {
        self.ensure_active()?;
        self.driver.reload().await?;
        self.product_page().wait_until_ready().await?;
        debug!("page reset");
        Ok(())
    }

    /// Fresh product page bound to this session
    #[must_use]
    pub fn product_page(&self) -> ProductPage<'_, D> {
        ProductPage::new(
            &self.driver,
            &self.config.locators,
            self.config.wait,
            self.config.products_title.clone(),
        )
        .with_click_dispatch(self.config.click_dispatch())
    }

    /// The driver this session runs on
    #[must_use]
    pub const fn driver(&self) -> &D {
        &self.driver
    }

    /// The configuration this session was opened with
    #[must_use]
    pub const fn config(&self) -> &SuiteConfig {
        &self.config
    }

    /// Current lifecycle state
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Close the driver. Closing twice is a no-op.
    pub async fn close(&mut self) -> E2eResult<()> {
        if self.state != SessionState::Active {
            return Ok(());
        }
        match self.driver.close().await {
            Ok(()) => {
                self.state = SessionState::Released;
                debug!("session released");
                Ok(())
            }
            Err(e) => {
                self.state = SessionState::Failed;
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::Selector;
    use crate::page_object::ProductForm;
    use crate::sim::{SimConfig, SimulatedApp};
    use crate::wait::WaitOptions;
    use std::sync::Arc;

    fn config() -> SuiteConfig {
        SuiteConfig {
            wait: WaitOptions::new().with_timeout(1_000).with_poll_interval(10),
            ..SuiteConfig::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_logs_in_and_lands_on_product_page() {
        let session = Session::open(SimulatedApp::new(SimConfig::default()), config())
            .await
            .unwrap();

        assert_eq!(session.state(), SessionState::Active);
        assert_eq!(
            session.product_page().title().await.unwrap(),
            "Controle de Produtos"
        );
        let history = session.driver().history().await;
        assert_eq!(history[0], "navigate http://localhost:8080/");
        assert!(history.contains(&"click #btn-entrar".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_with_bad_credentials_times_out_and_closes() {
        let mut bad = config();
        bad.credentials.password = "errada".to_string();

        let app = Arc::new(SimulatedApp::new(SimConfig::default()));

        let err = Session::open(Arc::clone(&app), bad).await.unwrap_err();

        assert!(err.is_timeout(), "{err}");
        assert_eq!(app.history().await.last().map(String::as_str), Some("close"));
        assert!(matches!(
            app.title().await.unwrap_err(),
            E2eError::Driver { .. }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_accepts_any_login_title_by_default() {
        let app = SimulatedApp::new(SimConfig {
            login_title: "Acesso ao Sistema".to_string(),
            ..SimConfig::default()
        });

        let session = Session::open(app, config()).await.unwrap();
        assert_eq!(session.state(), SessionState::Active);
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_checks_configured_login_title() {
        let mut cfg = config();
        cfg.login_title = "Acesso".to_string();
        let app = SimulatedApp::new(SimConfig {
            login_title: "Acesso ao Sistema".to_string(),
            ..SimConfig::default()
        });
        assert!(Session::open(app, cfg.clone()).await.is_ok());

        let err = Session::open(SimulatedApp::new(SimConfig::default()), cfg)
            .await
            .unwrap_err();
        assert!(err.is_timeout(), "{err}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_closes_open_modal_and_keeps_rows() {
        let session = Session::open(SimulatedApp::new(SimConfig::default()), config())
            .await
            .unwrap();
        let mut page = session.product_page();
        page.register(&ProductForm::new("007", "Mouse Gamer", "50", "150", "10-03-2024"))
            .await
            .unwrap();
        let rows_before = session.driver().rows().await;
        assert_eq!(rows_before.len(), 1);

        session.reset().await.unwrap();

        let modal = Selector::id("cadastro-produto");
        assert!(!session.driver().probe(&modal).await.unwrap().unwrap().displayed);
        assert_eq!(session.driver().rows().await, rows_before);
        assert!(session.driver().history().await.contains(&"reload".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_is_idempotent_and_blocks_reset() {
        let mut session = Session::open(SimulatedApp::new(SimConfig::default()), config())
            .await
            .unwrap();

        session.close().await.unwrap();
        session.close().await.unwrap();

        assert_eq!(session.state(), SessionState::Released);
        assert!(matches!(
            session.reset().await.unwrap_err(),
            E2eError::InvalidState { .. }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_product_page_uses_configured_dispatch() {
        let mut cfg = config();
        cfg.double_dispatch = true;
        cfg.double_dispatch_settle_ms = 300;
        cfg.sim.swallow_first_click = true;
        let app = SimulatedApp::new(cfg.sim.clone());
        let session = Session::open(app, cfg).await.unwrap();

        let mut page = session.product_page();
        page.open_modal().await.unwrap();
    }
}
