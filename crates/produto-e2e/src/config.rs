//! Suite configuration loaded from YAML.
//!
//! Every field has a default, so an empty document is a valid configuration
//! pointing at a local deployment with the stock selectors.

use crate::browser::BrowserConfig;
use crate::interaction::{ClickDispatch, DEFAULT_SETTLE_MS};
use crate::page_object::{LoginLocators, ProductLocators};
use crate::result::{E2eError, E2eResult};
use crate::sim::SimConfig;
use crate::wait::WaitOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default address of the application under test
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/";

/// Login credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    /// Login e-mail
    pub email: String,
    /// Login password
    pub password: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            email: "admin@admin.com".to_string(),
            password: "admin@123".to_string(),
        }
    }
}

/// Configuration of one suite run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Page the session navigates to before logging in
    pub base_url: String,
    /// Login credentials
    pub credentials: Credentials,
    /// Title substring identifying the login page, empty to accept any
    pub login_title: String,
    /// Title substring identifying the product page
    pub products_title: String,
    /// Explicit wait bounds
    pub wait: WaitOptions,
    /// Click Create and Exit a second time when the first click is swallowed
    pub double_dispatch: bool,
    /// How long a first click gets to open or close the modal before the
    /// second one is sent
    pub double_dispatch_settle_ms: u64,
    /// Login screen selectors
    pub login_locators: LoginLocators,
    /// Product screen selectors
    pub locators: ProductLocators,
    /// Chromium launch options
    pub browser: BrowserConfig,
    /// Behavior of the simulated application
    pub sim: SimConfig,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            credentials: Credentials::default(),
            login_title: String::new(),
            products_title: "Controle de Produtos".to_string(),
            wait: WaitOptions::default(),
            double_dispatch: false,
            double_dispatch_settle_ms: DEFAULT_SETTLE_MS,
            login_locators: LoginLocators::default(),
            locators: ProductLocators::default(),
            browser: BrowserConfig::default(),
            sim: SimConfig::default(),
        }
    }
}

impl SuiteConfig {
    /// Parse a YAML document
    pub fn from_yaml_str(yaml: &str) -> E2eResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> E2eResult<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| {
            E2eError::config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_yaml_str(&yaml)
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> E2eResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Click dispatch policy for the modal toggles
    #[must_use]
    pub const fn click_dispatch(&self) -> ClickDispatch {
        ClickDispatch::from_workaround(self.double_dispatch, self.double_dispatch_settle_ms)
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> E2eResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(E2eError::config("base_url must not be empty"));
        }
        if !(self.base_url.starts_with("http://")
            || self.base_url.starts_with("https://")
            || self.base_url.starts_with("file://"))
        {
            return Err(E2eError::config(format!(
                "base_url must be an http(s) or file URL, got {:?}",
                self.base_url
            )));
        }
        if self.products_title.trim().is_empty() {
            return Err(E2eError::config("products_title must not be empty"));
        }
        self.wait.validate()?;
        if self.double_dispatch && self.double_dispatch_settle_ms >= self.wait.timeout_ms {
            return Err(E2eError::config(format!(
                "double_dispatch_settle_ms ({}) must be shorter than wait timeout_ms ({})",
                self.double_dispatch_settle_ms, self.wait.timeout_ms
            )));
        }
        Ok(())
    }
}
