//! produto-e2e: end-to-end suite for the product registration form
//!
//! Page objects, explicit waits and the TC001–TC010 registration scenarios,
//! running against a real Chromium (feature `browser`) or an in-process
//! simulation of the application.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Scenario   │    │ Page       │    │ Interactor │            │
//! │   │ catalog    │───►│ objects    │───►│ + Waiter   │──┐         │
//! │   └────────────┘    └────────────┘    └────────────┘  │         │
//! │          ▲                                             ▼         │
//! │   ┌────────────┐    ┌────────────┐          ┌──────────────────┐│
//! │   │ TestHarness│───►│ Session    │─────────►│ PageDriver       ││
//! │   └────────────┘    └────────────┘          │ Chromium │ Sim   ││
//! │                                             └──────────────────┘│
//! └─────────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]

mod browser;
mod config;
mod driver;
mod fixture;
mod harness;
mod interaction;
mod locator;
mod page_object;
mod result;
mod scenario;
pub mod sim;
mod wait;

pub use browser::BrowserConfig;
#[cfg(feature = "browser")]
pub use browser::ChromiumDriver;
pub use config::{Credentials, SuiteConfig, DEFAULT_BASE_URL};
pub use driver::{ElementState, Key, PageDriver};
pub use fixture::{Session, SessionState};
pub use harness::{run_suite, SuiteResults, TestHarness, TestResult};
pub use interaction::{ClickDispatch, Interactor, DEFAULT_SETTLE_MS};
pub use locator::{Locator, Selector};
pub use page_object::{
    wait_until_loaded, Field, LoginLocators, LoginPage, ModalState, PageObject, ProductForm,
    ProductLocators, ProductPage, ProductRow,
};
pub use result::{E2eError, E2eResult};
pub use scenario::{catalog, Expectation, Scenario, REQUIRED_FIELDS_MESSAGE};
pub use wait::{
    Condition, WaitOptions, WaitResult, Waiter, DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::sim::{SimConfig, SimulatedApp};
    pub use super::{
        catalog, run_suite, ClickDispatch, E2eError, E2eResult, PageDriver, ProductForm,
        ProductPage, Scenario, Session, SuiteConfig, SuiteResults, TestHarness, WaitOptions,
    };
}
