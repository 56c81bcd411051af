//! Browser control over the Chrome `DevTools` Protocol.
//!
//! [`BrowserConfig`] is always available so it can live in the suite
//! configuration. [`ChromiumDriver`] needs the `browser` feature and a local
//! Chromium install.

use serde::{Deserialize, Serialize};

/// Browser configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Window width
    pub window_width: u32,
    /// Window height
    pub window_height: u32,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: 1280,
            window_height: 800,
            chromium_path: None,
            sandbox: true,
        }
    }
}

impl BrowserConfig {
    /// Set window dimensions
    #[must_use]
    pub const fn with_window(mut self, width: u32, height: u32) -> Self {
        self.window_width = width;
        self.window_height = height;
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }
}

// ============================================================================
// Real CDP Implementation (when `browser` feature is enabled)
// ============================================================================

#[cfg(feature = "browser")]
#[allow(clippy::significant_drop_tightening)]
mod cdp {
    use super::BrowserConfig;
    use crate::driver::{ElementState, Key, PageDriver};
    use crate::locator::Selector;
    use crate::result::{E2eError, E2eResult};
    use async_trait::async_trait;
    use chromiumoxide::browser::{Browser, BrowserConfig as CdpConfig};
    use chromiumoxide::element::Element;
    use chromiumoxide::error::CdpError;
    use chromiumoxide::page::Page;
    use futures::StreamExt;
    use serde::Deserialize;
    use tokio::sync::Mutex;
    use tracing::debug;

    #[derive(Debug, Deserialize)]
    struct AttributeProbe {
        found: bool,
        value: Option<String>,
    }

    fn driver_error(e: CdpError) -> E2eError {
        E2eError::driver(e.to_string())
    }

    /// Errors raised while acting on a resolved element.
    ///
    /// A node that vanished between lookup and action is stale.
    fn element_error(selector: &Selector, e: CdpError) -> E2eError {
        let message = e.to_string();
        if message.contains("No node") || message.contains("Could not find node") {
            E2eError::StaleElement {
                selector: selector.to_css(),
            }
        } else if message.contains("box model") {
            E2eError::NotInteractable {
                selector: selector.to_css(),
            }
        } else {
            E2eError::driver(message)
        }
    }

    /// `PageDriver` backed by a real Chromium over CDP
    #[derive(Debug)]
    pub struct ChromiumDriver {
        config: BrowserConfig,
        browser: Mutex<Browser>,
        page: Page,
        handler: tokio::task::JoinHandle<()>,
    }

    impl ChromiumDriver {
        /// Launch Chromium and open a blank page
        ///
        /// # Errors
        ///
        /// Returns error if browser cannot be launched
        pub async fn launch(config: BrowserConfig) -> E2eResult<Self> {
            let mut builder =
                CdpConfig::builder().window_size(config.window_width, config.window_height);

            if !config.headless {
                builder = builder.with_head();
            }

            if !config.sandbox {
                builder = builder.no_sandbox();
            }

            if let Some(ref path) = config.chromium_path {
                builder = builder.chrome_executable(path);
            }

            let cdp_config = builder
                .build()
                .map_err(|message| E2eError::BrowserLaunch { message })?;

            let (browser, mut handler) =
                Browser::launch(cdp_config)
                    .await
                    .map_err(|e| E2eError::BrowserLaunch {
                        message: e.to_string(),
                    })?;

            // Spawn handler task
            let handler = tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    if event.is_err() {
                        break;
                    }
                }
            });

            let page = browser
                .new_page("about:blank")
                .await
                .map_err(|e| E2eError::BrowserLaunch {
                    message: e.to_string(),
                })?;

            debug!(headless = config.headless, "chromium launched");
            Ok(Self {
                config,
                browser: Mutex::new(browser),
                page,
                handler,
            })
        }

        /// Get the browser configuration
        #[must_use]
        pub const fn config(&self) -> &BrowserConfig {
            &self.config
        }

        async fn eval<T: serde::de::DeserializeOwned>(&self, script: &str) -> E2eResult<T> {
            self.page
                .evaluate(script)
                .await
                .map_err(driver_error)?
                .into_value::<T>()
                .map_err(E2eError::from)
        }

        async fn element(&self, selector: &Selector) -> E2eResult<Element> {
            self.page
                .find_element(selector.to_css())
                .await
                .map_err(|_| E2eError::ElementNotFound {
                    selector: selector.to_css(),
                })
        }
    }

    #[async_trait]
    impl PageDriver for ChromiumDriver {
        async fn navigate(&self, url: &str) -> E2eResult<()> {
            debug!(url, "navigating");
            self.page
                .goto(url)
                .await
                .map_err(|e| E2eError::Navigation {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;
            Ok(())
        }

        async fn reload(&self) -> E2eResult<()> {
            self.page.reload().await.map_err(driver_error)?;
            Ok(())
        }

        async fn title(&self) -> E2eResult<String> {
            self.eval("document.title").await
        }

        async fn probe(&self, selector: &Selector) -> E2eResult<Option<ElementState>> {
            let script = format!(
                "(() => {{ \
                    const el = {query}; \
                    if (!el) return null; \
                    const style = window.getComputedStyle(el); \
                    const rect = el.getBoundingClientRect(); \
                    const displayed = style.display !== 'none' \
                        && style.visibility !== 'hidden' \
                        && parseFloat(style.opacity) > 0 \
                        && (rect.width > 0 || rect.height > 0); \
                    return {{ displayed, enabled: !el.disabled }}; \
                }})()",
                query = selector.to_query()
            );
            self.eval(&script).await
        }

        async fn click(&self, selector: &Selector) -> E2eResult<()> {
            let element = self.element(selector).await?;
            element
                .click()
                .await
                .map_err(|e| element_error(selector, e))?;
            Ok(())
        }

        async fn clear(&self, selector: &Selector) -> E2eResult<()> {
            let script = format!(
                "(() => {{ \
                    const el = {query}; \
                    if (!el) return false; \
                    el.focus(); \
                    el.value = ''; \
                    el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
                    return true; \
                }})()",
                query = selector.to_query()
            );
            if self.eval::<bool>(&script).await? {
                Ok(())
            } else {
                Err(E2eError::ElementNotFound {
                    selector: selector.to_css(),
                })
            }
        }

        async fn send_keys(&self, selector: &Selector, text: &str) -> E2eResult<()> {
            let element = self.element(selector).await?;
            element
                .focus()
                .await
                .map_err(|e| element_error(selector, e))?;
            element
                .type_str(text)
                .await
                .map_err(|e| element_error(selector, e))?;
            Ok(())
        }

        async fn press_key(&self, selector: &Selector, key: Key) -> E2eResult<()> {
            let element = self.element(selector).await?;
            element
                .press_key(key.as_str())
                .await
                .map_err(|e| element_error(selector, e))?;
            Ok(())
        }

        async fn text(&self, selector: &Selector) -> E2eResult<String> {
            let script = format!(
                "(() => {{ const el = {query}; return el ? el.innerText : null; }})()",
                query = selector.to_query()
            );
            self.eval::<Option<String>>(&script)
                .await?
                .ok_or_else(|| E2eError::ElementNotFound {
                    selector: selector.to_css(),
                })
        }

        async fn attribute(&self, selector: &Selector, name: &str) -> E2eResult<Option<String>> {
            let script = format!(
                "(() => {{ \
                    const el = {query}; \
                    if (!el) return {{ found: false, value: null }}; \
                    const attr = el.getAttribute({name}); \
                    if (attr !== null) return {{ found: true, value: attr }}; \
                    const prop = el[{name}]; \
                    return {{ found: true, value: prop == null ? null : String(prop) }}; \
                }})()",
                query = selector.to_query(),
                name = serde_json::to_string(name)?
            );
            let probe: AttributeProbe = self.eval(&script).await?;
            if probe.found {
                Ok(probe.value)
            } else {
                Err(E2eError::ElementNotFound {
                    selector: selector.to_css(),
                })
            }
        }

        async fn close(&self) -> E2eResult<()> {
            let mut browser = self.browser.lock().await;
            browser
                .close()
                .await
                .map_err(|e| E2eError::driver(e.to_string()))?;
            let _ = browser.wait().await;
            self.handler.abort();
            debug!("chromium closed");
            Ok(())
        }
    }
}

#[cfg(feature = "browser")]
pub use cdp::ChromiumDriver;
