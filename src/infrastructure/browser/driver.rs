//! Page-level browser automation over the Chrome DevTools Protocol.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::Browser;
use chromiumoxide::element::Element;
use chromiumoxide::error::CdpError;
use chromiumoxide::page::{Page, ScreenshotParams};
use futures::StreamExt;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep, timeout};
use tracing::debug;

use super::broker::BrowserSession;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("failed to connect to browser endpoint: {source}")]
    Connect {
        #[source]
        source: CdpError,
    },
    #[error("navigation to '{url}' failed: {source}")]
    Navigation {
        url: String,
        #[source]
        source: CdpError,
    },
    #[error("no element matched selector '{0}'")]
    SelectorNotFound(String),
    #[error("timed out after {}s waiting for {what}", timeout.as_secs())]
    Timeout { what: String, timeout: Duration },
    #[error("browser protocol error: {0}")]
    Protocol(#[from] CdpError),
}

/// Sequential page operations, each with an explicit budget.
#[async_trait]
pub trait PageDriver: Send + Sync {
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<(), DriverError>;

    /// Block until the selector matches an element.
    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<(), DriverError>;

    /// Clear a matched form element and type the value into it.
    async fn fill(&self, selector: &str, value: &str, timeout: Duration)
    -> Result<(), DriverError>;

    async fn click(&self, selector: &str, timeout: Duration) -> Result<(), DriverError>;

    /// Click the first element whose own text contains the label.
    async fn click_by_text(&self, label: &str, timeout: Duration) -> Result<(), DriverError>;

    async fn read_text(&self, selector: &str, timeout: Duration) -> Result<String, DriverError>;

    /// Read the `value` property of a matched form element.
    async fn read_value(&self, selector: &str, timeout: Duration) -> Result<String, DriverError>;

    async fn screenshot(&self) -> Result<Vec<u8>, DriverError>;

    async fn current_url(&self) -> Result<String, DriverError>;
}

/// Builds a page driver connected to a provisioned session.
#[async_trait]
pub trait PageDriverFactory: Send + Sync {
    async fn connect(&self, session: &BrowserSession) -> Result<Arc<dyn PageDriver>, DriverError>;
}

pub struct CdpDriverFactory;

#[async_trait]
impl PageDriverFactory for CdpDriverFactory {
    async fn connect(&self, session: &BrowserSession) -> Result<Arc<dyn PageDriver>, DriverError> {
        let driver = CdpPageDriver::connect(&session.cdp_endpoint).await?;
        Ok(Arc::new(driver))
    }
}

/// Page driver speaking CDP to a remote Chromium over a websocket endpoint.
pub struct CdpPageDriver {
    _browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
}

impl CdpPageDriver {
    pub async fn connect(cdp_endpoint: &str) -> Result<Self, DriverError> {
        let (browser, mut handler) = Browser::connect(cdp_endpoint)
            .await
            .map_err(|source| DriverError::Connect { source })?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser.new_page("about:blank").await?;
        debug!(endpoint = %cdp_endpoint, "connected to remote browser");

        Ok(Self {
            _browser: browser,
            page,
            handler: handler_task,
        })
    }

    /// Resolve a selector, polling until the deadline.
    async fn element(&self, selector: &str, budget: Duration) -> Result<Element, DriverError> {
        let deadline = Instant::now() + budget;
        loop {
            match self.page.find_element(selector).await {
                Ok(element) => return Ok(element),
                Err(_) if Instant::now() < deadline => sleep(POLL_INTERVAL).await,
                Err(_) => return Err(DriverError::SelectorNotFound(selector.to_string())),
            }
        }
    }
}

impl Drop for CdpPageDriver {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

#[async_trait]
impl PageDriver for CdpPageDriver {
    async fn navigate(&self, url: &str, budget: Duration) -> Result<(), DriverError> {
        match timeout(budget, self.page.goto(url)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(source)) => Err(DriverError::Navigation {
                url: url.to_string(),
                source,
            }),
            Err(_) => Err(DriverError::Timeout {
                what: format!("navigation to '{url}'"),
                timeout: budget,
            }),
        }
    }

    async fn wait_for(&self, selector: &str, budget: Duration) -> Result<(), DriverError> {
        match self.element(selector, budget).await {
            Ok(_) => Ok(()),
            Err(DriverError::SelectorNotFound(_)) => Err(DriverError::Timeout {
                what: format!("selector '{selector}'"),
                timeout: budget,
            }),
            Err(other) => Err(other),
        }
    }

    async fn fill(&self, selector: &str, value: &str, budget: Duration) -> Result<(), DriverError> {
        let element = self.element(selector, budget).await?;
        element.click().await?;
        // Clear residual content so repeated fills never concatenate.
        element
            .call_js_fn(
                "function() { this.value = ''; this.dispatchEvent(new Event('input', { bubbles: true })); }",
                false,
            )
            .await?;
        element.type_str(value).await?;
        Ok(())
    }

    async fn click(&self, selector: &str, budget: Duration) -> Result<(), DriverError> {
        let element = self.element(selector, budget).await?;
        element.click().await?;
        Ok(())
    }

    async fn click_by_text(&self, label: &str, budget: Duration) -> Result<(), DriverError> {
        let xpath = format!(r#"//*[text()[contains(normalize-space(.), "{label}")]]"#);
        let deadline = Instant::now() + budget;
        loop {
            match self.page.find_xpath(&xpath).await {
                Ok(element) => {
                    element.click().await?;
                    return Ok(());
                }
                Err(_) if Instant::now() < deadline => sleep(POLL_INTERVAL).await,
                Err(_) => {
                    return Err(DriverError::SelectorNotFound(format!("text={label}")));
                }
            }
        }
    }

    async fn read_text(&self, selector: &str, budget: Duration) -> Result<String, DriverError> {
        let element = self.element(selector, budget).await?;
        let text = element.inner_text().await?.unwrap_or_default();
        Ok(text.trim().to_string())
    }

    async fn read_value(&self, selector: &str, budget: Duration) -> Result<String, DriverError> {
        let element = self.element(selector, budget).await?;
        let returned = element
            .call_js_fn("function() { return this.value; }", false)
            .await?;
        let value = returned
            .result
            .value
            .and_then(|value| value.as_str().map(str::to_string))
            .unwrap_or_default();
        Ok(value)
    }

    async fn screenshot(&self) -> Result<Vec<u8>, DriverError> {
        let params = ScreenshotParams::builder().full_page(true).build();
        Ok(self.page.screenshot(params).await?)
    }

    async fn current_url(&self) -> Result<String, DriverError> {
        Ok(self
            .page
            .url()
            .await?
            .unwrap_or_else(|| "about:blank".to_string()))
    }
}
