//! Fixed-script pipeline: paste text into convertcase.net, uppercase it,
//! capture the evidence.

use std::time::Duration;

use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::Timeouts;
use crate::infrastructure::browser::{DriverError, PageDriver};
use crate::infrastructure::storage::{ArtifactStore, StoreError, artifact_key};

pub const CONVERT_CASE_URL: &str = "https://convertcase.net/";

const TEXT_AREA: &str = "textarea";
const UPPER_CASE_LABEL: &str = "UPPER CASE";
/// The page rewrites the textarea after the click; give it a moment.
const SETTLE_DELAY: Duration = Duration::from_millis(1200);
/// The main textarea is rendered by script and can appear late.
const RENDER_RETRY_DELAY: Duration = Duration::from_millis(1500);

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error(transparent)]
    Driver(#[from] DriverError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone)]
pub struct ConvertCaseReport {
    pub final_url: String,
    pub screenshot: String,
    pub extracted: Option<String>,
}

/// Run the hardcoded convert-case flow against an open page.
pub async fn run_convert_case(
    page: &dyn PageDriver,
    store: &dyn ArtifactStore,
    artifact_prefix: &str,
    text: &str,
    timeouts: &Timeouts,
) -> Result<ConvertCaseReport, ScriptError> {
    info!(chars = text.len(), "starting convert-case script");
    page.navigate(CONVERT_CASE_URL, timeouts.script_navigation)
        .await?;

    if page.wait_for(TEXT_AREA, timeouts.selector).await.is_err() {
        debug!("textarea not rendered yet, retrying once");
        sleep(RENDER_RETRY_DELAY).await;
        page.wait_for(TEXT_AREA, timeouts.selector).await?;
    }

    page.fill(TEXT_AREA, text, timeouts.interaction).await?;
    page.click_by_text(UPPER_CASE_LABEL, timeouts.interaction)
        .await?;
    sleep(SETTLE_DELAY).await;

    // Reading the converted value back is best effort; the screenshot is the
    // primary evidence.
    let extracted = match page.read_value(TEXT_AREA, timeouts.interaction).await {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(%err, "could not read converted text back");
            None
        }
    };

    let bytes = page.screenshot().await?;
    let key = artifact_key(artifact_prefix);
    let screenshot = store.put_png(&key, bytes).await?;

    let final_url = page
        .current_url()
        .await
        .unwrap_or_else(|_| CONVERT_CASE_URL.to_string());

    info!(%screenshot, "convert-case script finished");
    Ok(ConvertCaseReport {
        final_url,
        screenshot,
        extracted,
    })
}
