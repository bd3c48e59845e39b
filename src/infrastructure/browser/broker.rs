//! Remote browser session provisioning.

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_bedrockagentcore::Client;
use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info};

use crate::infrastructure::BoxError;

/// Handle for one provisioned remote browser session.
#[derive(Debug, Clone)]
pub struct BrowserSession {
    pub id: String,
    pub cdp_endpoint: String,
}

#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("failed to start browser session: {source}")]
    Start {
        #[source]
        source: BoxError,
    },
    #[error("failed to stop browser session '{session}': {source}")]
    Stop {
        session: String,
        #[source]
        source: BoxError,
    },
    #[error("browser session '{session}' exposes no automation stream endpoint")]
    MissingEndpoint { session: String },
}

impl BrokerError {
    pub fn start(source: impl Into<BoxError>) -> Self {
        Self::Start {
            source: source.into(),
        }
    }

    pub fn stop(session: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Stop {
            session: session.into(),
            source: source.into(),
        }
    }
}

/// Provisions exclusive remote browser sessions. One session per run.
#[async_trait]
pub trait SessionBroker: Send + Sync {
    async fn open(&self, lifetime: Duration) -> Result<BrowserSession, BrokerError>;

    async fn close(&self, session: &BrowserSession) -> Result<(), BrokerError>;
}

/// Session broker backed by the Bedrock AgentCore browser tool.
pub struct AgentCoreBroker {
    client: Client,
    browser_identifier: String,
}

impl AgentCoreBroker {
    pub fn new(sdk_config: &aws_config::SdkConfig, browser_identifier: impl Into<String>) -> Self {
        Self {
            client: Client::new(sdk_config),
            browser_identifier: browser_identifier.into(),
        }
    }
}

#[async_trait]
impl SessionBroker for AgentCoreBroker {
    async fn open(&self, lifetime: Duration) -> Result<BrowserSession, BrokerError> {
        let name = format!("digital-worker-{}", Utc::now().timestamp());
        debug!(browser = %self.browser_identifier, %name, "starting browser session");

        let started = self
            .client
            .start_browser_session()
            .browser_identifier(&self.browser_identifier)
            .name(name)
            .session_timeout_seconds(lifetime.as_secs() as i32)
            .send()
            .await
            .map_err(BrokerError::start)?;

        let id = started.session_id().to_string();
        let cdp_endpoint = started
            .streams()
            .and_then(|streams| streams.automation_stream())
            .map(|stream| stream.stream_endpoint().to_string())
            .ok_or_else(|| BrokerError::MissingEndpoint {
                session: id.clone(),
            })?;

        info!(session = %id, "browser session started");
        Ok(BrowserSession { id, cdp_endpoint })
    }

    async fn close(&self, session: &BrowserSession) -> Result<(), BrokerError> {
        self.client
            .stop_browser_session()
            .browser_identifier(&self.browser_identifier)
            .session_id(&session.id)
            .send()
            .await
            .map_err(|source| BrokerError::stop(&session.id, source))?;

        info!(session = %session.id, "browser session stopped");
        Ok(())
    }
}
