use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::{Value, json};
use thiserror::Error;
use tracing::{info, warn};

use super::{ApiRequestArgs, ToolCommand};
use crate::config::Timeouts;
use crate::domain::types::{ToolCall, ToolResult};
use crate::infrastructure::browser::{DriverError, PageDriver};
use crate::infrastructure::http::{HttpError, HttpRequester};
use crate::infrastructure::storage::{ArtifactStore, StoreError, artifact_key};

#[derive(Debug, Error)]
enum ExecutionError {
    #[error(transparent)]
    Driver(#[from] DriverError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Http(#[from] HttpError),
}

/// Dispatches oracle-issued tool invocations against the live page.
///
/// Every invocation yields exactly one [`ToolResult`]; failures of any kind
/// are folded into error-status results so the oracle can adapt. Uploaded
/// artifacts are recorded so partial progress survives a failed run.
#[derive(Clone)]
pub struct ToolExecutor {
    page: Arc<dyn PageDriver>,
    store: Arc<dyn ArtifactStore>,
    http: HttpRequester,
    artifact_prefix: String,
    timeouts: Timeouts,
    artifacts: Arc<Mutex<Vec<String>>>,
}

impl ToolExecutor {
    pub fn new(
        page: Arc<dyn PageDriver>,
        store: Arc<dyn ArtifactStore>,
        http: HttpRequester,
        artifact_prefix: impl Into<String>,
        timeouts: Timeouts,
    ) -> Self {
        Self {
            page,
            store,
            http,
            artifact_prefix: artifact_prefix.into(),
            timeouts,
            artifacts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Storage locators of every artifact uploaded so far in this run.
    pub fn artifacts(&self) -> Vec<String> {
        self.artifacts.lock().expect("artifact list lock").clone()
    }

    pub async fn execute(&self, call: &ToolCall) -> ToolResult {
        let command = match ToolCommand::parse(&call.name, &call.arguments) {
            Ok(command) => command,
            Err(err) => {
                warn!(tool = %call.name, %err, "rejected tool invocation");
                return ToolResult::error(call, err.to_string());
            }
        };

        match self.run(command).await {
            Ok(payload) => {
                info!(tool = %call.name, "tool executed");
                ToolResult::ok(call, payload)
            }
            Err(err) => {
                warn!(tool = %call.name, %err, "tool execution failed");
                ToolResult::error(call, err.to_string())
            }
        }
    }

    async fn run(&self, command: ToolCommand) -> Result<Value, ExecutionError> {
        match command {
            ToolCommand::OpenUrl { url, wait_for } => {
                self.page.navigate(&url, self.timeouts.navigation).await?;
                if let Some(selector) = wait_for {
                    self.page.wait_for(&selector, self.timeouts.selector).await?;
                }
                let current_url = self.page.current_url().await?;
                Ok(json!({ "status": "ok", "current_url": current_url }))
            }
            ToolCommand::FillForm { selector, value } => {
                self.page
                    .fill(&selector, &value, self.timeouts.interaction)
                    .await?;
                Ok(json!({ "status": "ok" }))
            }
            ToolCommand::Click { selector } => {
                self.page.click(&selector, self.timeouts.interaction).await?;
                Ok(json!({ "status": "ok" }))
            }
            ToolCommand::GetText { selector } => {
                let text = self
                    .page
                    .read_text(&selector, self.timeouts.interaction)
                    .await?;
                Ok(json!({ "status": "ok", "text": text }))
            }
            ToolCommand::Screenshot => {
                let bytes = self.page.screenshot().await?;
                let key = artifact_key(&self.artifact_prefix);
                let uri = self.store.put_png(&key, bytes).await?;
                self.artifacts
                    .lock()
                    .expect("artifact list lock")
                    .push(uri.clone());
                Ok(json!({ "status": "ok", "s3": uri }))
            }
            ToolCommand::ApiRequest(args) => self.api_request(args).await,
        }
    }

    async fn api_request(&self, args: ApiRequestArgs) -> Result<Value, ExecutionError> {
        let headers = args.headers.unwrap_or_else(HashMap::new);
        let summary = self
            .http
            .execute(&args.url, args.method.as_deref(), &headers, args.body.as_ref())
            .await?;
        Ok(json!({
            "status": "ok",
            "http_status": summary.status,
            "body": summary.body,
        }))
    }
}
