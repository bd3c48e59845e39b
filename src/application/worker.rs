//! Invocation boundary: wire collaborators, guarantee session release, and
//! always return a structured response.

use std::sync::Arc;

use thiserror::Error;
use tokio::time::Instant;
use tracing::{error, info, warn};

use super::agent::{Agent, AgentOptions};
use super::script::{ConvertCaseReport, ScriptError, run_convert_case};
use super::tooling::ToolExecutor;
use crate::config::WorkerConfig;
use crate::domain::types::{RunOutcome, RunResult, RunStatus, ScriptReport, WorkerEvent};
use crate::infrastructure::browser::{
    BrowserSession, DriverError, PageDriverFactory, SessionBroker,
};
use crate::infrastructure::http::HttpRequester;
use crate::infrastructure::oracle::Oracle;
use crate::infrastructure::storage::ArtifactStore;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error(transparent)]
    Driver(#[from] DriverError),
    #[error(transparent)]
    Script(#[from] ScriptError),
}

/// One worker serves one invocation at a time; each run gets a fresh
/// exclusive browser session, released on every exit path.
pub struct Worker<O: Oracle> {
    config: WorkerConfig,
    broker: Arc<dyn SessionBroker>,
    drivers: Arc<dyn PageDriverFactory>,
    store: Arc<dyn ArtifactStore>,
    oracle: Arc<O>,
    http: HttpRequester,
}

impl<O: Oracle> Worker<O> {
    pub fn new(
        config: WorkerConfig,
        broker: Arc<dyn SessionBroker>,
        drivers: Arc<dyn PageDriverFactory>,
        store: Arc<dyn ArtifactStore>,
        oracle: Arc<O>,
        http: HttpRequester,
    ) -> Self {
        Self {
            config,
            broker,
            drivers,
            store,
            oracle,
            http,
        }
    }

    /// Run the planning loop for one event. Never fails: every failure mode
    /// is folded into an error-status [`RunOutcome`].
    pub async fn run_agent(&self, event: &WorkerEvent) -> RunOutcome {
        let session = match self.broker.open(self.config.session_timeout).await {
            Ok(session) => session,
            Err(err) => {
                error!(%err, "browser session could not be started");
                return RunOutcome::failure(
                    err.to_string(),
                    Some("verify the browser identifier and service quotas"),
                );
            }
        };

        let run = self.drive_agent(&session, event).await;
        self.release(&session).await;

        match run {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(%err, "agent run failed before the loop started");
                RunOutcome::failure(err.to_string(), Some("see worker logs for details"))
            }
        }
    }

    /// Run the fixed convert-case pipeline for one event.
    pub async fn run_script(&self, event: &WorkerEvent) -> ScriptReport {
        let session = match self.broker.open(self.config.session_timeout).await {
            Ok(session) => session,
            Err(err) => {
                error!(%err, "browser session could not be started");
                return ScriptReport::error(err.to_string());
            }
        };

        let run = self.drive_script(&session, event).await;
        self.release(&session).await;

        match run {
            Ok(report) => {
                ScriptReport::success(report.final_url, report.screenshot, report.extracted)
            }
            Err(err) => {
                error!(%err, "script run failed");
                ScriptReport::error(err.to_string())
            }
        }
    }

    async fn drive_agent(
        &self,
        session: &BrowserSession,
        event: &WorkerEvent,
    ) -> Result<RunOutcome, WorkerError> {
        let page = self.drivers.connect(session).await?;
        let executor = ToolExecutor::new(
            page,
            self.store.clone(),
            self.http.clone(),
            self.config.artifact_prefix.clone(),
            self.config.timeouts.clone(),
        );
        let recorder = executor.clone();
        let options = AgentOptions {
            max_steps: self.config.max_agent_steps,
            deadline: self.config.run_budget.map(|budget| Instant::now() + budget),
        };

        info!(instruction = %event.instruction, "starting agent run");
        let agent = Agent::new(self.oracle.clone(), executor, options);
        let outcome = match agent.run(event).await {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(%err, "oracle failed mid-run");
                RunOutcome::failure(err.to_string(), Some("see worker logs for details"))
            }
        };

        Ok(attach_partial_artifacts(outcome, recorder.artifacts()))
    }

    async fn drive_script(
        &self,
        session: &BrowserSession,
        event: &WorkerEvent,
    ) -> Result<ConvertCaseReport, WorkerError> {
        let page = self.drivers.connect(session).await?;
        let text = event.paste_text();

        info!("starting script run");
        Ok(run_convert_case(
            page.as_ref(),
            self.store.as_ref(),
            &self.config.artifact_prefix,
            &text,
            &self.config.timeouts,
        )
        .await?)
    }

    /// Best-effort release; the remote service may already consider the
    /// session gone.
    async fn release(&self, session: &BrowserSession) {
        if let Err(err) = self.broker.close(session).await {
            warn!(session = %session.id, %err, "failed to stop browser session");
        }
    }
}

/// Side effects already happened; artifacts uploaded before a failure are
/// still useful for diagnosis, so error outcomes keep them.
fn attach_partial_artifacts(mut outcome: RunOutcome, artifacts: Vec<String>) -> RunOutcome {
    if outcome.status == RunStatus::Error && !artifacts.is_empty() {
        let result = outcome.result.get_or_insert_with(RunResult::default);
        if result.artifacts.is_null() {
            result.artifacts = serde_json::json!({ "screenshots": artifacts });
        }
    }
    outcome
}
