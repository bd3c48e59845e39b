use std::sync::Arc;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::models::AgentOptions;
use super::outcome::parse_run_outcome;
use super::prompt;
use crate::application::tooling::{self, ToolExecutor};
use crate::domain::types::{Conversation, RunOutcome, WorkerEvent};
use crate::infrastructure::oracle::{Oracle, OracleError};

/// The planning loop: ask the oracle, run requested tools, feed results back,
/// until the oracle emits a terminal answer or a limit is hit.
pub struct Agent<O: Oracle> {
    oracle: Arc<O>,
    executor: ToolExecutor,
    options: AgentOptions,
}

impl<O: Oracle> Agent<O> {
    pub fn new(oracle: Arc<O>, executor: ToolExecutor, options: AgentOptions) -> Self {
        Self {
            oracle,
            executor,
            options,
        }
    }

    /// Drive the loop to its single terminal [`RunOutcome`].
    ///
    /// Limit overruns and malformed terminal turns become error-status
    /// outcomes; only oracle invocation failures surface as errors.
    pub async fn run(&self, event: &WorkerEvent) -> Result<RunOutcome, OracleError> {
        let mut conversation = Conversation::new();
        conversation.push_user(prompt::initial_user_message(event));

        let mut steps_taken = 0usize;
        loop {
            if let Some(deadline) = self.options.deadline
                && Instant::now() >= deadline
            {
                warn!(steps_taken, "run budget exhausted before the model finished");
                return Ok(RunOutcome::failure(
                    "run budget exhausted before the task finished",
                    Some("raise RUN_BUDGET_SECS or simplify the instruction"),
                ));
            }
            if steps_taken >= self.options.max_steps {
                warn!(
                    limit = self.options.max_steps,
                    "planning exceeded the step limit"
                );
                return Ok(RunOutcome::failure(
                    format!(
                        "planning did not finish within {} steps",
                        self.options.max_steps
                    ),
                    Some("raise MAX_AGENT_STEPS or simplify the instruction"),
                ));
            }

            debug!(steps_taken, turns = conversation.len(), "querying oracle");
            let reply = self
                .oracle
                .plan(prompt::SYSTEM_PROMPT, tooling::catalog(), &conversation)
                .await?;
            steps_taken += 1;
            conversation.push_assistant(reply.clone());

            if reply.tool_calls.is_empty() {
                let text = reply.text.unwrap_or_default();
                info!(steps_taken, "oracle emitted terminal answer");
                return Ok(match parse_run_outcome(&text) {
                    Some(outcome) => outcome,
                    None => {
                        warn!("terminal answer was not parseable as a run outcome");
                        RunOutcome::malformed(text)
                    }
                });
            }

            // Execute in emission order; every request gains exactly one
            // result turn before the oracle is consulted again.
            let mut results = Vec::with_capacity(reply.tool_calls.len());
            for call in &reply.tool_calls {
                results.push(self.executor.execute(call).await);
            }
            conversation.push_tool_results(results);
        }
    }
}
