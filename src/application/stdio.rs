//! Line-oriented serve mode: one JSON event in, one JSON response out.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, error};

use super::worker::Worker;
use crate::domain::types::{RunOutcome, WorkerEvent};
use crate::infrastructure::oracle::Oracle;

#[derive(Debug, Error)]
pub enum StdioError {
    #[error("stdin/stdout I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize response: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Default, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ServeMode {
    #[default]
    Agent,
    Script,
}

#[derive(Debug, Deserialize)]
struct ServeRequest {
    #[serde(default)]
    mode: ServeMode,
    #[serde(flatten)]
    event: WorkerEvent,
}

/// Process events line by line until stdin closes. Every line gets exactly
/// one JSON response line; each event runs in its own browser session.
pub async fn run<O>(worker: Arc<Worker<O>>) -> Result<(), StdioError>
where
    O: Oracle + 'static,
{
    let stdin = BufReader::new(io::stdin());
    let mut lines = stdin.lines();
    let mut stdout = io::stdout();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        debug!("received serve-mode line");

        let response = match serde_json::from_str::<ServeRequest>(&line) {
            Ok(request) => match request.mode {
                ServeMode::Agent => {
                    serde_json::to_value(worker.run_agent(&request.event).await)?
                }
                ServeMode::Script => {
                    serde_json::to_value(worker.run_script(&request.event).await)?
                }
            },
            Err(err) => {
                error!(%err, "failed to parse serve-mode line");
                serde_json::to_value(RunOutcome::failure(
                    format!("invalid event JSON: {err}"),
                    Some("send one JSON event object per line"),
                ))?
            }
        };

        write_response(&mut stdout, &response).await?;
    }

    stdout.flush().await?;
    Ok(())
}

async fn write_response(stdout: &mut io::Stdout, response: &Value) -> Result<(), StdioError> {
    let mut payload = serde_json::to_vec(response)?;
    payload.push(b'\n');
    stdout.write_all(&payload).await?;
    stdout.flush().await?;
    Ok(())
}
