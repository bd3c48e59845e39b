use std::error::Error;
use std::sync::Arc;

use aws_config::{BehaviorVersion, Region};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use digital_worker::application::stdio;
use digital_worker::cli::{Cli, RunMode};
use digital_worker::config::WorkerConfig;
use digital_worker::infrastructure::browser::{AgentCoreBroker, CdpDriverFactory};
use digital_worker::infrastructure::http::HttpRequester;
use digital_worker::infrastructure::oracle::BedrockOracle;
use digital_worker::infrastructure::storage::S3ArtifactStore;
use digital_worker::Worker;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();
    let cli = Cli::parse();
    let config = WorkerConfig::from_env()?;
    info!(
        model = %config.model_id,
        browser = %config.browser_identifier,
        bucket = %config.artifact_bucket,
        "digital worker starting"
    );

    let sdk_config = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.region.clone()))
        .load()
        .await;

    let worker = Arc::new(Worker::new(
        config.clone(),
        Arc::new(AgentCoreBroker::new(
            &sdk_config,
            config.browser_identifier.clone(),
        )),
        Arc::new(CdpDriverFactory),
        Arc::new(S3ArtifactStore::new(
            &sdk_config,
            config.artifact_bucket.clone(),
        )),
        Arc::new(BedrockOracle::new(&sdk_config, config.model_id.clone())),
        HttpRequester::new(config.timeouts.http)?,
    ));

    match cli.mode {
        RunMode::Agent => {
            let event = cli.load_event()?;
            let outcome = worker.run_agent(&event).await;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        RunMode::Script => {
            let event = cli.load_event()?;
            let report = worker.run_script(&event).await;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        RunMode::Serve => {
            info!("entering serve mode; awaiting JSON event lines");
            stdio::run(worker).await?;
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
