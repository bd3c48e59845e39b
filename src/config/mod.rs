use std::env;
use std::sync::Once;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

pub const DEFAULT_BROWSER_IDENTIFIER: &str = "aws.browser.v1";
pub const DEFAULT_MODEL_ID: &str = "anthropic.claude-3-5-sonnet-20240620-v1:0";
pub const DEFAULT_REGION: &str = "us-west-2";
pub const DEFAULT_ARTIFACT_PREFIX: &str = "digital-worker/screens";
pub const DEFAULT_MAX_AGENT_STEPS: usize = 8;
pub const DEFAULT_SESSION_TIMEOUT_SECS: u64 = 300;

static ENV_LOADER: Once = Once::new();

/// Ensures environment variables are loaded from a local .env file once.
fn ensure_env_loaded() {
    ENV_LOADER.call_once(|| {
        let _ = dotenvy::dotenv();
    });
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    MissingVar(&'static str),
    #[error("environment variable {name} has invalid value '{value}': expected {expected}")]
    Invalid {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Per-call budgets for external operations.
#[derive(Debug, Clone)]
pub struct Timeouts {
    pub navigation: Duration,
    pub script_navigation: Duration,
    pub selector: Duration,
    pub interaction: Duration,
    pub http: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            navigation: Duration::from_secs(30),
            script_navigation: Duration::from_secs(60),
            selector: Duration::from_secs(15),
            interaction: Duration::from_secs(15),
            http: Duration::from_secs(30),
        }
    }
}

/// Environment-sourced worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub artifact_bucket: String,
    pub artifact_prefix: String,
    pub browser_identifier: String,
    pub model_id: String,
    pub region: String,
    pub max_agent_steps: usize,
    pub session_timeout: Duration,
    pub run_budget: Option<Duration>,
    pub timeouts: Timeouts,
}

impl WorkerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        ensure_env_loaded();
        Self::from_source(|name| env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_source(
        source: impl Fn(&'static str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let artifact_bucket = source("ARTIFACT_BUCKET")
            .or_else(|| source("BUCKET"))
            .filter(|value| !value.trim().is_empty())
            .ok_or(ConfigError::MissingVar("ARTIFACT_BUCKET"))?;

        let config = Self {
            artifact_bucket,
            artifact_prefix: source("ARTIFACT_PREFIX")
                .unwrap_or_else(|| DEFAULT_ARTIFACT_PREFIX.to_string()),
            browser_identifier: source("BROWSER_IDENTIFIER")
                .unwrap_or_else(|| DEFAULT_BROWSER_IDENTIFIER.to_string()),
            model_id: source("MODEL_ID").unwrap_or_else(|| DEFAULT_MODEL_ID.to_string()),
            region: source("AWS_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string()),
            max_agent_steps: parse_var(
                "MAX_AGENT_STEPS",
                source("MAX_AGENT_STEPS"),
                DEFAULT_MAX_AGENT_STEPS,
            )?,
            session_timeout: Duration::from_secs(parse_var(
                "SESSION_TIMEOUT_SECS",
                source("SESSION_TIMEOUT_SECS"),
                DEFAULT_SESSION_TIMEOUT_SECS,
            )?),
            run_budget: parse_optional_secs("RUN_BUDGET_SECS", source("RUN_BUDGET_SECS"))?,
            timeouts: Timeouts::default(),
        };

        debug!(
            bucket = %config.artifact_bucket,
            browser = %config.browser_identifier,
            model = %config.model_id,
            "worker configuration resolved"
        );
        Ok(config)
    }
}

fn parse_var<T: std::str::FromStr>(
    name: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
            name,
            value,
            expected: "a positive integer",
        }),
    }
}

fn parse_optional_secs(
    name: &'static str,
    raw: Option<String>,
) -> Result<Option<Duration>, ConfigError> {
    match raw {
        None => Ok(None),
        Some(value) => value
            .parse()
            .map(|secs| Some(Duration::from_secs(secs)))
            .map_err(|_| ConfigError::Invalid {
                name,
                value,
                expected: "a positive integer",
            }),
    }
}
