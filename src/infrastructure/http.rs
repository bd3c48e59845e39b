//! Outbound HTTP calls on behalf of the api_request tool.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::{Client, Method};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Response bodies are truncated to this many characters before they are
/// surfaced to the oracle, to bound conversation growth.
pub const MAX_BODY_CHARS: usize = 5000;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid HTTP method '{0}'")]
    InvalidMethod(String),
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
}

#[derive(Debug, Clone)]
pub struct HttpSummary {
    pub status: u16,
    pub body: String,
}

/// Shared HTTP client with a fixed per-request timeout.
#[derive(Clone)]
pub struct HttpRequester {
    client: Client,
}

impl HttpRequester {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
        })
    }

    /// Issue one request and summarize the response. Non-success status codes
    /// are reported in the summary, not treated as errors.
    pub async fn execute(
        &self,
        url: &str,
        method: Option<&str>,
        headers: &HashMap<String, String>,
        body: Option<&Value>,
    ) -> Result<HttpSummary, HttpError> {
        let method_name = method.unwrap_or("GET").to_uppercase();
        let method = Method::from_bytes(method_name.as_bytes())
            .map_err(|_| HttpError::InvalidMethod(method_name.clone()))?;

        debug!(%method, url, "issuing outbound HTTP request");
        let mut request = self.client.request(method, url);
        for (name, value) in headers {
            request = request.header(name, value);
        }
        if let Some(json) = body {
            request = request.json(json);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = truncate_chars(&response.text().await?, MAX_BODY_CHARS);
        Ok(HttpSummary { status, body })
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((boundary, _)) => text[..boundary].to_string(),
        None => text.to_string(),
    }
}
