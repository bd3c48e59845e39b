//! Shared test doubles for the application layer.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::application::tooling::ToolExecutor;
use crate::config::WorkerConfig;
use crate::domain::types::{AssistantTurn, Conversation, ToolDescriptor};
use crate::infrastructure::browser::{
    BrokerError, BrowserSession, DriverError, PageDriver, PageDriverFactory, SessionBroker,
};
use crate::infrastructure::http::HttpRequester;
use crate::infrastructure::oracle::{Oracle, OracleError};
use crate::infrastructure::storage::{ArtifactStore, StoreError};

pub(crate) fn test_config() -> WorkerConfig {
    WorkerConfig::from_source(|name| match name {
        "ARTIFACT_BUCKET" => Some("worker-artifacts".to_string()),
        _ => None,
    })
    .expect("test config resolves")
}

pub(crate) fn test_http() -> HttpRequester {
    HttpRequester::new(Duration::from_secs(5)).expect("http client builds")
}

pub(crate) fn executor_with(driver: Arc<StubDriver>, store: Arc<StubStore>) -> ToolExecutor {
    let config = test_config();
    ToolExecutor::new(
        driver,
        store,
        test_http(),
        config.artifact_prefix,
        config.timeouts,
    )
}

#[derive(Debug, Clone, Copy)]
enum StubFailure {
    Timeout,
    Missing,
}

/// Page driver stub: records every operation, serves configured values, and
/// fails operations on demand.
#[derive(Default)]
pub(crate) struct StubDriver {
    ops: Mutex<Vec<String>>,
    values: Mutex<HashMap<String, String>>,
    failures: Mutex<HashMap<String, StubFailure>>,
    url: Mutex<String>,
}

impl StubDriver {
    pub fn new() -> Self {
        Self {
            url: Mutex::new("about:blank".to_string()),
            ..Self::default()
        }
    }

    pub fn set_value(&self, selector: &str, value: &str) {
        self.values
            .lock()
            .unwrap()
            .insert(selector.to_string(), value.to_string());
    }

    /// Make the operation recorded under `op` fail with a timeout.
    pub fn fail_timeout(&self, op: &str) {
        self.failures
            .lock()
            .unwrap()
            .insert(op.to_string(), StubFailure::Timeout);
    }

    /// Make the operation recorded under `op` fail with a missing selector.
    pub fn fail_missing(&self, op: &str) {
        self.failures
            .lock()
            .unwrap()
            .insert(op.to_string(), StubFailure::Missing);
    }

    pub fn ops(&self) -> Vec<String> {
        self.ops.lock().unwrap().clone()
    }

    fn record(&self, op: String) -> Result<(), DriverError> {
        let failure = self.failures.lock().unwrap().get(&op).copied();
        self.ops.lock().unwrap().push(op.clone());
        match failure {
            Some(StubFailure::Timeout) => Err(DriverError::Timeout {
                what: op,
                timeout: Duration::from_secs(15),
            }),
            Some(StubFailure::Missing) => Err(DriverError::SelectorNotFound(op)),
            None => Ok(()),
        }
    }

    fn value_of(&self, selector: &str) -> String {
        self.values
            .lock()
            .unwrap()
            .get(selector)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl PageDriver for StubDriver {
    async fn navigate(&self, url: &str, _timeout: Duration) -> Result<(), DriverError> {
        self.record(format!("navigate:{url}"))?;
        *self.url.lock().unwrap() = url.to_string();
        Ok(())
    }

    async fn wait_for(&self, selector: &str, _timeout: Duration) -> Result<(), DriverError> {
        self.record(format!("wait_for:{selector}"))
    }

    async fn fill(
        &self,
        selector: &str,
        value: &str,
        _timeout: Duration,
    ) -> Result<(), DriverError> {
        self.record(format!("fill:{selector}={value}"))
    }

    async fn click(&self, selector: &str, _timeout: Duration) -> Result<(), DriverError> {
        self.record(format!("click:{selector}"))
    }

    async fn click_by_text(&self, label: &str, _timeout: Duration) -> Result<(), DriverError> {
        self.record(format!("click_text:{label}"))
    }

    async fn read_text(&self, selector: &str, _timeout: Duration) -> Result<String, DriverError> {
        self.record(format!("read_text:{selector}"))?;
        Ok(self.value_of(selector))
    }

    async fn read_value(&self, selector: &str, _timeout: Duration) -> Result<String, DriverError> {
        self.record(format!("read_value:{selector}"))?;
        Ok(self.value_of(selector))
    }

    async fn screenshot(&self) -> Result<Vec<u8>, DriverError> {
        self.record("screenshot".to_string())?;
        Ok(vec![0x89, b'P', b'N', b'G'])
    }

    async fn current_url(&self) -> Result<String, DriverError> {
        Ok(self.url.lock().unwrap().clone())
    }
}

/// Artifact store stub: records keys, returns deterministic locators.
pub(crate) struct StubStore {
    bucket: String,
    keys: Mutex<Vec<String>>,
    fail: bool,
}

impl StubStore {
    pub fn new(bucket: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            keys: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn failing(bucket: &str) -> Self {
        Self {
            fail: true,
            ..Self::new(bucket)
        }
    }

    pub fn keys(&self) -> Vec<String> {
        self.keys.lock().unwrap().clone()
    }
}

#[async_trait]
impl ArtifactStore for StubStore {
    async fn put_png(&self, key: &str, _bytes: Vec<u8>) -> Result<String, StoreError> {
        if self.fail {
            return Err(StoreError::upload(key, std::io::Error::other("denied")));
        }
        self.keys.lock().unwrap().push(key.to_string());
        Ok(format!("s3://{}/{}", self.bucket, key))
    }
}

/// Oracle stub fed with a fixed sequence of replies; records every
/// conversation it was shown.
pub(crate) struct ScriptedOracle {
    replies: Mutex<VecDeque<AssistantTurn>>,
    repeated: Option<AssistantTurn>,
    fail: bool,
    seen: Mutex<Vec<Conversation>>,
}

impl ScriptedOracle {
    pub fn new(replies: Vec<AssistantTurn>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            repeated: None,
            fail: false,
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Returns the same reply forever.
    pub fn repeating(reply: AssistantTurn) -> Self {
        Self {
            repeated: Some(reply),
            ..Self::new(Vec::new())
        }
    }

    /// Fails every query.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(Vec::new())
        }
    }

    pub fn seen(&self) -> Vec<Conversation> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Oracle for ScriptedOracle {
    async fn plan(
        &self,
        _system: &str,
        _tools: &[ToolDescriptor],
        conversation: &Conversation,
    ) -> Result<AssistantTurn, OracleError> {
        if self.fail {
            return Err(OracleError::invoke(std::io::Error::other(
                "model unavailable",
            )));
        }
        self.seen.lock().unwrap().push(conversation.clone());
        if let Some(reply) = self.replies.lock().unwrap().pop_front() {
            return Ok(reply);
        }
        self.repeated.clone().ok_or(OracleError::EmptyReply)
    }
}

/// Session broker stub counting open/close calls.
pub(crate) struct CountingBroker {
    opens: AtomicUsize,
    closes: AtomicUsize,
    fail_open: bool,
    fail_close: bool,
}

impl CountingBroker {
    pub fn new() -> Self {
        Self {
            opens: AtomicUsize::new(0),
            closes: AtomicUsize::new(0),
            fail_open: false,
            fail_close: false,
        }
    }

    pub fn fail_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    pub fn fail_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionBroker for CountingBroker {
    async fn open(&self, _lifetime: Duration) -> Result<BrowserSession, BrokerError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        if self.fail_open {
            return Err(BrokerError::start(std::io::Error::other("quota exceeded")));
        }
        Ok(BrowserSession {
            id: "session-1".to_string(),
            cdp_endpoint: "wss://stub.invalid/cdp".to_string(),
        })
    }

    async fn close(&self, session: &BrowserSession) -> Result<(), BrokerError> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        if self.fail_close {
            return Err(BrokerError::stop(
                &session.id,
                std::io::Error::other("already gone"),
            ));
        }
        Ok(())
    }
}

/// Driver factory handing out a shared stub driver.
pub(crate) struct StubDriverFactory {
    driver: Arc<StubDriver>,
}

impl StubDriverFactory {
    pub fn new(driver: Arc<StubDriver>) -> Self {
        Self { driver }
    }
}

#[async_trait]
impl PageDriverFactory for StubDriverFactory {
    async fn connect(&self, _session: &BrowserSession) -> Result<Arc<dyn PageDriver>, DriverError> {
        Ok(self.driver.clone())
    }
}
