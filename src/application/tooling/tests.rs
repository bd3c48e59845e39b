use std::sync::Arc;

use serde_json::{Value, json};

use super::{CommandError, ToolCommand};
use crate::application::testkit::{StubDriver, StubStore, executor_with};
use crate::domain::types::{ToolCall, ToolStatus};

fn call(name: &str, arguments: Value) -> ToolCall {
    ToolCall {
        id: format!("call-{name}"),
        name: name.to_string(),
        arguments,
    }
}

#[test]
fn parse_rejects_unknown_names() {
    let err = ToolCommand::parse("teleport", &json!({})).unwrap_err();
    assert_eq!(err.to_string(), "Unknown tool: teleport");
}

#[test]
fn parse_accepts_null_arguments_for_screenshot() {
    let command = ToolCommand::parse("screenshot", &Value::Null).expect("parses");
    assert_eq!(command, ToolCommand::Screenshot);
}

#[test]
fn parse_reports_missing_required_fields() {
    let err = ToolCommand::parse("open_url", &json!({})).unwrap_err();
    assert!(matches!(err, CommandError::InvalidArguments { tool: "open_url", .. }));
}

#[test]
fn parse_accepts_legacy_body_json_alias() {
    let command = ToolCommand::parse(
        "api_request",
        &json!({"url": "https://api.example.com", "body_json": {"rows": 1}}),
    )
    .expect("parses");
    let ToolCommand::ApiRequest(args) = command else {
        panic!("expected api_request command");
    };
    assert_eq!(args.body, Some(json!({"rows": 1})));
}

#[tokio::test]
async fn unknown_tool_yields_error_result_naming_the_tool() {
    let executor = executor_with(Arc::new(StubDriver::new()), Arc::new(StubStore::new("b")));

    let result = executor.execute(&call("teleport", json!({}))).await;

    assert_eq!(result.status, ToolStatus::Error);
    assert_eq!(result.tool, "teleport");
    assert_eq!(result.message(), Some("Unknown tool: teleport"));
}

#[tokio::test]
async fn open_url_navigates_waits_and_reports_current_url() {
    let driver = Arc::new(StubDriver::new());
    let executor = executor_with(driver.clone(), Arc::new(StubStore::new("b")));

    let result = executor
        .execute(&call(
            "open_url",
            json!({"url": "https://convertcase.net/", "wait_for": "textarea"}),
        ))
        .await;

    assert_eq!(result.status, ToolStatus::Ok);
    assert_eq!(result.payload["current_url"], "https://convertcase.net/");
    assert_eq!(
        driver.ops(),
        vec![
            "navigate:https://convertcase.net/".to_string(),
            "wait_for:textarea".to_string(),
        ]
    );
}

#[tokio::test]
async fn open_url_wait_timeout_becomes_error_result() {
    let driver = Arc::new(StubDriver::new());
    driver.fail_timeout("wait_for:#never");
    let executor = executor_with(driver, Arc::new(StubStore::new("b")));

    let result = executor
        .execute(&call(
            "open_url",
            json!({"url": "https://example.com", "wait_for": "#never"}),
        ))
        .await;

    assert_eq!(result.status, ToolStatus::Error);
    assert!(result.message().unwrap().contains("timed out"));
}

#[tokio::test]
async fn missing_selector_becomes_error_result() {
    let driver = Arc::new(StubDriver::new());
    driver.fail_missing("click:#submit");
    let executor = executor_with(driver, Arc::new(StubStore::new("b")));

    let result = executor
        .execute(&call("click", json!({"selector": "#submit"})))
        .await;

    assert_eq!(result.status, ToolStatus::Error);
    assert!(result.message().unwrap().contains("no element matched"));
}

#[tokio::test]
async fn get_text_returns_trimmed_dom_text() {
    let driver = Arc::new(StubDriver::new());
    driver.set_value("#result", "JACK, NAME");
    let executor = executor_with(driver, Arc::new(StubStore::new("b")));

    let result = executor
        .execute(&call("get_text", json!({"selector": "#result"})))
        .await;

    assert_eq!(result.status, ToolStatus::Ok);
    assert_eq!(result.payload["text"], "JACK, NAME");
}

#[tokio::test]
async fn screenshot_uploads_under_generated_key() {
    let store = Arc::new(StubStore::new("worker-artifacts"));
    let executor = executor_with(Arc::new(StubDriver::new()), store.clone());

    let result = executor.execute(&call("screenshot", json!({}))).await;

    assert_eq!(result.status, ToolStatus::Ok);
    let uri = result.payload["s3"].as_str().expect("uri present");
    assert!(uri.starts_with("s3://worker-artifacts/digital-worker/screens/"));
    assert!(uri.ends_with(".png"));

    let keys = store.keys();
    assert_eq!(keys.len(), 1);
}

#[tokio::test]
async fn failed_upload_becomes_error_result() {
    let store = Arc::new(StubStore::failing("worker-artifacts"));
    let executor = executor_with(Arc::new(StubDriver::new()), store);

    let result = executor.execute(&call("screenshot", json!({}))).await;

    assert_eq!(result.status, ToolStatus::Error);
    assert!(result.message().unwrap().contains("failed to upload"));
}

#[tokio::test]
async fn api_request_rejects_malformed_method_without_sending() {
    let executor = executor_with(Arc::new(StubDriver::new()), Arc::new(StubStore::new("b")));

    let result = executor
        .execute(&call(
            "api_request",
            json!({"url": "https://api.example.com", "method": "NOT A METHOD"}),
        ))
        .await;

    assert_eq!(result.status, ToolStatus::Error);
    assert!(result.message().unwrap().contains("invalid HTTP method"));
}
