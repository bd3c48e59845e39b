use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// One invocation event, as delivered by the hosting environment.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerEvent {
    #[serde(default)]
    pub instruction: String,
    #[serde(default)]
    pub payload: Value,
    #[serde(default)]
    pub payload_text: Option<String>,
}

impl WorkerEvent {
    /// Derive the text to paste into a page from the event payload.
    ///
    /// `payloadText` wins when present and non-empty. A payload array of
    /// objects contributes its comma-joined `name` fields. Anything else is
    /// serialized as compact JSON.
    pub fn paste_text(&self) -> String {
        if let Some(text) = self.payload_text.as_deref()
            && !text.is_empty()
        {
            return text.to_string();
        }

        if let Value::Array(items) = &self.payload {
            let names: Vec<String> = items
                .iter()
                .filter_map(|item| item.get("name"))
                .filter_map(name_to_string)
                .collect();
            if !names.is_empty() {
                return names.join(", ");
            }
        }

        serde_json::to_string(&self.payload).unwrap_or_default()
    }
}

fn name_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) if text.is_empty() => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Ok,
    Error,
}

/// Terminal structured result of one planning-loop invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutcome {
    pub status: RunStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<RunResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RunError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub artifacts: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl RunOutcome {
    pub fn failure(message: impl Into<String>, hint: Option<&str>) -> Self {
        Self {
            status: RunStatus::Error,
            result: None,
            error: Some(RunError {
                message: message.into(),
                hint: hint.map(str::to_string),
            }),
            raw: None,
        }
    }

    /// Degraded outcome for a final model turn that was not parseable as the
    /// required structure. The raw text is preserved for diagnosis.
    pub fn malformed(raw: impl Into<String>) -> Self {
        Self {
            status: RunStatus::Error,
            result: None,
            error: Some(RunError {
                message: "model returned non-JSON final output".to_string(),
                hint: Some("ensure the model returns only the required JSON object".to_string()),
            }),
            raw: Some(raw.into()),
        }
    }
}

/// One action the oracle asked the executor to perform.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolStatus {
    Ok,
    Error,
}

/// Uniform outcome of one tool invocation, fed back to the oracle.
#[derive(Debug, Clone, Serialize)]
pub struct ToolResult {
    pub call_id: String,
    pub tool: String,
    pub status: ToolStatus,
    pub payload: Value,
}

impl ToolResult {
    pub fn ok(call: &ToolCall, payload: Value) -> Self {
        Self {
            call_id: call.id.clone(),
            tool: call.name.clone(),
            status: ToolStatus::Ok,
            payload,
        }
    }

    pub fn error(call: &ToolCall, message: impl Into<String>) -> Self {
        Self {
            call_id: call.id.clone(),
            tool: call.name.clone(),
            status: ToolStatus::Error,
            payload: json!({ "message": message.into() }),
        }
    }

    pub fn message(&self) -> Option<&str> {
        self.payload.get("message").and_then(Value::as_str)
    }
}

/// Reply of one oracle query: free-form text, tool requests, or both.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssistantTurn {
    pub text: Option<String>,
    pub tool_calls: Vec<ToolCall>,
}

impl AssistantTurn {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            tool_calls: Vec::new(),
        }
    }

    pub fn tool_calls(calls: Vec<ToolCall>) -> Self {
        Self {
            text: None,
            tool_calls: calls,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Turn {
    User(String),
    Assistant(AssistantTurn),
    ToolResults(Vec<ToolResult>),
}

/// Append-only conversation owned by one planning-loop run.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.turns.push(Turn::User(text.into()));
    }

    pub fn push_assistant(&mut self, turn: AssistantTurn) {
        self.turns.push(Turn::Assistant(turn));
    }

    pub fn push_tool_results(&mut self, results: Vec<ToolResult>) {
        self.turns.push(Turn::ToolResults(results));
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

/// Catalog entry advertised to the oracle for one tool.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ScriptStatus {
    Success,
    Error,
}

/// Response of the fixed-script pipeline variant.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptReport {
    pub status: ScriptStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_url: Option<String>,
    #[serde(rename = "screenshotS3", skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ScriptReport {
    pub fn success(final_url: String, screenshot: String, extracted: Option<String>) -> Self {
        Self {
            status: ScriptStatus::Success,
            final_url: Some(final_url),
            screenshot: Some(screenshot),
            extracted,
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ScriptStatus::Error,
            final_url: None,
            screenshot: None,
            extracted: None,
            message: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(value: Value) -> WorkerEvent {
        serde_json::from_value(value).expect("event deserializes")
    }

    #[test]
    fn paste_text_prefers_payload_text() {
        let event = event(json!({
            "payloadText": "hello",
            "payload": [{"name": "ignored"}],
        }));
        assert_eq!(event.paste_text(), "hello");
    }

    #[test]
    fn paste_text_ignores_empty_payload_text() {
        let event = event(json!({
            "payloadText": "",
            "payload": [{"name": "jack"}],
        }));
        assert_eq!(event.paste_text(), "jack");
    }

    #[test]
    fn paste_text_joins_names_from_payload_array() {
        let event = event(json!({
            "payload": [
                {"client_id": "1", "name": "jack"},
                {"client_id": "2", "name": "name"},
            ],
        }));
        assert_eq!(event.paste_text(), "jack, name");
    }

    #[test]
    fn paste_text_skips_entries_without_names() {
        let event = event(json!({
            "payload": [{"name": "jack"}, {"client_id": "2"}, {"name": ""}],
        }));
        assert_eq!(event.paste_text(), "jack");
    }

    #[test]
    fn paste_text_falls_back_to_json_dump() {
        let event = event(json!({ "payload": {"rows": 3} }));
        assert_eq!(event.paste_text(), r#"{"rows":3}"#);
    }

    #[test]
    fn run_outcome_round_trips() {
        let outcome = RunOutcome {
            status: RunStatus::Ok,
            result: Some(RunResult {
                summary: "converted".to_string(),
                data: json!({"text": "JACK, NAME"}),
                artifacts: json!({"screenshot_s3": "s3://bucket/key.png"}),
            }),
            error: None,
            raw: None,
        };

        let encoded = serde_json::to_string(&outcome).expect("serializes");
        let decoded: RunOutcome = serde_json::from_str(&encoded).expect("parses");
        assert_eq!(decoded, outcome);
    }

    #[test]
    fn run_outcome_parses_minimal_error_shape() {
        let decoded: RunOutcome =
            serde_json::from_str(r#"{"status":"error","error":{"message":"selector missing"}}"#)
                .expect("parses");
        assert_eq!(decoded.status, RunStatus::Error);
        assert_eq!(decoded.error.unwrap().message, "selector missing");
    }
}
