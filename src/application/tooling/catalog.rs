//! The fixed tool palette advertised to the oracle.

use std::sync::LazyLock;

use serde_json::json;

use crate::domain::types::ToolDescriptor;

pub const OPEN_URL: &str = "open_url";
pub const FILL_FORM: &str = "fill_form";
pub const CLICK: &str = "click";
pub const GET_TEXT: &str = "get_text";
pub const SCREENSHOT: &str = "screenshot";
pub const API_REQUEST: &str = "api_request";

static CATALOG: LazyLock<Vec<ToolDescriptor>> = LazyLock::new(|| {
    vec![
        ToolDescriptor {
            name: OPEN_URL,
            description: "Open a page; optionally wait for a CSS selector to appear.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "url": { "type": "string", "description": "Absolute URL to open." },
                    "wait_for": {
                        "type": "string",
                        "description": "CSS selector to wait for before continuing."
                    }
                },
                "required": ["url"]
            }),
        },
        ToolDescriptor {
            name: FILL_FORM,
            description: "Fill text into the element matched by a CSS selector.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "selector": { "type": "string" },
                    "value": { "type": "string" }
                },
                "required": ["selector", "value"]
            }),
        },
        ToolDescriptor {
            name: CLICK,
            description: "Click the element matched by a CSS selector.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "selector": { "type": "string" }
                },
                "required": ["selector"]
            }),
        },
        ToolDescriptor {
            name: GET_TEXT,
            description: "Return the trimmed text content of a matched element.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "selector": { "type": "string" }
                },
                "required": ["selector"]
            }),
        },
        ToolDescriptor {
            name: SCREENSHOT,
            description: "Take a full-page screenshot and persist it to the artifact store.",
            input_schema: json!({
                "type": "object",
                "properties": {}
            }),
        },
        ToolDescriptor {
            name: API_REQUEST,
            description: "Make an HTTP(S) request and return the status code and body.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "url": { "type": "string" },
                    "method": {
                        "type": "string",
                        "description": "HTTP method, default GET."
                    },
                    "headers": {
                        "type": "object",
                        "additionalProperties": { "type": "string" }
                    },
                    "body": { "type": "object", "description": "JSON request body." }
                },
                "required": ["url"]
            }),
        },
    ]
});

/// The catalog is defined once at startup and shared read-only.
pub fn catalog() -> &'static [ToolDescriptor] {
    &CATALOG
}
