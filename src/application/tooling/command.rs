use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use super::catalog;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("invalid arguments for tool '{tool}': {source}")]
    InvalidArguments {
        tool: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// The closed set of operations the worker can perform. One variant per
/// catalog entry keeps dispatch exhaustive at compile time; the string-keyed
/// surface exists only here, where hallucinated names must be tolerated.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolCommand {
    OpenUrl {
        url: String,
        wait_for: Option<String>,
    },
    FillForm {
        selector: String,
        value: String,
    },
    Click {
        selector: String,
    },
    GetText {
        selector: String,
    },
    Screenshot,
    ApiRequest(ApiRequestArgs),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApiRequestArgs {
    pub url: String,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub headers: Option<HashMap<String, String>>,
    #[serde(default, alias = "body_json")]
    pub body: Option<Value>,
}

#[derive(Deserialize)]
struct OpenUrlArgs {
    url: String,
    #[serde(default)]
    wait_for: Option<String>,
}

#[derive(Deserialize)]
struct FillFormArgs {
    selector: String,
    value: String,
}

#[derive(Deserialize)]
struct SelectorArgs {
    selector: String,
}

impl ToolCommand {
    pub fn parse(name: &str, arguments: &Value) -> Result<Self, CommandError> {
        match name {
            catalog::OPEN_URL => {
                let args: OpenUrlArgs = parse_args(catalog::OPEN_URL, arguments)?;
                Ok(Self::OpenUrl {
                    url: args.url,
                    wait_for: args.wait_for,
                })
            }
            catalog::FILL_FORM => {
                let args: FillFormArgs = parse_args(catalog::FILL_FORM, arguments)?;
                Ok(Self::FillForm {
                    selector: args.selector,
                    value: args.value,
                })
            }
            catalog::CLICK => {
                let args: SelectorArgs = parse_args(catalog::CLICK, arguments)?;
                Ok(Self::Click {
                    selector: args.selector,
                })
            }
            catalog::GET_TEXT => {
                let args: SelectorArgs = parse_args(catalog::GET_TEXT, arguments)?;
                Ok(Self::GetText {
                    selector: args.selector,
                })
            }
            catalog::SCREENSHOT => Ok(Self::Screenshot),
            catalog::API_REQUEST => Ok(Self::ApiRequest(parse_args(
                catalog::API_REQUEST,
                arguments,
            )?)),
            other => Err(CommandError::UnknownTool(other.to_string())),
        }
    }
}

fn parse_args<T: serde::de::DeserializeOwned>(
    tool: &'static str,
    arguments: &Value,
) -> Result<T, CommandError> {
    let normalized = match arguments {
        Value::Null => Value::Object(Map::new()),
        other => other.clone(),
    };
    serde_json::from_value(normalized)
        .map_err(|source| CommandError::InvalidArguments { tool, source })
}
