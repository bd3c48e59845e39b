//! Bedrock Converse oracle implementation.

use async_trait::async_trait;
use aws_sdk_bedrockruntime::Client;
use aws_sdk_bedrockruntime::types::{
    ContentBlock, ConversationRole, InferenceConfiguration, Message, SystemContentBlock, Tool,
    ToolConfiguration, ToolInputSchema, ToolResultBlock, ToolResultContentBlock, ToolResultStatus,
    ToolSpecification, ToolUseBlock,
};
use tracing::{debug, info};

use super::{Oracle, OracleError, document_to_json, json_to_document};
use crate::domain::types::{
    AssistantTurn, Conversation, ToolCall, ToolDescriptor, ToolResult, ToolStatus, Turn,
};

const DEFAULT_TEMPERATURE: f32 = 0.2;
const DEFAULT_MAX_TOKENS: i32 = 2048;

/// Oracle backed by the Bedrock Converse API with tool use enabled.
pub struct BedrockOracle {
    client: Client,
    model_id: String,
    temperature: f32,
    max_tokens: i32,
}

impl BedrockOracle {
    pub fn new(sdk_config: &aws_config::SdkConfig, model_id: impl Into<String>) -> Self {
        Self {
            client: Client::new(sdk_config),
            model_id: model_id.into(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

#[async_trait]
impl Oracle for BedrockOracle {
    async fn plan(
        &self,
        system: &str,
        tools: &[ToolDescriptor],
        conversation: &Conversation,
    ) -> Result<AssistantTurn, OracleError> {
        info!(
            model = %self.model_id,
            turns = conversation.len(),
            "querying model for the next plan"
        );

        let mut request = self
            .client
            .converse()
            .model_id(&self.model_id)
            .system(SystemContentBlock::Text(system.to_string()))
            .inference_config(
                InferenceConfiguration::builder()
                    .temperature(self.temperature)
                    .max_tokens(self.max_tokens)
                    .build(),
            );
        if !tools.is_empty() {
            request = request.tool_config(tool_configuration(tools)?);
        }
        for message in conversation_messages(conversation)? {
            request = request.messages(message);
        }

        let response = request.send().await.map_err(OracleError::invoke)?;

        let message = response
            .output()
            .ok_or(OracleError::EmptyReply)?
            .as_message()
            .map_err(|_| OracleError::EmptyReply)?
            .clone();

        let mut text_parts: Vec<String> = Vec::new();
        let mut tool_calls: Vec<ToolCall> = Vec::new();
        for block in message.content() {
            match block {
                ContentBlock::Text(text) => text_parts.push(text.clone()),
                ContentBlock::ToolUse(tool_use) => tool_calls.push(ToolCall {
                    id: tool_use.tool_use_id().to_string(),
                    name: tool_use.name().to_string(),
                    arguments: document_to_json(tool_use.input()),
                }),
                _ => {}
            }
        }

        debug!(
            text = !text_parts.is_empty(),
            tool_calls = tool_calls.len(),
            "model reply received"
        );

        Ok(AssistantTurn {
            text: if text_parts.is_empty() {
                None
            } else {
                Some(text_parts.join("\n"))
            },
            tool_calls,
        })
    }
}

fn tool_configuration(tools: &[ToolDescriptor]) -> Result<ToolConfiguration, OracleError> {
    let mut builder = ToolConfiguration::builder();
    for descriptor in tools {
        let spec = ToolSpecification::builder()
            .name(descriptor.name)
            .description(descriptor.description)
            .input_schema(ToolInputSchema::Json(json_to_document(
                &descriptor.input_schema,
            )))
            .build()
            .map_err(|err| OracleError::request(err.to_string()))?;
        builder = builder.tools(Tool::ToolSpec(spec));
    }
    builder
        .build()
        .map_err(|err| OracleError::request(err.to_string()))
}

fn conversation_messages(conversation: &Conversation) -> Result<Vec<Message>, OracleError> {
    conversation.turns().iter().map(message_for_turn).collect()
}

fn message_for_turn(turn: &Turn) -> Result<Message, OracleError> {
    let (role, blocks) = match turn {
        Turn::User(text) => (
            ConversationRole::User,
            vec![ContentBlock::Text(text.clone())],
        ),
        Turn::Assistant(reply) => {
            let mut blocks = Vec::new();
            if let Some(text) = &reply.text {
                blocks.push(ContentBlock::Text(text.clone()));
            }
            for call in &reply.tool_calls {
                let block = ToolUseBlock::builder()
                    .tool_use_id(&call.id)
                    .name(&call.name)
                    .input(json_to_document(&call.arguments))
                    .build()
                    .map_err(|err| OracleError::request(err.to_string()))?;
                blocks.push(ContentBlock::ToolUse(block));
            }
            (ConversationRole::Assistant, blocks)
        }
        Turn::ToolResults(results) => {
            let mut blocks = Vec::new();
            for result in results {
                blocks.push(ContentBlock::ToolResult(tool_result_block(result)?));
            }
            (ConversationRole::User, blocks)
        }
    };

    Message::builder()
        .role(role)
        .set_content(Some(blocks))
        .build()
        .map_err(|err| OracleError::request(err.to_string()))
}

fn tool_result_block(result: &ToolResult) -> Result<ToolResultBlock, OracleError> {
    let status = match result.status {
        ToolStatus::Ok => ToolResultStatus::Success,
        ToolStatus::Error => ToolResultStatus::Error,
    };
    ToolResultBlock::builder()
        .tool_use_id(&result.call_id)
        .content(ToolResultContentBlock::Json(json_to_document(
            &result.payload,
        )))
        .status(status)
        .build()
        .map_err(|err| OracleError::request(err.to_string()))
}
