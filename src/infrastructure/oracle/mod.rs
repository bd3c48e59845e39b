//! Decision-making oracle boundary.

mod bedrock;
mod document;

pub use bedrock::BedrockOracle;
pub(crate) use document::{document_to_json, json_to_document};

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::types::{AssistantTurn, Conversation, ToolDescriptor};
use crate::infrastructure::BoxError;

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("model invocation failed: {source}")]
    Invoke {
        #[source]
        source: BoxError,
    },
    #[error("malformed model request: {reason}")]
    Request { reason: String },
    #[error("model reply carried no message")]
    EmptyReply,
}

impl OracleError {
    pub fn invoke(source: impl Into<BoxError>) -> Self {
        Self::Invoke {
            source: source.into(),
        }
    }

    pub fn request(reason: impl Into<String>) -> Self {
        Self::Request {
            reason: reason.into(),
        }
    }
}

/// Proposes the next action(s) or a final answer for a conversation.
///
/// The underlying model provider is swappable; the planning loop only sees
/// this boundary.
#[async_trait]
pub trait Oracle: Send + Sync {
    async fn plan(
        &self,
        system: &str,
        tools: &[ToolDescriptor],
        conversation: &Conversation,
    ) -> Result<AssistantTurn, OracleError>;
}
