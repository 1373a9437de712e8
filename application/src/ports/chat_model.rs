//! Chat model port
//!
//! Defines the interface for talking to a chat-completion provider.

use async_trait::async_trait;
use lab_domain::{ChatMessage, ToolDefinition};
use thiserror::Error;

/// Errors that can occur during chat model calls
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Non-success HTTP status. The message keeps the status code and reason
    /// phrase so rate-limit classification can see them.
    #[error("HTTP {status} {reason}: {body}")]
    Http {
        status: u16,
        reason: String,
        body: String,
    },

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("API token not found (set {0})")]
    MissingToken(String),

    #[error("Timeout")]
    Timeout,
}

impl GatewayError {
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// One model turn: either a final answer or a request to run tools
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatCompletion {
    pub message: ChatMessage,
}

impl ChatCompletion {
    pub fn new(message: ChatMessage) -> Self {
        Self { message }
    }

    pub fn wants_tools(&self) -> bool {
        self.message.has_tool_calls()
    }
}

/// Chat-completion client
///
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Model identifier, e.g. `openai/gpt-4o`
    fn name(&self) -> &str;

    /// Send the conversation and the tools the model may call
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> Result<ChatCompletion, GatewayError>;
}
