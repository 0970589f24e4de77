//! Message types for conversations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::tool::ToolCall;

/// The role of a message in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum Role {
    /// System message (instructions)
    System,
    /// User message
    User,
    /// Assistant message
    Assistant,
    /// Tool message (function result)
    Tool,
}

/// A finalized message in a conversation.
///
/// Exactly one assistant `Message` is produced per stream, by finalizing the
/// accumulator; it is immutable from that point on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// The role of the message sender
    pub role: Role,
    /// The text content of the message
    pub content: String,
    /// Tool calls issued while producing this message, in creation order
    pub tool_calls: Vec<ToolCall>,
    /// Correlation token for conversational continuity, if the stream carried one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_id: Option<String>,
    /// When the message was finalized
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a simple text message with no tool calls
    pub fn text(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            content: text.into(),
            tool_calls: Vec::new(),
            response_id: None,
            timestamp: Utc::now(),
        }
    }

    /// Create a user message
    pub fn user(text: impl Into<String>) -> Self {
        Self::text(Role::User, text)
    }

    /// Create an assistant message
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::text(Role::Assistant, text)
    }
}
