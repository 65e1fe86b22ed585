use serde::{Deserialize, Serialize};

use super::tool::ToolCall;

/// Scout message types (high-level, provider-agnostic)
///
/// Serializes directly to the OpenAI-compatible wire format, so a message
/// sequence can be sent to the chat endpoint without conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Message {
    /// System prompt (instructions)
    System { content: String },

    /// User/Human message
    #[serde(rename = "user")]
    Human { content: String },

    /// Assistant/AI message; carries tool calls when the model requested one
    #[serde(rename = "assistant")]
    AI {
        #[serde(skip_serializing_if = "Option::is_none")]
        content: Option<String>,

        #[serde(skip_serializing_if = "Option::is_none")]
        tool_calls: Option<Vec<ToolCall>>,
    },

    /// Tool result message
    Tool {
        tool_call_id: String,
        content: String,
    },
}

impl Message {
    /// Create system message
    pub fn system(content: impl Into<String>) -> Self {
        Self::System {
            content: content.into(),
        }
    }

    /// Create human message
    pub fn human(content: impl Into<String>) -> Self {
        Self::Human {
            content: content.into(),
        }
    }

    /// Create AI message with text
    pub fn ai(content: impl Into<String>) -> Self {
        Self::AI {
            content: Some(content.into()),
            tool_calls: None,
        }
    }

    /// Create AI message carrying tool calls
    pub fn ai_with_tools(content: Option<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self::AI {
            content,
            tool_calls: Some(tool_calls),
        }
    }

    /// Create tool result message
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::Tool {
            tool_call_id: tool_call_id.into(),
            content: content.into(),
        }
    }

    /// Get role as string
    pub fn role(&self) -> &str {
        match self {
            Self::System { .. } => "system",
            Self::Human { .. } => "user",
            Self::AI { .. } => "assistant",
            Self::Tool { .. } => "tool",
        }
    }

    /// Text content, if any
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::System { content } | Self::Human { content } | Self::Tool { content, .. } => {
                Some(content)
            }
            Self::AI { content, .. } => content.as_deref(),
        }
    }

    /// Tool calls requested by an assistant message
    pub fn tool_calls(&self) -> Option<&[ToolCall]> {
        match self {
            Self::AI {
                tool_calls: Some(calls),
                ..
            } => Some(calls),
            _ => None,
        }
    }
}
