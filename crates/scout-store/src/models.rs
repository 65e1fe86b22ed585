use chrono::{DateTime, Utc};
use scout_llm::Message;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One session record, persisted as a single JSON document.
///
/// Required keys are fixed; `metadata` is free-form and unknown keys in it
/// are preserved verbatim across appends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub exchanges: Vec<Exchange>,
    pub messages: Vec<StoredMessage>,
    #[serde(default)]
    pub citations: Vec<Value>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// One user query paired with its final answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exchange {
    pub query: String,
    pub answer: String,
    pub timestamp: DateTime<Utc>,
}

/// Persisted form of a transcript message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMessage {
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub content: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCallRecord>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    System,
    User,
    Assistant,
    Tool,
}

/// Tool-call descriptor recorded alongside an assistant message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRecord {
    pub name: String,
    pub arguments: Value,
}

/// Summary row returned by `ConversationStore::list`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub first_query: String,
    pub exchange_count: usize,
}

impl From<&Message> for StoredMessage {
    fn from(msg: &Message) -> Self {
        match msg {
            Message::System { content } => Self {
                kind: MessageKind::System,
                content: content.clone(),
                tool_calls: None,
                tool_call_id: None,
            },
            Message::Human { content } => Self {
                kind: MessageKind::User,
                content: content.clone(),
                tool_calls: None,
                tool_call_id: None,
            },
            Message::AI {
                content,
                tool_calls,
            } => Self {
                kind: MessageKind::Assistant,
                content: content.clone().unwrap_or_default(),
                tool_calls: tool_calls.as_ref().map(|calls| {
                    calls
                        .iter()
                        .map(|call| ToolCallRecord {
                            name: call.function.name.clone(),
                            arguments: call
                                .arguments_value()
                                .unwrap_or_else(|_| Value::String(call.function.arguments.clone())),
                        })
                        .collect()
                }),
                tool_call_id: None,
            },
            Message::Tool {
                tool_call_id,
                content,
            } => Self {
                kind: MessageKind::Tool,
                content: content.clone(),
                tool_calls: None,
                tool_call_id: Some(tool_call_id.clone()),
            },
        }
    }
}

impl StoredMessage {
    /// Reconstruct the live message for session continuation.
    ///
    /// Tool results are transient working memory and are not reloaded.
    /// Assistant entries come back as plain text: replaying a tool-call
    /// descriptor without its paired result would hand the model a dangling
    /// call.
    pub fn to_context_message(&self) -> Option<Message> {
        match self.kind {
            MessageKind::System => Some(Message::system(self.content.clone())),
            MessageKind::User => Some(Message::human(self.content.clone())),
            MessageKind::Assistant => Some(Message::ai(self.content.clone())),
            MessageKind::Tool => None,
        }
    }
}
