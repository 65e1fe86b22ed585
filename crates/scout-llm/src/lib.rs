pub mod ollama;
pub mod traits;
pub mod types;

pub use ollama::OllamaClient;
pub use traits::{ChatClient, ChatOptions, ChatRequest, ChatResponse, TokenUsage};
pub use types::{FunctionCall, FunctionDefinition, Message, Tool, ToolCall, ToolChoice};
