pub mod error;
pub mod models;
pub mod store;

pub use error::{Result, StoreError};
pub use models::{Exchange, MessageKind, SessionRecord, SessionSummary, StoredMessage, ToolCallRecord};
pub use store::ConversationStore;
