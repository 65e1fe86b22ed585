pub mod config;
pub mod controller;
pub mod error;
pub mod prompts;

pub use config::AgentConfig;
pub use controller::{SessionContext, SessionController, TurnOutcome, TurnPhase};
pub use error::AgentError;
pub use prompts::UserLevel;
