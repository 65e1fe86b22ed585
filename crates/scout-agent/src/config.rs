use crate::prompts::UserLevel;
use std::time::Duration;

/// Configuration for the session controller
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Model name passed to the chat endpoint
    pub model: String,
    /// User expertise level, selects the system prompt style
    pub user_level: UserLevel,
    /// Sampling temperature
    pub temperature: f32,
    /// Deadline per reasoning-step call; exceeding it is fatal for the turn
    pub reasoning_timeout: Duration,
    /// Deadline per tool-adapter call; exceeding it is a recoverable tool failure
    pub tool_timeout: Duration,
}

impl AgentConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }

    pub fn with_user_level(mut self, level: UserLevel) -> Self {
        self.user_level = level;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_reasoning_timeout(mut self, timeout: Duration) -> Self {
        self.reasoning_timeout = timeout;
        self
    }

    pub fn with_tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout = timeout;
        self
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: "gpt-oss:120b-cloud".to_string(),
            user_level: UserLevel::General,
            temperature: 0.3,
            reasoning_timeout: Duration::from_secs(120),
            tool_timeout: Duration::from_secs(30),
        }
    }
}
