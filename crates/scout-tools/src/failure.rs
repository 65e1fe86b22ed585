//! User-facing formatting for tool failures
//!
//! A failed tool call never aborts a turn; the controller feeds the formatted
//! description back to the model as a synthetic tool result so the final
//! answer can acknowledge it.

use std::fmt;

/// Coarse failure category derived from the error text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Timeout,
    NotFound,
    Permission,
    Generic,
}

impl FailureKind {
    pub fn classify(error: &anyhow::Error) -> Self {
        let msg = format!("{:#}", error).to_lowercase();
        if msg.contains("timeout") || msg.contains("timed out") {
            Self::Timeout
        } else if msg.contains("not found") || msg.contains("404") {
            Self::NotFound
        } else if msg.contains("permission") || msg.contains("forbidden") || msg.contains("403") {
            Self::Permission
        } else {
            Self::Generic
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Timeout => "timeout",
            Self::NotFound => "not-found",
            Self::Permission => "permission",
            Self::Generic => "generic",
        };
        write!(f, "{}", s)
    }
}

/// Format a tool error into a message the model can relay to the user,
/// including a suggested next action.
pub fn format_tool_error(error: &anyhow::Error, tool_name: &str) -> String {
    match FailureKind::classify(error) {
        FailureKind::Timeout => format!(
            "The {} tool timed out. Please try again or use a different approach.",
            tool_name
        ),
        FailureKind::NotFound => format!(
            "The {} tool couldn't find the requested resource. Please check the input and try again.",
            tool_name
        ),
        FailureKind::Permission => format!(
            "The {} tool doesn't have permission to access the resource. Please check permissions.",
            tool_name
        ),
        FailureKind::Generic => format!(
            "The {} tool encountered an error: {:#}. Please try an alternative approach.",
            tool_name, error
        ),
    }
}
