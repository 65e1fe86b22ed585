//! Static prompt templates, keyed by user expertise level

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// User expertise level; selects the communication-style suffix of the
/// system prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserLevel {
    Expert,
    Beginner,
    #[default]
    General,
}

impl UserLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Expert => "expert",
            Self::Beginner => "beginner",
            Self::General => "general",
        }
    }
}

impl FromStr for UserLevel {
    type Err = std::convert::Infallible;

    /// Unknown values fall back to General
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "expert" => Self::Expert,
            "beginner" => Self::Beginner,
            _ => Self::General,
        })
    }
}

const BASE_PROMPT: &str = "\
You are Scout, an expert research assistant with extensive knowledge.

IMPORTANT INSTRUCTIONS:
1. First, try to answer using your built-in knowledge
2. Use web_search ONLY when you need current information, specific data, or verification
3. Use scrape_page ONLY when the user provides a specific URL to analyze
4. After using a tool ONCE, provide your final comprehensive answer immediately
5. DO NOT call multiple tools in sequence - one tool call is enough

Available Tools:
- web_search: Search for current information online (use for recent events, statistics, comparisons)
- scrape_page: Extract content from a specific URL (use only when user provides a URL)

Output Format Requirements:
- Write in clean, plain text format suitable for terminal display
- NO markdown tables - use simple aligned text instead
- NO asterisks for bold - use UPPERCASE or simple emphasis
- Structure with clear headings using numbers or bullets
- Include sources when you used web_search
- Be comprehensive but well-organized
";

/// Directive injected before the forced final reasoning step
pub const FINAL_ANSWER_DIRECTIVE: &str = "\
STOP. You have all the information you need from the tools. Now write a \
comprehensive final answer. Write your answer as plain text. Do NOT call \
any more tools.";

/// Substituted when the forced final completion comes back empty
pub const EMPTY_ANSWER_FALLBACK: &str = "\
I apologize, but I encountered an issue generating the final answer. Please \
try rephrasing your question or asking something different.";

/// System prompt for the given user level
pub fn system_prompt(level: UserLevel) -> String {
    let style = match level {
        UserLevel::Expert => {
            "Communication Style: Use technical terminology and detailed analysis. \
             Assume advanced knowledge."
        }
        UserLevel::Beginner => {
            "Communication Style: Explain concepts in simple terms with examples. \
             Avoid jargon."
        }
        UserLevel::General => {
            "Communication Style: Professional, objective, and informative. Balance \
             technical accuracy with accessibility."
        }
    };

    format!("{}\n{}", BASE_PROMPT, style)
}
