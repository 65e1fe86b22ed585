//! Bounded-loop session controller
//!
//! A turn takes at most two reasoning steps: one with tools enabled, and
//! (only when the first step requested a tool) one forced final step with
//! tools disabled. There is no open-ended agent loop.

use std::sync::Arc;

use scout_llm::{ChatClient, ChatOptions, ChatRequest, ChatResponse, Message, ToolChoice};
use scout_store::ConversationStore;
use scout_tools::{format_tool_error, ToolExecutor};
use serde_json::{json, Map, Value};

use crate::config::AgentConfig;
use crate::error::AgentError;
use crate::prompts::{self, EMPTY_ANSWER_FALLBACK, FINAL_ANSWER_DIRECTIVE};

/// Phase of a turn, observable in [`TurnOutcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    /// No reasoning step has run yet
    Fresh,
    /// A tool round completed; the forced final step is pending
    AwaitingFinal,
    /// The turn produced its answer
    Done,
}

impl TurnPhase {
    pub fn counter(&self) -> u8 {
        match self {
            Self::Fresh => 0,
            Self::AwaitingFinal => 1,
            Self::Done => 2,
        }
    }
}

/// In-memory state of an open session.
///
/// `session_id` is None until the first turn persists; `messages` is the
/// full transcript sent to the model, including messages reloaded from the
/// store when resuming.
#[derive(Debug)]
pub struct SessionContext {
    pub session_id: Option<String>,
    pub messages: Vec<Message>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self {
            session_id: None,
            messages: Vec::new(),
        }
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a completed turn
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub session_id: String,
    pub answer: String,
    pub phase: TurnPhase,
    /// Name of the tool that ran this turn, if any
    pub tool_used: Option<String>,
}

/// Drives one user query through the bounded reasoning loop and persists
/// the completed exchange.
pub struct SessionController {
    chat_client: Arc<dyn ChatClient>,
    tools: Arc<dyn ToolExecutor>,
    store: ConversationStore,
    config: AgentConfig,
}

impl SessionController {
    pub fn new(
        chat_client: Arc<dyn ChatClient>,
        tools: Arc<dyn ToolExecutor>,
        store: ConversationStore,
        config: AgentConfig,
    ) -> Self {
        Self {
            chat_client,
            tools,
            store,
            config,
        }
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Fresh context for a new session
    pub fn new_context(&self) -> SessionContext {
        SessionContext::new()
    }

    /// Resume a saved session. Tool results are not replayed into the
    /// context; see the store's reload rules.
    pub fn resume(&self, session_id: &str) -> Result<SessionContext, AgentError> {
        let record = self.store.load(session_id)?;
        let messages = self.store.context_messages(&record);
        Ok(SessionContext {
            session_id: Some(record.id),
            messages,
        })
    }

    /// Run one user query to completion.
    ///
    /// On success the exchange is persisted exactly once and the context is
    /// advanced. A reasoning failure aborts the turn with nothing persisted
    /// and the context rolled back to its pre-turn state. A tool failure
    /// never aborts: it becomes a synthetic tool result and the turn still
    /// reaches a final answer.
    pub async fn run_turn(
        &self,
        ctx: &mut SessionContext,
        query: &str,
    ) -> Result<TurnOutcome, AgentError> {
        if ctx.messages.is_empty() {
            ctx.messages
                .push(Message::system(prompts::system_prompt(self.config.user_level)));
        }

        // Persisting a continued session appends only this turn's messages;
        // a fresh session persists everything including the system prompt.
        let new_start = if ctx.session_id.is_some() {
            ctx.messages.len()
        } else {
            0
        };
        let rollback_len = ctx.messages.len();

        ctx.messages.push(Message::human(query));
        tracing::debug!(phase = TurnPhase::Fresh.counter(), query = %query, "Turn started");

        let first = match self.reasoning_step(&ctx.messages, true).await {
            Ok(response) => response,
            Err(e) => {
                ctx.messages.truncate(rollback_len);
                return Err(AgentError::Reasoning(e));
            }
        };

        let mut tool_used = None;

        let answer = if first.has_tool_calls() {
            let mut calls = first.tool_calls.unwrap_or_default();
            if calls.len() > 1 {
                tracing::warn!(
                    requested = calls.len(),
                    "Model requested multiple tool calls; executing only the first"
                );
                calls.truncate(1);
            }
            let call = calls[0].clone();
            let tool_name = call.function.name.clone();

            ctx.messages
                .push(Message::ai_with_tools(first.content.clone(), calls));

            let result = self.run_tool(&call.function.name, &call.function.arguments).await;
            let tool_output = match result {
                Ok(output) => {
                    tracing::debug!(tool = %tool_name, "Tool call succeeded");
                    output
                }
                Err(e) => {
                    tracing::warn!(tool = %tool_name, error = %e, "Tool call failed");
                    format_tool_error(&e, &tool_name)
                }
            };
            ctx.messages.push(Message::tool_result(call.id, tool_output));
            tool_used = Some(tool_name);

            tracing::debug!(phase = TurnPhase::AwaitingFinal.counter(), "Forcing final answer");
            ctx.messages.push(Message::human(FINAL_ANSWER_DIRECTIVE));

            let last = match self.reasoning_step(&ctx.messages, false).await {
                Ok(response) => response,
                Err(e) => {
                    ctx.messages.truncate(rollback_len);
                    return Err(AgentError::Reasoning(e));
                }
            };
            extract_answer(&last)
        } else {
            // Direct answer, no tool round needed
            extract_answer(&first)
        };

        ctx.messages.push(Message::ai(answer.clone()));

        let session_id = self.store.create_or_append(
            ctx.session_id.as_deref(),
            query,
            &answer,
            &ctx.messages[new_start..],
            Vec::new(),
            self.turn_metadata(),
        )?;
        ctx.session_id = Some(session_id.clone());

        tracing::debug!(phase = TurnPhase::Done.counter(), session_id = %session_id, "Turn complete");
        Ok(TurnOutcome {
            session_id,
            answer,
            phase: TurnPhase::Done,
            tool_used,
        })
    }

    /// One chat call with a deadline. `with_tools` advertises the toolkit
    /// and lets the model decide; otherwise tool use is disabled outright.
    async fn reasoning_step(
        &self,
        messages: &[Message],
        with_tools: bool,
    ) -> anyhow::Result<ChatResponse> {
        let mut options = ChatOptions::new().temperature(self.config.temperature);
        if with_tools {
            options = options
                .tools(self.tools.tool_definitions())
                .tool_choice(ToolChoice::auto());
        } else {
            options = options.tool_choice(ToolChoice::none());
        }

        let request =
            ChatRequest::new(&self.config.model, messages.to_vec()).with_options(options);

        match tokio::time::timeout(self.config.reasoning_timeout, self.chat_client.chat(request))
            .await
        {
            Ok(result) => result,
            Err(_) => anyhow::bail!(
                "Chat call exceeded {}s deadline",
                self.config.reasoning_timeout.as_secs()
            ),
        }
    }

    /// Execute one tool call with a deadline. Bad argument JSON and
    /// timeouts surface as ordinary tool errors.
    async fn run_tool(&self, tool_name: &str, raw_arguments: &str) -> anyhow::Result<String> {
        let arguments: Value = serde_json::from_str(raw_arguments)
            .map_err(|e| anyhow::anyhow!("Invalid tool arguments: {}", e))?;

        match tokio::time::timeout(
            self.config.tool_timeout,
            self.tools.execute(tool_name, arguments),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => anyhow::bail!(
                "Tool {} timed out after {}s",
                tool_name,
                self.config.tool_timeout.as_secs()
            ),
        }
    }

    fn turn_metadata(&self) -> Map<String, Value> {
        let mut metadata = Map::new();
        metadata.insert("model".to_string(), json!(self.config.model));
        metadata.insert("temperature".to_string(), json!(self.config.temperature));
        metadata.insert(
            "user_level".to_string(),
            json!(self.config.user_level.as_str()),
        );
        metadata
    }
}

fn extract_answer(response: &ChatResponse) -> String {
    match response.content.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => EMPTY_ANSWER_FALLBACK.to_string(),
    }
}
