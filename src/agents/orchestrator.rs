//! Conversation orchestrator: the tool-calling loop
//!
//! Each user turn is a pure function of the prior transcript and the new
//! text. No engine-side session is kept; the full history is rebuilt and
//! sent on every round.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::agents::config::{AgentConfig, ToolDispatch};
use crate::agents::domain::{ConversationMessage, ConversationRole, Message, ToolCall};
use crate::agents::error::{AgentError, AgentResult};
use crate::agents::executor::ToolExecutor;
use crate::agents::llm::{CompletionRequest, LlmProvider, TokenUsage};
use crate::agents::tools::ToolRegistry;
use crate::agents::usage::UsageSink;
use crate::catalog::CatalogPort;

/// Engine-facing history for a new user turn.
///
/// Assistant entries map to the model role, user entries to the user role,
/// system entries are dropped. The new user text is appended last.
pub fn build_engine_history(history: &[ConversationMessage], new_user_text: &str) -> Vec<Message> {
    history
        .iter()
        .filter_map(|entry| match entry.role() {
            ConversationRole::User => Some(Message::user(entry.content())),
            ConversationRole::Assistant => Some(Message::assistant(entry.content())),
            ConversationRole::System => None,
        })
        .chain(std::iter::once(Message::user(new_user_text)))
        .collect()
}

/// Drives engine rounds and tool executions until the engine answers in text
pub struct Orchestrator {
    config: AgentConfig,
    llm: Arc<dyn LlmProvider>,
    executor: ToolExecutor,
    registry: ToolRegistry,
    usage: Option<Arc<dyn UsageSink>>,
}

impl Orchestrator {
    pub fn new(config: AgentConfig, llm: Arc<dyn LlmProvider>, catalog: Arc<dyn CatalogPort>) -> Self {
        let executor = ToolExecutor::new(
            catalog,
            config.search_result_limit,
            Duration::from_secs(config.round_timeout_seconds),
        );

        Self {
            config,
            llm,
            executor,
            registry: ToolRegistry::new(),
            usage: None,
        }
    }

    /// Attach a sink that sees every round's usage (typically the
    /// process-wide accumulator)
    pub fn with_usage(mut self, sink: Arc<dyn UsageSink>) -> Self {
        self.usage = Some(sink);
        self
    }

    /// Run one user turn to completion.
    ///
    /// Returns exactly one new assistant message. Tool failures are fed back
    /// to the engine; engine failures, round timeouts and the round cap are
    /// returned as errors, and nothing partial is produced.
    pub async fn send_message(
        &self,
        history: &[ConversationMessage],
        new_user_text: &str,
        on_usage: Option<&dyn UsageSink>,
    ) -> AgentResult<Vec<ConversationMessage>> {
        let text = new_user_text.trim();
        if text.is_empty() {
            return Err(AgentError::Validation("message must not be empty".to_string()));
        }

        let mut messages = Vec::new();
        if let Some(system) = &self.config.system_prompt {
            messages.push(Message::system(system));
        }
        messages.extend(build_engine_history(history, text));

        let tools = self.registry.definitions();
        let round_timeout = Duration::from_secs(self.config.round_timeout_seconds);

        for round in 1..=self.config.max_rounds {
            let request = CompletionRequest {
                messages: messages.clone(),
                temperature: self.config.temperature,
                tools: Some(tools.clone()),
                ..Default::default()
            };

            let response = tokio::time::timeout(round_timeout, self.llm.complete(request))
                .await
                .map_err(|_| AgentError::Timeout(self.config.round_timeout_seconds))??;

            if let Some(usage) = &response.usage {
                self.record_usage(usage, on_usage);
            }

            let requested = response.message.requested_tools();
            if requested.is_empty() {
                debug!("Round {}: final answer ({} chars)", round, response.message.content.len());
                if response.message.content.is_empty() {
                    warn!("Engine finished with empty text ({:?})", response.finish_reason);
                }
                return Ok(vec![ConversationMessage::assistant(response.message.content)]);
            }

            let selected = self.select_calls(requested);
            debug!(
                "Round {}: engine requested {} tool call(s), executing {}",
                round,
                requested.len(),
                selected.len()
            );

            // Only executed calls go into the history so every call has a response
            messages.push(Message::assistant_with_tools(
                response.message.content.clone(),
                selected.clone(),
            ));

            for call in &selected {
                let result = self.executor.execute(call).await;
                messages.push(Message::tool_result(
                    &result.tool_call_id,
                    &result.tool_name,
                    &result.payload,
                ));
            }
        }

        warn!("Giving up after {} rounds without a final answer", self.config.max_rounds);
        Err(AgentError::LoopExceeded(self.config.max_rounds))
    }

    fn select_calls(&self, requested: &[ToolCall]) -> Vec<ToolCall> {
        match self.config.tool_dispatch {
            ToolDispatch::First => {
                if requested.len() > 1 {
                    info!(
                        "Executing only '{}'; ignoring {} further call(s) this round",
                        requested[0].name,
                        requested.len() - 1
                    );
                }
                requested[..1].to_vec()
            }
            ToolDispatch::All => requested.to_vec(),
        }
    }

    fn record_usage(&self, usage: &TokenUsage, on_usage: Option<&dyn UsageSink>) {
        if let Some(sink) = &self.usage {
            sink.record(usage);
        }
        if let Some(sink) = on_usage {
            sink.record(usage);
        }
    }
}

/// Caller-side transcript.
///
/// Appends the user entry for every send and the assistant entry only on
/// success, so a failed turn never leaves partial tool output behind.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<ConversationMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Send `text` through `orchestrator` and record the outcome.
    ///
    /// Blank text is rejected before anything is recorded.
    pub async fn send(
        &mut self,
        orchestrator: &Orchestrator,
        text: &str,
        on_usage: Option<&dyn UsageSink>,
    ) -> AgentResult<&ConversationMessage> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AgentError::Validation("message must not be empty".to_string()));
        }

        let prior_len = self.messages.len();
        self.messages.push(ConversationMessage::user(text));

        let replies = orchestrator
            .send_message(&self.messages[..prior_len], text, on_usage)
            .await?;
        self.messages.extend(replies);

        self.messages
            .last()
            .ok_or_else(|| AgentError::Validation("orchestrator returned no reply".to_string()))
    }
}
