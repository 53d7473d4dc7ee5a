//! Scripted fakes shared by the agent unit tests

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::agents::domain::{Message, ToolCall};
use crate::agents::error::{LlmError, LlmResult};
use crate::agents::llm::{
    CompletionRequest, CompletionResponse, FinishReason, LlmProvider, TokenUsage,
};
use crate::catalog::{CatalogError, CatalogPort, CatalogResult, MediaItem, MediaRequestSpec, MediaType};

/// Engine that replays a fixed list of rounds and records every request
pub struct ScriptedProvider {
    rounds: Mutex<VecDeque<LlmResult<CompletionResponse>>>,
    requests: Mutex<Vec<CompletionRequest>>,
    delay: Option<Duration>,
    repeat_last: bool,
}

impl ScriptedProvider {
    pub fn new(rounds: Vec<LlmResult<CompletionResponse>>) -> Self {
        Self {
            rounds: Mutex::new(rounds.into()),
            requests: Mutex::new(Vec::new()),
            delay: None,
            repeat_last: false,
        }
    }

    /// Keep answering with a tool call forever
    pub fn looping(call: ToolCall) -> Self {
        Self {
            repeat_last: true,
            ..Self::new(vec![Ok(tool_round(vec![call], None))])
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn round_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

fn clone_round(round: &LlmResult<CompletionResponse>) -> LlmResult<CompletionResponse> {
    match round {
        Ok(r) => Ok(r.clone()),
        Err(e) => Err(LlmError::Parse(e.to_string())),
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-model"
    }

    async fn complete(&self, request: CompletionRequest) -> LlmResult<CompletionResponse> {
        self.requests.lock().unwrap().push(request);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let mut rounds = self.rounds.lock().unwrap();
        if self.repeat_last && rounds.len() == 1 {
            return rounds.front().map(clone_round).unwrap_or_else(|| {
                Err(LlmError::Parse("script exhausted".to_string()))
            });
        }
        rounds
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::Parse("script exhausted".to_string())))
    }
}

pub fn text_round(text: &str, total_tokens: Option<u32>) -> CompletionResponse {
    CompletionResponse {
        message: Message::assistant(text),
        finish_reason: FinishReason::Stop,
        usage: total_tokens.map(usage),
    }
}

pub fn tool_round(calls: Vec<ToolCall>, total_tokens: Option<u32>) -> CompletionResponse {
    CompletionResponse {
        message: Message::assistant_with_tools("", calls),
        finish_reason: FinishReason::ToolCalls,
        usage: total_tokens.map(usage),
    }
}

pub fn usage(total_tokens: u32) -> TokenUsage {
    TokenUsage {
        prompt_tokens: total_tokens / 2,
        completion_tokens: total_tokens - total_tokens / 2,
        total_tokens,
    }
}

pub fn search_call(id: &str, query: &str) -> ToolCall {
    ToolCall::new(id, "search_media", json!({ "query": query }))
}

pub fn media(id: u64, title: &str) -> MediaItem {
    MediaItem {
        external_id: id,
        media_type: MediaType::Movie,
        title: title.to_string(),
        release_date: None,
        overview: None,
        poster_path: None,
    }
}

/// In-memory catalog recording every call
#[derive(Default)]
pub struct FakeCatalog {
    pub search_results: Vec<MediaItem>,
    pub search_error: Option<String>,
    pub search_delay: Option<Duration>,
    pub request_error: Option<String>,
    pub request_response: Value,
    pub searches: Mutex<Vec<String>>,
    pub requests: Mutex<Vec<MediaRequestSpec>>,
}

impl FakeCatalog {
    pub fn with_results(results: Vec<MediaItem>) -> Self {
        Self {
            search_results: results,
            ..Default::default()
        }
    }

    pub fn search_count(&self) -> usize {
        self.searches.lock().unwrap().len()
    }
}

#[async_trait]
impl CatalogPort for FakeCatalog {
    async fn search(&self, query: &str) -> CatalogResult<Vec<MediaItem>> {
        self.searches.lock().unwrap().push(query.to_string());
        if let Some(delay) = self.search_delay {
            tokio::time::sleep(delay).await;
        }
        match &self.search_error {
            Some(message) => Err(CatalogError::Transport(message.clone())),
            None => Ok(self.search_results.clone()),
        }
    }

    async fn request_media(&self, spec: &MediaRequestSpec) -> CatalogResult<Value> {
        self.requests.lock().unwrap().push(spec.clone());
        match &self.request_error {
            Some(message) => Err(CatalogError::RequestRejected(message.clone())),
            None => Ok(self.request_response.clone()),
        }
    }
}
