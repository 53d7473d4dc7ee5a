//! Google Gemini LLM Provider

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::{CompletionRequest, CompletionResponse, FinishReason, LlmProvider, TokenUsage};
use crate::agents::domain::{Message, Role, ToolCall};
use crate::agents::error::{LlmError, LlmResult};
use crate::config::EngineConfig;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Google Gemini LLM Provider
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    default_temperature: Option<f32>,
    default_max_tokens: Option<u32>,
}

impl GeminiProvider {
    /// Create a new Gemini provider from configuration
    pub fn new(config: &EngineConfig) -> LlmResult<Self> {
        let api_key = config.resolve_api_key().ok_or_else(|| {
            LlmError::Authentication(format!(
                "No API key configured and environment variable {} not set",
                config.api_key_env_name()
            ))
        })?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            base_url,
            model: config.model.clone(),
            default_temperature: config.temperature,
            default_max_tokens: config.max_tokens,
        })
    }

    /// Build the request body for Gemini API
    fn build_request_body(&self, request: &CompletionRequest) -> Value {
        let (system_instruction, contents) = convert_messages(&request.messages);
        let mut body = json!({ "contents": contents });

        if let Some(system) = system_instruction {
            body["systemInstruction"] = json!({ "parts": [{ "text": system }] });
        }

        // Generation config
        let mut generation_config = json!({});

        if let Some(temp) = request.temperature.or(self.default_temperature) {
            generation_config["temperature"] = json!(temp);
        }

        if let Some(max_tokens) = request.max_tokens.or(self.default_max_tokens) {
            generation_config["maxOutputTokens"] = json!(max_tokens);
        }

        if generation_config.as_object().map_or(false, |o| !o.is_empty()) {
            body["generationConfig"] = generation_config;
        }

        // Tools (function declarations)
        if let Some(tools) = &request.tools {
            if !tools.is_empty() {
                body["tools"] = json!([{
                    "function_declarations": tools.iter().map(|t| {
                        json!({
                            "name": t.name,
                            "description": t.description,
                            "parameters": t.parameters
                        })
                    }).collect::<Vec<_>>()
                }]);
            }
        }

        body
    }

    /// Parse a non-streaming response
    fn parse_response(&self, response: GeminiResponse) -> LlmResult<CompletionResponse> {
        let usage = response.usage_metadata.as_ref().map(|u| TokenUsage {
            prompt_tokens: u.prompt_token_count.unwrap_or(0),
            completion_tokens: u.candidates_token_count.unwrap_or(0),
            total_tokens: u.total_token_count.unwrap_or(0),
        });

        let candidate = match response.candidates.into_iter().next() {
            Some(c) => c,
            None => {
                if response
                    .prompt_feedback
                    .and_then(|f| f.block_reason)
                    .is_some()
                {
                    return Err(LlmError::ContentFiltered);
                }
                return Err(LlmError::Parse("No candidates in response".to_string()));
            }
        };

        let mut content = String::new();
        let mut tool_calls = Vec::new();

        let parts = candidate
            .content
            .and_then(|c| c.parts)
            .unwrap_or_default();

        for part in parts {
            if let Some(text) = part.text {
                content.push_str(&text);
            }
            if let Some(fc) = part.function_call {
                tool_calls.push(ToolCall {
                    id: format!("call_{}", tool_calls.len()),
                    name: fc.name,
                    arguments: fc.args.unwrap_or_else(|| Value::Object(Default::default())),
                });
            }
        }

        let finish_reason = if !tool_calls.is_empty() {
            FinishReason::ToolCalls
        } else {
            match candidate.finish_reason.as_deref() {
                Some("MAX_TOKENS") => FinishReason::Length,
                Some("SAFETY") | Some("RECITATION") | Some("BLOCKLIST")
                | Some("PROHIBITED_CONTENT") => FinishReason::ContentFilter,
                _ => FinishReason::Stop,
            }
        };

        if finish_reason == FinishReason::ContentFilter && content.is_empty() {
            return Err(LlmError::ContentFiltered);
        }

        Ok(CompletionResponse {
            message: Message::assistant_with_tools(content, tool_calls),
            finish_reason,
            usage,
        })
    }
}

/// Convert internal messages to Gemini `contents`, lifting system messages
/// into a separate instruction.
///
/// Consecutive tool results are grouped into one turn so parallel function
/// calls are answered together and in order.
fn convert_messages(messages: &[Message]) -> (Option<String>, Vec<Value>) {
    let mut system_parts: Vec<&str> = Vec::new();
    let mut contents: Vec<Value> = Vec::new();
    let mut pending_responses: Vec<Value> = Vec::new();

    let flush = |pending: &mut Vec<Value>, contents: &mut Vec<Value>| {
        if !pending.is_empty() {
            contents.push(json!({
                "role": "user",
                "parts": std::mem::take(pending)
            }));
        }
    };

    for m in messages {
        if m.role != Role::Tool {
            flush(&mut pending_responses, &mut contents);
        }

        match m.role {
            Role::System => system_parts.push(&m.content),
            Role::User => {
                contents.push(json!({
                    "role": "user",
                    "parts": [{ "text": m.content }]
                }));
            }
            Role::Assistant => {
                let mut parts = Vec::new();

                if !m.content.is_empty() {
                    parts.push(json!({ "text": m.content }));
                }

                for tc in m.requested_tools() {
                    parts.push(json!({
                        "functionCall": {
                            "name": tc.name,
                            "args": tc.arguments
                        }
                    }));
                }

                if !parts.is_empty() {
                    contents.push(json!({
                        "role": "model",
                        "parts": parts
                    }));
                }
            }
            Role::Tool => {
                let tool_name = m.name.clone().unwrap_or_else(|| "tool".to_string());
                let response_value: Value = serde_json::from_str(&m.content)
                    .unwrap_or_else(|_| json!({ "result": m.content }));

                pending_responses.push(json!({
                    "functionResponse": {
                        "name": tool_name,
                        "response": response_value
                    }
                }));
            }
        }
    }
    flush(&mut pending_responses, &mut contents);

    let system = if system_parts.is_empty() {
        None
    } else {
        Some(system_parts.join("\n\n"))
    };

    (system, contents)
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> LlmResult<CompletionResponse> {
        let body = self.build_request_body(&request);
        let model = request.model.as_ref().unwrap_or(&self.model);

        // Key goes in a header so it never appears in logged URLs
        let url = format!("{}/models/{}:generateContent", self.base_url, model);
        debug!("Gemini round: {} ({} messages)", url, request.messages.len());

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => LlmError::Authentication(error_text),
                400 => LlmError::InvalidRequest(error_text),
                code => LlmError::Api {
                    status: code,
                    message: error_text,
                },
            });
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            LlmError::Parse(format!("Failed to parse response: {}", e))
        })?;

        self.parse_response(gemini_response)
    }
}

// Gemini API response types

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsageMetadata>,
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiContent {
    parts: Option<Vec<GeminiPart>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    text: Option<String>,
    function_call: Option<GeminiFunctionCall>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiFunctionCall {
    name: String,
    args: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsageMetadata {
    prompt_token_count: Option<u32>,
    candidates_token_count: Option<u32>,
    total_token_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}
