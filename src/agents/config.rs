//! Configuration types for the conversation agent

use serde::{Deserialize, Serialize};

/// How many of the tool calls returned in one round get executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolDispatch {
    /// Execute only the first call, in returned order
    #[default]
    First,
    /// Execute every call sequentially, answering them in request order
    All,
}

/// Orchestrator settings (`[agent]` section)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AgentConfig {
    /// Optional system instruction sent with every round
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    /// Maximum engine rounds per user turn
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,
    /// Timeout in seconds for each engine round and each tool execution
    #[serde(default = "default_round_timeout")]
    pub round_timeout_seconds: u64,
    /// Which tool calls of a round are executed
    #[serde(default)]
    pub tool_dispatch: ToolDispatch,
    /// Maximum search hits reported back to the engine
    #[serde(default = "default_search_result_limit")]
    pub search_result_limit: usize,
    /// Temperature override for the engine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

fn default_max_rounds() -> u32 {
    10
}

fn default_round_timeout() -> u64 {
    60
}

fn default_search_result_limit() -> usize {
    5
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_prompt: None,
            max_rounds: default_max_rounds(),
            round_timeout_seconds: default_round_timeout(),
            tool_dispatch: ToolDispatch::default(),
            search_result_limit: default_search_result_limit(),
            temperature: None,
        }
    }
}
