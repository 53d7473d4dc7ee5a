//! Error types for the conversation agent

use thiserror::Error;

/// Errors that escape a conversation turn.
///
/// Tool failures never show up here: they are folded into the tool result
/// payload so the reasoning engine can react to them.
#[derive(Debug, Error)]
pub enum AgentError {
    /// LLM provider error
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// A single engine round did not answer in time
    #[error("Operation timed out after {0}s")]
    Timeout(u64),

    /// The engine kept requesting tools past the round cap
    #[error("Tool loop exceeded {0} rounds without a final answer")]
    LoopExceeded(u32),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Errors specific to LLM provider operations
#[derive(Debug, Error)]
pub enum LlmError {
    /// API error
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Authentication error
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Network error
    #[error("Network error: {0}")]
    Network(String),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Content filtered
    #[error("Content filtered by safety system")]
    ContentFiltered,

    /// Invalid request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Timeout
    #[error("Request timed out")]
    Timeout,
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else if err.is_connect() {
            LlmError::Network(format!("Connection error: {}", err))
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

/// Result type alias for agent operations
pub type AgentResult<T> = Result<T, AgentError>;

/// Result type alias for LLM operations
pub type LlmResult<T> = Result<T, LlmError>;
