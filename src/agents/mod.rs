//! Media concierge agent
//!
//! ## Architecture
//!
//! - `domain/` - Conversation entries, engine messages, tool calls
//! - `llm/` - Reasoning engine providers (Gemini)
//! - `tools` - Declared tool set and argument decoding
//! - `executor` - Runs tool calls against the catalog
//! - `orchestrator` - The tool-calling loop for one user turn
//! - `usage` - Process-wide token accounting

pub mod config;
pub mod domain;
pub mod error;
pub mod executor;
pub mod llm;
pub mod orchestrator;
pub mod tools;
pub mod usage;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use config::*;
pub use domain::*;
pub use error::*;
pub use orchestrator::{build_engine_history, Orchestrator, Transcript};
pub use usage::{UsageAccumulator, UsageSink};
