//! Domain types for the conversation agent
//!
//! `ConversationMessage` is the caller-owned transcript entry; `Message` is
//! the richer, per-turn shape exchanged with the reasoning engine.

mod conversation;
mod message;
mod tool_call;

pub use conversation::*;
pub use message::*;
pub use tool_call::*;
