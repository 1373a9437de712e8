//! Conversation domain.
//!
//! - [`entities::ChatMessage`] — one role/content turn, optionally with tool calls
//! - [`memory::ConversationMemory`] — optional shared history handle

pub mod entities;
pub mod memory;

pub use entities::{ChatMessage, Role};
pub use memory::ConversationMemory;
