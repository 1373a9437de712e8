//! Chat model providers

pub mod openai;

pub use openai::{OpenAiChatModel, OpenAiConfig};
