//! Infrastructure layer for agent-lab
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer, plus configuration loading and the built-in tools.
//!
//! # Adapters
//!
//! - [`OpenAiChatModel`]: OpenAI-compatible chat completions over HTTP
//! - [`ToolCallingAgentFactory`]: orchestrator constructor per framework revision
//! - [`TokioSleeper`]: real backoff sleeps
//! - [`JsonlInteractionLogger`]: JSONL interaction transcript

pub mod config;
pub mod frameworks;
pub mod logging;
pub mod probe;
pub mod providers;
pub mod sleeper;
pub mod tools;

pub use config::{ConfigLoader, ConfigValidationError, FileConfig};
pub use frameworks::{FrameworkRevision, ToolCallingAgentFactory};
pub use logging::JsonlInteractionLogger;
pub use probe::{ProbeError, ProbeReport, probe};
pub use providers::{OpenAiChatModel, OpenAiConfig};
pub use sleeper::TokioSleeper;
pub use tools::default_registry;
