//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod chat_model;
pub mod interaction_logger;
pub mod orchestrator;
pub mod progress;
pub mod sleeper;
