//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod build_agent;
pub mod invoke_with_retry;
pub mod run_queries;
pub mod tool_agent;
