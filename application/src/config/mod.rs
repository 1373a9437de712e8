//! Application-level configuration.
//!
//! - [`RunConfig`] — retry policy, dry-run and debug for a query run
//! - [`BuildOptions`] — optional components offered to the orchestrator constructor

pub mod run_config;

pub use run_config::{BuildOptions, DEFAULT_MAX_TOOL_TURNS, DEFAULT_SYSTEM_PROMPT, RunConfig};
