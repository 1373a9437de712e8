//! Tool domain module
//!
//! A **tool** is a named function with exactly one string argument and one
//! string result. The orchestrator sees only each tool's name and
//! description; when the model decides to use one, the orchestrator looks it
//! up in the [`ToolRegistry`] and runs the handler.
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌──────────────┐
//! │ ToolRegistry │───▶│ ToolCall     │───▶│ String       │
//! │ (name→Tool)  │    │ (name,input) │    │ (handler out)│
//! └──────────────┘    └──────────────┘    └──────────────┘
//! ```
//!
//! Handlers absorb their own failures: an invalid date or a bad expression
//! comes back as an error *string* that the model can read and react to.

pub mod entities;
pub mod registry;

pub use entities::{Tool, ToolCall, ToolDefinition, ToolHandler};
pub use registry::{RegistryError, ToolRegistry};
