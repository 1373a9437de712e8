//! Orchestrator framework revisions
//!
//! Each revision declares a different constructor [`Signature`](lab_domain::Signature).
//! The factory enforces it exactly as a call site would, so the builder has
//! to negotiate a call shape that binds.

mod factory;
mod revision;

pub use factory::ToolCallingAgentFactory;
pub use revision::{FrameworkRevision, UnknownRevision};
