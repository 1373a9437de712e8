//! Orchestrator ports
//!
//! An [`Orchestrator`] answers one query at a time, calling tools as it sees
//! fit. An [`OrchestratorFactory`] is a construction entry point whose
//! parameter list is only known through its [`Signature`]; the
//! [`AgentBuilder`](crate::use_cases::build_agent::AgentBuilder) negotiates
//! against it.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use lab_domain::{
    ArgumentKind, ArgumentValue, CallShape, CallShapeMismatch, ConversationMemory,
    InvocationPayload, PayloadKey, Signature, ToolRegistry,
};
use serde_json::Value;
use thiserror::Error;

use super::chat_model::{ChatModel, GatewayError};

/// Errors raised while answering a query
#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("payload key '{0}' is not accepted by this orchestrator")]
    UnsupportedPayload(PayloadKey),

    #[error("no final answer after {0} tool turns")]
    ToolTurnsExceeded(usize),

    #[error("{0}")]
    Other(String),
}

/// A constructed, ready-to-invoke orchestrator
#[async_trait]
pub trait Orchestrator: Send + Sync {
    /// Payload keys this orchestrator understands
    fn accepted_payload_keys(&self) -> &[PayloadKey];

    /// Answer one query. The raw result shape is orchestrator-specific.
    async fn invoke(&self, payload: &InvocationPayload) -> Result<Value, OrchestratorError>;
}

/// Opaque handle returned by the builder, owned by the caller for a run
pub type OrchestratorHandle = Box<dyn Orchestrator>;

/// A value handed to an orchestrator constructor
#[derive(Clone)]
pub enum ConstructorArgument {
    Model(Arc<dyn ChatModel>),
    Tools(Arc<ToolRegistry>),
    Prompt(String),
    Memory(ConversationMemory),
    Flag(bool),
}

impl ConstructorArgument {
    pub fn into_model(self) -> Option<Arc<dyn ChatModel>> {
        match self {
            ConstructorArgument::Model(m) => Some(m),
            _ => None,
        }
    }

    pub fn into_tools(self) -> Option<Arc<ToolRegistry>> {
        match self {
            ConstructorArgument::Tools(t) => Some(t),
            _ => None,
        }
    }

    pub fn into_prompt(self) -> Option<String> {
        match self {
            ConstructorArgument::Prompt(p) => Some(p),
            _ => None,
        }
    }

    pub fn into_memory(self) -> Option<ConversationMemory> {
        match self {
            ConstructorArgument::Memory(m) => Some(m),
            _ => None,
        }
    }

    pub fn into_flag(self) -> Option<bool> {
        match self {
            ConstructorArgument::Flag(f) => Some(f),
            _ => None,
        }
    }
}

impl ArgumentValue for ConstructorArgument {
    fn kind(&self) -> ArgumentKind {
        match self {
            ConstructorArgument::Model(_) => ArgumentKind::Model,
            ConstructorArgument::Tools(_) => ArgumentKind::Tools,
            ConstructorArgument::Prompt(_) => ArgumentKind::Prompt,
            ConstructorArgument::Memory(_) => ArgumentKind::Memory,
            ConstructorArgument::Flag(_) => ArgumentKind::Flag,
        }
    }
}

impl fmt::Debug for ConstructorArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstructorArgument::Model(m) => write!(f, "Model({})", m.name()),
            ConstructorArgument::Tools(t) => write!(f, "Tools({} tools)", t.len()),
            ConstructorArgument::Prompt(p) => write!(f, "Prompt({} chars)", p.chars().count()),
            ConstructorArgument::Memory(m) => write!(f, "Memory({} turns)", m.len()),
            ConstructorArgument::Flag(b) => write!(f, "Flag({})", b),
        }
    }
}

/// Arguments of one construction attempt
pub type ConstructorCall = CallShape<ConstructorArgument>;

/// Why a construction attempt failed
#[derive(Error, Debug)]
pub enum ConstructionFailure {
    /// The arguments did not fit the entry point; another shape may work
    #[error("call-shape mismatch: {0}")]
    CallShape(#[from] CallShapeMismatch),

    /// The entry point accepted the shape but refused the values
    #[error("{0}")]
    Runtime(String),
}

impl ConstructionFailure {
    pub fn is_call_shape(&self) -> bool {
        matches!(self, ConstructionFailure::CallShape(_))
    }
}

/// An orchestrator construction entry point
pub trait OrchestratorFactory: Send + Sync {
    /// Declared parameters, as far as the entry point reveals them
    fn signature(&self) -> &Signature;

    fn construct(&self, call: ConstructorCall) -> Result<OrchestratorHandle, ConstructionFailure>;
}
