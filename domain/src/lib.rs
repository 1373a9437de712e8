//! Domain layer for agent-lab
//!
//! Pure logic with no I/O: everything here can be exercised without a
//! network, a clock or a filesystem.
//!
//! # Core Concepts
//!
//! ## Tools
//!
//! A **tool** is a named string-in/string-out function the orchestrator may
//! call while answering a query. Tools live in an ordered, name-unique
//! [`ToolRegistry`]. The Calculator tool is backed by the safe
//! [`expression`] evaluator.
//!
//! ## Construction negotiation
//!
//! Orchestrator constructors drift between framework revisions. A
//! [`Signature`] describes what one revision declares, and
//! [`negotiation_plan`] lists the call shapes worth trying against it.
//!
//! ## Retry
//!
//! [`RetryPolicy`] bounds exponential backoff; [`InvocationOutcome`]
//! classifies each attempt as success, rate-limited or fatal.
//!
//! ## Answers
//!
//! [`extract_answer`] turns whatever the orchestrator returned into text.

pub mod expression;
pub mod orchestration;
pub mod retry;
pub mod session;
pub mod tool;
pub mod util;

// Re-export commonly used types
pub use expression::{ExpressionError, Number, evaluate};
pub use orchestration::{
    answer::{NormalizedAnswer, ResultShape, extract_answer},
    negotiation::{CallPlan, Offer, PlanOrigin, negotiation_plan},
    payload::{InvocationPayload, PayloadKey},
    signature::{
        ArgumentKind, ArgumentValue, BoundArguments, CallShape, CallShapeMismatch, Parameter,
        ParameterStyle, Signature,
    },
};
pub use retry::{InvocationOutcome, PolicyError, RetryPolicy, is_rate_limit_message};
pub use session::{ChatMessage, ConversationMemory, Role};
pub use tool::{RegistryError, Tool, ToolCall, ToolDefinition, ToolHandler, ToolRegistry};
