//! Orchestrator contract: construction, invocation and result shapes
//!
//! - [`signature`] — declared constructor parameters and call-site binding
//! - [`negotiation`] — the ordered table of call shapes the builder tries
//! - [`payload`] — the query payload and its negotiated key
//! - [`answer`] — extracting the final answer from a raw result

pub mod answer;
pub mod negotiation;
pub mod payload;
pub mod signature;

pub use answer::{ANSWER_KEYS, NormalizedAnswer, ResultShape, extract_answer};
pub use negotiation::{
    CallPlan, FLAG_ALIASES, MEMORY_ALIASES, MODEL_ALIASES, Offer, PROMPT_ALIASES, PlanOrigin,
    TOOLS_ALIASES, negotiation_plan,
};
pub use payload::{InvocationPayload, PayloadKey};
pub use signature::{
    ArgumentKind, ArgumentValue, BoundArguments, CallShape, CallShapeMismatch, Parameter,
    ParameterStyle, Signature,
};
