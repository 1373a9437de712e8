//! Application layer for agent-lab
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{BuildOptions, DEFAULT_MAX_TOOL_TURNS, DEFAULT_SYSTEM_PROMPT, RunConfig};
pub use ports::{
    chat_model::{ChatCompletion, ChatModel, GatewayError},
    interaction_logger::{InteractionEvent, InteractionLogger, NoInteractionLogger},
    orchestrator::{
        ConstructionFailure, ConstructorArgument, ConstructorCall, Orchestrator,
        OrchestratorError, OrchestratorFactory, OrchestratorHandle,
    },
    progress::{NoRunProgress, RunProgress},
    sleeper::Sleeper,
};
pub use use_cases::build_agent::{AgentBuilder, BuildError, BuiltAgent};
pub use use_cases::invoke_with_retry::{InvocationRetrier, RetryError};
pub use use_cases::run_queries::{
    EXAMPLE_QUERIES, QueryOutcome, QueryReport, QueryRunner, RunError, example_queries,
};
pub use use_cases::tool_agent::ToolCallingAgent;
