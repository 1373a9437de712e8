//! Build agent use case.
//!
//! Constructs an orchestrator through an [`OrchestratorFactory`] whose exact
//! parameter names and order are not known in advance. The builder walks
//! the negotiation table for the factory's [`Signature`], turning each
//! [`CallPlan`] into concrete arguments:
//!
//! - a call-shape mismatch moves on to the next plan
//! - a runtime failure stops immediately
//! - the first successful construction wins
//!
//! If every plan is rejected, [`BuildError::Construction`] carries the
//! signature for diagnosis.

use std::sync::Arc;

use lab_domain::{
    ArgumentKind, CallPlan, CallShape, CallShapeMismatch, Offer, Signature, ToolRegistry,
    negotiation_plan,
};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::config::BuildOptions;
use crate::ports::chat_model::ChatModel;
use crate::ports::orchestrator::{
    ConstructionFailure, ConstructorArgument, ConstructorCall, OrchestratorFactory,
    OrchestratorHandle,
};

/// Errors from [`AgentBuilder::build`]
#[derive(Error, Debug)]
pub enum BuildError {
    #[error(
        "No compatible call shape after {attempts} attempt(s); signature: {signature}{}",
        last_reason(.last_mismatch)
    )]
    Construction {
        signature: Signature,
        attempts: usize,
        last_mismatch: Option<CallShapeMismatch>,
    },

    #[error("Orchestrator construction failed: {0}")]
    Runtime(String),
}

fn last_reason(mismatch: &Option<CallShapeMismatch>) -> String {
    match mismatch {
        Some(m) => format!(" (last rejection: {})", m),
        None => String::new(),
    }
}

/// A constructed orchestrator and the call shape that produced it
pub struct BuiltAgent {
    pub handle: OrchestratorHandle,
    pub shape: CallPlan,
    /// 1-based position of the winning plan
    pub attempt: usize,
}

/// Signature-negotiating orchestrator builder
pub struct AgentBuilder {
    factory: Arc<dyn OrchestratorFactory>,
}

impl AgentBuilder {
    pub fn new(factory: Arc<dyn OrchestratorFactory>) -> Self {
        Self { factory }
    }

    pub fn signature(&self) -> &Signature {
        self.factory.signature()
    }

    /// Build an orchestrator, returning only the handle.
    pub fn build(
        &self,
        model: Arc<dyn ChatModel>,
        tools: Arc<ToolRegistry>,
        options: &BuildOptions,
    ) -> Result<OrchestratorHandle, BuildError> {
        self.negotiate(model, tools, options).map(|built| built.handle)
    }

    /// Build an orchestrator, also reporting which call shape worked.
    pub fn negotiate(
        &self,
        model: Arc<dyn ChatModel>,
        tools: Arc<ToolRegistry>,
        options: &BuildOptions,
    ) -> Result<BuiltAgent, BuildError> {
        let signature = self.factory.signature();
        let offer = Offer {
            prompt: options.system_prompt.is_some(),
            memory: options.memory.is_some(),
        };
        let plans = negotiation_plan(signature, offer);
        debug!(
            signature = %signature,
            plans = plans.len(),
            "Negotiating orchestrator construction"
        );

        let mut last_mismatch = None;
        for (index, plan) in plans.iter().enumerate() {
            let call = materialize(plan, &model, &tools, options);
            match self.factory.construct(call) {
                Ok(handle) => {
                    info!(shape = %plan, attempt = index + 1, "Orchestrator constructed");
                    return Ok(BuiltAgent {
                        handle,
                        shape: plan.clone(),
                        attempt: index + 1,
                    });
                }
                Err(ConstructionFailure::CallShape(mismatch)) => {
                    debug!(shape = %plan, reason = %mismatch, "Call shape rejected");
                    last_mismatch = Some(mismatch);
                }
                Err(ConstructionFailure::Runtime(message)) => {
                    error!(shape = %plan, error = %message, "Orchestrator construction failed");
                    return Err(BuildError::Runtime(message));
                }
            }
        }

        Err(BuildError::Construction {
            signature: signature.clone(),
            attempts: plans.len(),
            last_mismatch,
        })
    }
}

fn materialize(
    plan: &CallPlan,
    model: &Arc<dyn ChatModel>,
    tools: &Arc<ToolRegistry>,
    options: &BuildOptions,
) -> ConstructorCall {
    let value = |kind: ArgumentKind| match kind {
        ArgumentKind::Model => ConstructorArgument::Model(model.clone()),
        ArgumentKind::Tools => ConstructorArgument::Tools(tools.clone()),
        ArgumentKind::Prompt => {
            ConstructorArgument::Prompt(options.system_prompt.clone().unwrap_or_default())
        }
        ArgumentKind::Memory => {
            ConstructorArgument::Memory(options.memory.clone().unwrap_or_default())
        }
        ArgumentKind::Flag => ConstructorArgument::Flag(options.debug),
    };

    CallShape {
        positional: plan.positional.iter().map(|k| value(*k)).collect(),
        keyword: plan
            .keyword
            .iter()
            .map(|(name, k)| (name.clone(), value(*k)))
            .collect(),
    }
}
