//! Tool-calling agent.
//!
//! The orchestrator the builder constructs. For each query it runs a
//! multi-turn loop against the [`ChatModel`]:
//!
//! 1. Send system prompt, remembered turns and the user query, with every
//!    registered tool's name and description
//! 2. If the model asks for tools, run them through the [`ToolRegistry`] and
//!    append the results
//! 3. Repeat until the model answers or `max_tool_turns` is exhausted
//!
//! The raw result is `{"messages": [...]}`: the whole conversation, ending
//! with the assistant's answer.

use std::sync::Arc;

use async_trait::async_trait;
use lab_domain::util::preview;
use lab_domain::{
    ChatMessage, ConversationMemory, InvocationPayload, PayloadKey, ToolCall, ToolRegistry,
};
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::config::DEFAULT_MAX_TOOL_TURNS;
use crate::ports::chat_model::ChatModel;
use crate::ports::interaction_logger::{InteractionEvent, InteractionLogger, NoInteractionLogger};
use crate::ports::orchestrator::{Orchestrator, OrchestratorError};

const ACCEPTED_KEYS: &[PayloadKey] = &[PayloadKey::Messages, PayloadKey::Input];

/// Multi-turn tool-use orchestrator
pub struct ToolCallingAgent {
    model: Arc<dyn ChatModel>,
    tools: Arc<ToolRegistry>,
    system_prompt: Option<String>,
    memory: Option<ConversationMemory>,
    debug: bool,
    max_tool_turns: usize,
    interaction_logger: Arc<dyn InteractionLogger>,
}

impl ToolCallingAgent {
    pub fn new(model: Arc<dyn ChatModel>, tools: Arc<ToolRegistry>) -> Self {
        Self {
            model,
            tools,
            system_prompt: None,
            memory: None,
            debug: false,
            max_tool_turns: DEFAULT_MAX_TOOL_TURNS,
            interaction_logger: Arc::new(NoInteractionLogger),
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_memory(mut self, memory: ConversationMemory) -> Self {
        self.memory = Some(memory);
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_max_tool_turns(mut self, max: usize) -> Self {
        self.max_tool_turns = max;
        self
    }

    pub fn with_interaction_logger(mut self, logger: Arc<dyn InteractionLogger>) -> Self {
        self.interaction_logger = logger;
        self
    }

    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }

    fn run_tool(&self, call: &ToolCall) -> String {
        let output = match self.tools.get(&call.name) {
            Some(tool) => tool.call(&call.input),
            None => {
                warn!(tool = %call.name, "Model requested an unknown tool");
                format!("Error: unknown tool '{}'", call.name)
            }
        };

        if self.debug {
            info!(
                tool = %call.name,
                input = %preview(&call.input, 200),
                output = %preview(&output, 200),
                "Tool call"
            );
        } else {
            debug!(tool = %call.name, "Tool call");
        }

        self.interaction_logger.log(InteractionEvent::new(
            "tool_call",
            json!({
                "tool": call.name,
                "input": call.input,
                "output": output,
            }),
        ));

        output
    }
}

#[async_trait]
impl Orchestrator for ToolCallingAgent {
    fn accepted_payload_keys(&self) -> &[PayloadKey] {
        ACCEPTED_KEYS
    }

    async fn invoke(&self, payload: &InvocationPayload) -> Result<Value, OrchestratorError> {
        if !ACCEPTED_KEYS.contains(&payload.key()) {
            return Err(OrchestratorError::UnsupportedPayload(payload.key()));
        }

        let mut conversation = Vec::new();
        if let Some(prompt) = &self.system_prompt {
            conversation.push(ChatMessage::system(prompt.as_str()));
        }
        if let Some(memory) = &self.memory {
            conversation.extend(memory.snapshot());
        }
        let question = ChatMessage::user(payload.query());
        conversation.push(question.clone());

        let definitions = self.tools.definitions();

        for turn in 0..=self.max_tool_turns {
            let completion = self.model.complete(&conversation, &definitions).await?;

            if !completion.wants_tools() {
                let answer = completion.message;
                debug!(turn, answer = %preview(&answer.content, 120), "Model answered");
                if let Some(memory) = &self.memory {
                    memory.append([question, answer.clone()]);
                }
                conversation.push(answer);
                let messages = serde_json::to_value(&conversation)
                    .map_err(|e| OrchestratorError::Other(e.to_string()))?;
                return Ok(json!({ "messages": messages }));
            }

            if turn == self.max_tool_turns {
                break;
            }

            let calls = completion.message.tool_calls.clone();
            debug!(turn, calls = calls.len(), "Model requested tools");
            conversation.push(completion.message);
            for call in &calls {
                let output = self.run_tool(call);
                conversation.push(ChatMessage::tool_result(call.id.as_str(), output));
            }
        }

        warn!(max = self.max_tool_turns, "Tool loop exceeded max_tool_turns");
        Err(OrchestratorError::ToolTurnsExceeded(self.max_tool_turns))
    }
}
