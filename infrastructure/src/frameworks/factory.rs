//! Orchestrator factory bound to one framework revision

use std::sync::Arc;

use lab_application::{
    ConstructionFailure, ConstructorArgument, ConstructorCall, DEFAULT_MAX_TOOL_TURNS,
    InteractionLogger, NoInteractionLogger, OrchestratorFactory, OrchestratorHandle,
    ToolCallingAgent,
};
use lab_domain::Signature;
use tracing::debug;

use super::revision::FrameworkRevision;

/// Builds [`ToolCallingAgent`]s, accepting only calls that bind against the
/// revision's constructor signature.
pub struct ToolCallingAgentFactory {
    revision: FrameworkRevision,
    signature: Signature,
    max_tool_turns: usize,
    interaction_logger: Arc<dyn InteractionLogger>,
}

impl ToolCallingAgentFactory {
    pub fn new(revision: FrameworkRevision) -> Self {
        Self {
            revision,
            signature: revision.signature(),
            max_tool_turns: DEFAULT_MAX_TOOL_TURNS,
            interaction_logger: Arc::new(NoInteractionLogger),
        }
    }

    pub fn with_max_tool_turns(mut self, max: usize) -> Self {
        self.max_tool_turns = max;
        self
    }

    pub fn with_interaction_logger(mut self, logger: Arc<dyn InteractionLogger>) -> Self {
        self.interaction_logger = logger;
        self
    }

    pub fn revision(&self) -> FrameworkRevision {
        self.revision
    }
}

impl OrchestratorFactory for ToolCallingAgentFactory {
    fn signature(&self) -> &Signature {
        &self.signature
    }

    fn construct(&self, call: ConstructorCall) -> Result<OrchestratorHandle, ConstructionFailure> {
        let mut bound = self.signature.bind(call)?;
        let names: Vec<String> = bound.names().map(String::from).collect();
        debug!(
            entry_point = self.signature.entry_point(),
            bound = ?names,
            "Constructing orchestrator"
        );

        let mut model = None;
        let mut tools = None;
        let mut prompt = None;
        let mut memory = None;
        let mut flag = None;
        for name in &names {
            match bound.take(name) {
                Some(ConstructorArgument::Model(m)) => model = Some(m),
                Some(ConstructorArgument::Tools(t)) => tools = Some(t),
                Some(ConstructorArgument::Prompt(p)) => prompt = Some(p),
                Some(ConstructorArgument::Memory(m)) => memory = Some(m),
                Some(ConstructorArgument::Flag(f)) => flag = Some(f),
                None => {}
            }
        }

        let model = model.ok_or_else(|| {
            ConstructionFailure::Runtime(format!(
                "{} was called without a model",
                self.signature.entry_point()
            ))
        })?;
        let tools = tools.ok_or_else(|| {
            ConstructionFailure::Runtime(format!(
                "{} was called without tools",
                self.signature.entry_point()
            ))
        })?;
        if tools.is_empty() {
            return Err(ConstructionFailure::Runtime(
                "at least one tool is required".to_string(),
            ));
        }

        let mut agent = ToolCallingAgent::new(model, tools)
            .with_max_tool_turns(self.max_tool_turns)
            .with_debug(flag.unwrap_or(false))
            .with_interaction_logger(self.interaction_logger.clone());
        if let Some(prompt) = prompt {
            agent = agent.with_system_prompt(prompt);
        }
        if let Some(memory) = memory {
            agent = agent.with_memory(memory);
        }
        Ok(Box::new(agent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use lab_application::{
        AgentBuilder, BuildError, BuildOptions, ChatCompletion, ChatModel, GatewayError,
    };
    use lab_domain::{
        CallShape, CallShapeMismatch, ChatMessage, ConversationMemory, InvocationPayload,
        PayloadKey, Tool, ToolDefinition, ToolRegistry,
    };
    use std::sync::Mutex;

    /// Records the system prompt it was sent, answers immediately
    struct EchoModel {
        seen: Mutex<Vec<Vec<ChatMessage>>>,
    }

    #[async_trait]
    impl ChatModel for EchoModel {
        fn name(&self) -> &str {
            "echo"
        }

        async fn complete(
            &self,
            messages: &[ChatMessage],
            _tools: &[ToolDefinition],
        ) -> Result<ChatCompletion, GatewayError> {
            self.seen.lock().unwrap().push(messages.to_vec());
            let last = messages.last().map(|m| m.content.clone()).unwrap_or_default();
            Ok(ChatCompletion::new(ChatMessage::assistant(format!(
                "echo: {}",
                last
            ))))
        }
    }

    fn model() -> Arc<EchoModel> {
        Arc::new(EchoModel {
            seen: Mutex::new(Vec::new()),
        })
    }

    fn tools() -> Arc<ToolRegistry> {
        Arc::new(
            ToolRegistry::new()
                .with_tool(Tool::new("echo", "Returns its input", |s: &str| s.to_string()))
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_every_revision_builds_through_negotiation() {
        for revision in FrameworkRevision::ALL {
            let builder = AgentBuilder::new(Arc::new(ToolCallingAgentFactory::new(revision)));
            let built = builder
                .negotiate(model(), tools(), &BuildOptions::default())
                .unwrap_or_else(|e| panic!("{} failed: {}", revision, e));

            let value = built
                .handle
                .invoke(&InvocationPayload::new(PayloadKey::Messages, "hi"))
                .await
                .unwrap();
            let messages = value["messages"].as_array().unwrap();
            assert_eq!(messages.last().unwrap()["content"], "echo: hi");
        }
    }

    #[tokio::test]
    async fn test_current_revision_receives_system_prompt() {
        let model = model();
        let builder = AgentBuilder::new(Arc::new(ToolCallingAgentFactory::new(
            FrameworkRevision::Current,
        )));
        let options = BuildOptions::default().with_system_prompt("be terse");

        let handle = builder.build(model.clone(), tools(), &options).unwrap();
        handle
            .invoke(&InvocationPayload::new(PayloadKey::Input, "hello"))
            .await
            .unwrap();

        let seen = model.seen.lock().unwrap();
        assert_eq!(seen[0][0], ChatMessage::system("be terse"));
    }

    #[tokio::test]
    async fn test_legacy_revision_binds_memory() {
        let memory = ConversationMemory::new();
        let builder = AgentBuilder::new(Arc::new(ToolCallingAgentFactory::new(
            FrameworkRevision::Legacy,
        )));
        let options = BuildOptions::default().with_memory(memory.clone());

        let handle = builder.build(model(), tools(), &options).unwrap();
        handle
            .invoke(&InvocationPayload::new(PayloadKey::Messages, "first"))
            .await
            .unwrap();

        assert_eq!(memory.len(), 2);
    }

    #[test]
    fn test_positional_revision_rejects_keywords() {
        let factory = ToolCallingAgentFactory::new(FrameworkRevision::Positional);
        let model: Arc<dyn ChatModel> = model();
        let call = CallShape {
            positional: vec![],
            keyword: vec![
                ("model".to_string(), ConstructorArgument::Model(model)),
                ("tools".to_string(), ConstructorArgument::Tools(tools())),
            ],
        };

        let Err(err) = factory.construct(call) else {
            panic!("keyword call must not bind");
        };
        assert!(matches!(
            err,
            ConstructionFailure::CallShape(CallShapeMismatch::PositionalOnlyAsKeyword(ref n))
                if n == "model"
        ));
    }

    #[test]
    fn test_empty_registry_is_runtime_failure() {
        let builder = AgentBuilder::new(Arc::new(ToolCallingAgentFactory::new(
            FrameworkRevision::Current,
        )));

        let Err(err) = builder.negotiate(
            model(),
            Arc::new(ToolRegistry::new()),
            &BuildOptions::default(),
        ) else {
            panic!("empty registry must fail");
        };
        assert!(matches!(err, BuildError::Runtime(_)));
    }
}
