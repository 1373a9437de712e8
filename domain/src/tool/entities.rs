//! Tool domain entities

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Handler behind a tool: one string in, one string out.
///
/// Handlers never fail past their own boundary; problems are reported as
/// text the model can read (e.g. `"Error evaluating expression: ..."`).
pub type ToolHandler = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// A named, string-in/string-out function exposed to the orchestrator.
#[derive(Clone)]
pub struct Tool {
    name: String,
    description: String,
    handler: ToolHandler,
}

impl Tool {
    pub fn new<F>(name: impl Into<String>, description: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            handler: Arc::new(handler),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The only signal the model gets about what the tool does and when to
    /// call it; passed to the orchestrator verbatim.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Run the handler
    pub fn call(&self, input: &str) -> String {
        (self.handler)(input)
    }

    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name.clone(),
            description: self.description.clone(),
        }
    }
}

impl fmt::Debug for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tool")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Serializable view of a tool: what the model is shown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
}

/// A tool invocation requested by the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Provider-assigned call id, echoed back with the result
    pub id: String,
    /// Name of the tool to call
    pub name: String,
    /// The single string argument
    pub input: String,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            input: input.into(),
        }
    }
}
