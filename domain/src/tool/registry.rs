//! Tool registry
//!
//! An ordered, name-unique collection of [`Tool`]s. Built once at startup,
//! then shared read-only (usually behind an `Arc`) with the orchestrator.

use std::collections::HashMap;

use thiserror::Error;

use super::entities::{Tool, ToolDefinition};

/// Registry errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Tool already registered: {0}")]
    DuplicateTool(String),

    #[error("Tool not found: {0}")]
    NotFound(String),
}

/// Ordered mapping from tool name to tool
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Tool>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool, rejecting a name that is already taken
    pub fn register(&mut self, tool: Tool) -> Result<(), RegistryError> {
        if self.index.contains_key(tool.name()) {
            return Err(RegistryError::DuplicateTool(tool.name().to_string()));
        }
        self.index.insert(tool.name().to_string(), self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    /// Builder form of [`register`](Self::register)
    pub fn with_tool(mut self, tool: Tool) -> Result<Self, RegistryError> {
        self.register(tool)?;
        Ok(self)
    }

    pub fn lookup(&self, name: &str) -> Result<&Tool, RegistryError> {
        self.get(name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    pub fn get(&self, name: &str) -> Option<&Tool> {
        self.index.get(name).map(|&i| &self.tools[i])
    }

    /// Tools in registration order
    pub fn all(&self) -> &[Tool] {
        &self.tools
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.iter().map(|t| t.name())
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(Tool::definition).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn echo(name: &str) -> Tool {
        Tool::new(name, format!("{} tool", name), |s: &str| s.to_string())
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = ToolRegistry::new();
        registry.register(echo("alpha")).unwrap();
        registry.register(echo("beta")).unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.lookup("beta").unwrap().name(), "beta");
        assert_eq!(
            registry.lookup("gamma").unwrap_err(),
            RegistryError::NotFound("gamma".into())
        );
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let mut registry = ToolRegistry::new();
        registry.register(echo("alpha")).unwrap();

        let err = registry.register(echo("alpha")).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateTool("alpha".into()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_registration_order_is_preserved() {
        let registry = ToolRegistry::new()
            .with_tool(echo("zeta"))
            .and_then(|r| r.with_tool(echo("alpha")))
            .and_then(|r| r.with_tool(echo("mu")))
            .unwrap();

        let names: Vec<_> = registry.names().collect();
        assert_eq!(names, vec!["zeta", "alpha", "mu"]);
    }

    #[test]
    fn test_definitions_are_verbatim() {
        let registry = ToolRegistry::new()
            .with_tool(Tool::new(
                "Calculator",
                "Evaluates a math expression string (e.g., '25 * 4 + 10').",
                |s: &str| s.to_string(),
            ))
            .unwrap();

        let defs = registry.definitions();
        assert_eq!(defs[0].name, "Calculator");
        assert_eq!(
            defs[0].description,
            "Evaluates a math expression string (e.g., '25 * 4 + 10')."
        );
    }

    #[test]
    fn test_empty_registry() {
        let registry = ToolRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.get("anything").is_none());
    }
}
