//! Built-in tool handlers
//!
//! Every tool takes one string and returns one string. Failures come back
//! as text so the model can read them and recover.
//!
//! [`default_registry`] registers them in a fixed order:
//! `Calculator`, `get_current_time`, `get_current_date`, `reverse_string`,
//! `get_weather`, `read_file`.

pub mod calculator;
pub mod clock;
pub mod file;
pub mod text;
pub mod weather;

use lab_domain::{RegistryError, ToolRegistry};

/// Registry with every built-in tool
pub fn default_registry() -> Result<ToolRegistry, RegistryError> {
    ToolRegistry::new()
        .with_tool(calculator::calculator_tool())?
        .with_tool(clock::current_time_tool())?
        .with_tool(clock::current_date_tool())?
        .with_tool(text::reverse_string_tool())?
        .with_tool(weather::weather_tool())?
        .with_tool(file::read_file_tool())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_order() {
        let registry = default_registry().unwrap();
        let names: Vec<&str> = registry.names().collect();
        assert_eq!(
            names,
            vec![
                "Calculator",
                "get_current_time",
                "get_current_date",
                "reverse_string",
                "get_weather",
                "read_file",
            ]
        );
    }

    #[test]
    fn test_registry_dispatch() {
        let registry = default_registry().unwrap();
        assert_eq!(registry.lookup("reverse_string").unwrap().call("abc"), "cba");
        assert_eq!(registry.lookup("Calculator").unwrap().call("25 * 4 + 10"), "110");
        assert!(registry.lookup("web_search").is_err());
    }

    #[test]
    fn test_definitions_carry_descriptions() {
        let registry = default_registry().unwrap();
        let defs = registry.definitions();
        assert_eq!(defs.len(), 6);
        assert!(defs.iter().all(|d| !d.description.is_empty()));
    }
}
