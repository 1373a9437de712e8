//! Raw TOML configuration data types
//!
//! These structs mirror the config file one-to-one. Validation turns them
//! into the immutable structures the application layer consumes
//! ([`RetryPolicy`], [`RunConfig`], [`BuildOptions`]).

use std::path::PathBuf;
use std::time::Duration;

use lab_application::{BuildOptions, DEFAULT_MAX_TOOL_TURNS, DEFAULT_SYSTEM_PROMPT, RunConfig};
use lab_domain::{ConversationMemory, PolicyError, RetryPolicy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::frameworks::FrameworkRevision;

/// Configuration validation errors
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("model.timeout_seconds cannot be 0")]
    InvalidTimeout,

    #[error("model.name cannot be empty")]
    EmptyModelName,

    #[error("model.temperature must be between 0 and 2 (got {0})")]
    InvalidTemperature(f32),

    #[error("invalid [retry] section: {0}")]
    InvalidRetry(#[from] PolicyError),

    #[error("agent.max_tool_turns cannot be 0")]
    ZeroToolTurns,

    #[error("unknown agent.framework '{0}' (expected current, legacy or positional)")]
    UnknownFramework(String),
}

/// Raw `[model]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileModelConfig {
    /// Model identifier sent to the provider
    pub name: String,
    /// OpenAI-compatible endpoint root
    pub base_url: String,
    pub temperature: f32,
    /// Environment variable holding the API token
    pub token_env: String,
    /// Timeout in seconds for API calls
    pub timeout_seconds: Option<u64>,
}

impl Default for FileModelConfig {
    fn default() -> Self {
        Self {
            name: "openai/gpt-4o".to_string(),
            base_url: "https://models.github.ai/inference".to_string(),
            temperature: 0.0,
            token_env: "GITHUB_TOKEN".to_string(),
            timeout_seconds: Some(60),
        }
    }
}

impl FileModelConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

/// Raw `[retry]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRetryConfig {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub backoff_multiplier: f64,
    pub max_delay_ms: u64,
}

impl Default for FileRetryConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_attempts: policy.max_attempts(),
            initial_delay_ms: policy.initial_delay().as_millis() as u64,
            backoff_multiplier: policy.backoff_multiplier(),
            max_delay_ms: policy.max_delay().as_millis() as u64,
        }
    }
}

impl FileRetryConfig {
    pub fn to_policy(&self) -> Result<RetryPolicy, PolicyError> {
        RetryPolicy::new(
            self.max_attempts,
            Duration::from_millis(self.initial_delay_ms),
            self.backoff_multiplier,
            Duration::from_millis(self.max_delay_ms),
        )
    }
}

/// Raw `[agent]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAgentConfig {
    /// Verbose agent logging (tool inputs and outputs)
    pub debug: bool,
    /// Never call the API
    pub dry_run: bool,
    /// Overrides the built-in system prompt
    pub system_prompt: Option<String>,
    /// Orchestrator constructor revision: current, legacy or positional
    pub framework: String,
    pub max_tool_turns: usize,
    /// Offer a conversation memory to the orchestrator
    pub memory: bool,
}

impl Default for FileAgentConfig {
    fn default() -> Self {
        Self {
            debug: false,
            dry_run: true,
            system_prompt: None,
            framework: "current".to_string(),
            max_tool_turns: DEFAULT_MAX_TOOL_TURNS,
            memory: true,
        }
    }
}

impl FileAgentConfig {
    pub fn parse_framework(&self) -> Result<FrameworkRevision, ConfigValidationError> {
        self.framework
            .parse()
            .map_err(|_| ConfigValidationError::UnknownFramework(self.framework.clone()))
    }
}

/// Raw `[logging]` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL interaction transcript path
    pub transcript: Option<PathBuf>,
}

/// Complete configuration file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub model: FileModelConfig,
    pub retry: FileRetryConfig,
    pub agent: FileAgentConfig,
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Check every section without building anything
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if let Some(0) = self.model.timeout_seconds {
            return Err(ConfigValidationError::InvalidTimeout);
        }
        if self.model.name.trim().is_empty() {
            return Err(ConfigValidationError::EmptyModelName);
        }
        if !(0.0..=2.0).contains(&self.model.temperature) {
            return Err(ConfigValidationError::InvalidTemperature(
                self.model.temperature,
            ));
        }
        self.retry.to_policy()?;
        if self.agent.max_tool_turns == 0 {
            return Err(ConfigValidationError::ZeroToolTurns);
        }
        self.agent.parse_framework()?;
        Ok(())
    }

    pub fn run_config(&self) -> Result<RunConfig, ConfigValidationError> {
        Ok(RunConfig {
            retry: self.retry.to_policy()?,
            dry_run: self.agent.dry_run,
            debug: self.agent.debug,
        })
    }

    pub fn build_options(&self) -> BuildOptions {
        let prompt = self
            .agent
            .system_prompt
            .clone()
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());
        let options = BuildOptions::default()
            .with_system_prompt(prompt)
            .with_debug(self.agent.debug);
        if self.agent.memory {
            options.with_memory(ConversationMemory::new())
        } else {
            options
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_mirror_the_lab_settings() {
        let config = FileConfig::default();
        assert_eq!(config.model.name, "openai/gpt-4o");
        assert_eq!(config.model.base_url, "https://models.github.ai/inference");
        assert_eq!(config.model.token_env, "GITHUB_TOKEN");
        assert_eq!(config.retry.max_attempts, 2);
        assert_eq!(config.retry.initial_delay_ms, 2_000);
        assert_eq!(config.retry.max_delay_ms, 16_000);
        assert!(config.agent.dry_run);
        assert!(!config.agent.debug);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[model]
name = "openai/gpt-4o-mini"
temperature = 0.2
timeout_seconds = 30

[retry]
max_attempts = 4
initial_delay_ms = 500
backoff_multiplier = 3.0
max_delay_ms = 10000

[agent]
dry_run = false
debug = true
framework = "legacy"
system_prompt = "Answer in one word."

[logging]
transcript = "/tmp/agent-lab.jsonl"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert!(config.validate().is_ok());

        let run = config.run_config().unwrap();
        assert!(!run.dry_run);
        assert_eq!(run.retry.max_attempts(), 4);
        assert_eq!(run.retry.initial_delay(), Duration::from_millis(500));

        assert_eq!(
            config.agent.parse_framework().unwrap(),
            FrameworkRevision::Legacy
        );
        let options = config.build_options();
        assert_eq!(options.system_prompt.as_deref(), Some("Answer in one word."));
        assert!(options.debug);
        assert_eq!(
            config.logging.transcript,
            Some(PathBuf::from("/tmp/agent-lab.jsonl"))
        );
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: FileConfig = toml::from_str("[retry]\nmax_attempts = 5\n").unwrap();
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.backoff_multiplier, 2.0);
        assert_eq!(config.model.name, "openai/gpt-4o");
        assert_eq!(
            config.build_options().system_prompt.as_deref(),
            Some(DEFAULT_SYSTEM_PROMPT)
        );
    }

    #[test]
    fn test_validation_errors() {
        let mut config = FileConfig::default();
        config.retry.max_attempts = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidRetry(PolicyError::ZeroAttempts))
        ));

        let mut config = FileConfig::default();
        config.retry.backoff_multiplier = 1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidRetry(_))
        ));

        let mut config = FileConfig::default();
        config.retry.max_delay_ms = 100;
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidRetry(
                PolicyError::InitialDelayExceedsMax { .. }
            ))
        ));

        let mut config = FileConfig::default();
        config.model.timeout_seconds = Some(0);
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidTimeout)
        ));

        let mut config = FileConfig::default();
        config.agent.framework = "langchain-0.0.1".into();
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::UnknownFramework(_))
        ));
    }

    #[test]
    fn test_memory_can_be_disabled() {
        let mut config = FileConfig::default();
        assert!(config.build_options().memory.is_some());
        config.agent.memory = false;
        assert!(config.build_options().memory.is_none());
    }
}
