//! Configuration file loading for agent-lab
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `AGENT_LAB_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./agent-lab.toml` or `./.agent-lab.toml`
//! 4. Global: `~/.config/agent-lab/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileAgentConfig, FileConfig, FileLoggingConfig, FileModelConfig,
    FileRetryConfig,
};
pub use loader::{ConfigLoader, ConfigSource, ENV_PREFIX, PROJECT_CONFIG_FILES};
