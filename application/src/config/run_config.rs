//! Run configuration — immutable inputs to the builder and the runner.
//!
//! Everything here is decided once at startup by the configuration layer and
//! passed into components at construction. Nothing is read from globals.

use lab_domain::{ConversationMemory, RetryPolicy};

/// System prompt used when the configuration does not provide one
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a professional, succinct AI assistant. \
Use tools whenever they are needed for accuracy. \
If asked about weather 'today', first call get_current_date, \
then call get_weather with the date formatted as YYYY-MM-DD.";

/// Tool-use round trips allowed per query before giving up
pub const DEFAULT_MAX_TOOL_TURNS: usize = 8;

/// Optional components offered to the orchestrator constructor.
///
/// Each one is passed only if the constructor declares a matching parameter.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub system_prompt: Option<String>,
    pub memory: Option<ConversationMemory>,
    pub debug: bool,
}

impl BuildOptions {
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
}

/// Controls one sequential run of queries
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub retry: RetryPolicy,
    /// Skip every upstream call
    pub dry_run: bool,
    pub debug: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            dry_run: true,
            debug: false,
        }
    }
}

impl RunConfig {
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}
