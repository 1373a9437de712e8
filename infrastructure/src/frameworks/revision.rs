//! Constructor signatures of the supported framework revisions

use std::fmt;
use std::str::FromStr;

use lab_domain::{ArgumentKind, Parameter, Signature};
use thiserror::Error;

/// Which revision of the orchestrator constructor to emulate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameworkRevision {
    /// `create_agent(model, tools, *, system_prompt=None, debug=False)`
    #[default]
    Current,
    /// `initialize_agent(llm, tools, prompt=None, memory=None, *, verbose=False)`
    Legacy,
    /// `build_agent(model, tools, /)`
    Positional,
}

impl FrameworkRevision {
    pub const ALL: [FrameworkRevision; 3] = [Self::Current, Self::Legacy, Self::Positional];

    pub fn as_str(&self) -> &'static str {
        match self {
            FrameworkRevision::Current => "current",
            FrameworkRevision::Legacy => "legacy",
            FrameworkRevision::Positional => "positional",
        }
    }

    pub fn signature(&self) -> Signature {
        match self {
            FrameworkRevision::Current => Signature::new(
                "create_agent",
                vec![
                    Parameter::required("model", ArgumentKind::Model),
                    Parameter::required("tools", ArgumentKind::Tools),
                    Parameter::optional("system_prompt", ArgumentKind::Prompt).keyword_only(),
                    Parameter::optional("debug", ArgumentKind::Flag).keyword_only(),
                ],
            ),
            FrameworkRevision::Legacy => Signature::new(
                "initialize_agent",
                vec![
                    Parameter::required("llm", ArgumentKind::Model),
                    Parameter::required("tools", ArgumentKind::Tools),
                    Parameter::optional("prompt", ArgumentKind::Prompt),
                    Parameter::optional("memory", ArgumentKind::Memory),
                    Parameter::optional("verbose", ArgumentKind::Flag).keyword_only(),
                ],
            ),
            FrameworkRevision::Positional => Signature::new(
                "build_agent",
                vec![
                    Parameter::required("model", ArgumentKind::Model).positional_only(),
                    Parameter::required("tools", ArgumentKind::Tools).positional_only(),
                ],
            ),
        }
    }
}

impl fmt::Display for FrameworkRevision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown framework revision '{0}'")]
pub struct UnknownRevision(pub String);

impl FromStr for FrameworkRevision {
    type Err = UnknownRevision;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "current" | "latest" => Ok(FrameworkRevision::Current),
            "legacy" => Ok(FrameworkRevision::Legacy),
            "positional" => Ok(FrameworkRevision::Positional),
            _ => Err(UnknownRevision(s.to_string())),
        }
    }
}
