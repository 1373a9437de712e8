//! Constructor signatures and argument binding
//!
//! A [`Signature`] is the declared parameter list of an orchestrator
//! construction entry point. [`Signature::bind`] matches a [`CallShape`]
//! against it with the usual call-site rules, and reports a
//! [`CallShapeMismatch`] when the shape does not fit. A mismatch says nothing
//! about the values themselves; value problems are the constructor's business.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What a parameter expects to receive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgumentKind {
    /// The chat model client
    Model,
    /// The tool set
    Tools,
    /// System prompt text
    Prompt,
    /// Conversation memory handle
    Memory,
    /// A boolean switch such as `debug` or `verbose`
    Flag,
}

impl ArgumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArgumentKind::Model => "model",
            ArgumentKind::Tools => "tools",
            ArgumentKind::Prompt => "prompt",
            ArgumentKind::Memory => "memory",
            ArgumentKind::Flag => "flag",
        }
    }
}

impl fmt::Display for ArgumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a parameter may be supplied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterStyle {
    #[default]
    PositionalOrKeyword,
    PositionalOnly,
    KeywordOnly,
}

/// One declared parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub kind: ArgumentKind,
    #[serde(default)]
    pub style: ParameterStyle,
    pub required: bool,
}

impl Parameter {
    pub fn required(name: impl Into<String>, kind: ArgumentKind) -> Self {
        Self {
            name: name.into(),
            kind,
            style: ParameterStyle::PositionalOrKeyword,
            required: true,
        }
    }

    pub fn optional(name: impl Into<String>, kind: ArgumentKind) -> Self {
        Self {
            required: false,
            ..Self::required(name, kind)
        }
    }

    pub fn positional_only(mut self) -> Self {
        self.style = ParameterStyle::PositionalOnly;
        self
    }

    pub fn keyword_only(mut self) -> Self {
        self.style = ParameterStyle::KeywordOnly;
        self
    }

    pub fn accepts_positional(&self) -> bool {
        self.style != ParameterStyle::KeywordOnly
    }

    pub fn accepts_keyword(&self) -> bool {
        self.style != ParameterStyle::PositionalOnly
    }
}

/// Anything that can be passed as an argument and knows its own kind
pub trait ArgumentValue {
    fn kind(&self) -> ArgumentKind;
}

/// The arguments of one call attempt
#[derive(Debug, Clone)]
pub struct CallShape<A> {
    pub positional: Vec<A>,
    pub keyword: Vec<(String, A)>,
}

impl<A> Default for CallShape<A> {
    fn default() -> Self {
        Self {
            positional: Vec::new(),
            keyword: Vec::new(),
        }
    }
}

/// Why a call shape does not fit a signature
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallShapeMismatch {
    #[error("takes {accepted} positional argument(s) but {given} were given")]
    TooManyPositional { accepted: usize, given: usize },

    #[error("got an unexpected keyword argument '{0}'")]
    UnexpectedKeyword(String),

    #[error("parameter '{0}' is positional-only but was passed as a keyword")]
    PositionalOnlyAsKeyword(String),

    #[error("got multiple values for argument '{0}'")]
    MultipleValues(String),

    #[error("missing required argument '{0}'")]
    MissingArgument(String),

    #[error("argument '{name}' expects {expected}, got {given}")]
    WrongKind {
        name: String,
        expected: ArgumentKind,
        given: ArgumentKind,
    },
}

/// Arguments matched to parameter names, in declaration order
#[derive(Debug)]
pub struct BoundArguments<A> {
    values: Vec<(String, A)>,
}

impl<A> BoundArguments<A> {
    pub fn get(&self, name: &str) -> Option<&A> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, a)| a)
    }

    /// Remove and return the value bound to `name`
    pub fn take(&mut self, name: &str) -> Option<A> {
        let pos = self.values.iter().position(|(n, _)| n == name)?;
        Some(self.values.remove(pos).1)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Declared parameter list of a construction entry point
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    entry_point: String,
    parameters: Vec<Parameter>,
}

impl Signature {
    pub fn new(entry_point: impl Into<String>, parameters: Vec<Parameter>) -> Self {
        Self {
            entry_point: entry_point.into(),
            parameters,
        }
    }

    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn declares(&self, name: &str) -> bool {
        self.parameter(name).is_some()
    }

    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// The first name in `aliases` that this signature declares
    pub fn first_declared<'a>(&self, aliases: &[&'a str]) -> Option<&'a str> {
        aliases.iter().copied().find(|alias| self.declares(alias))
    }

    /// Every name in `aliases` that this signature declares, in alias order
    pub fn all_declared<'a>(&self, aliases: &[&'a str]) -> Vec<&'a str> {
        aliases
            .iter()
            .copied()
            .filter(|alias| self.declares(alias))
            .collect()
    }

    /// Match `call` against the declared parameters.
    pub fn bind<A: ArgumentValue>(
        &self,
        call: CallShape<A>,
    ) -> Result<BoundArguments<A>, CallShapeMismatch> {
        let positional_params: Vec<&Parameter> = self
            .parameters
            .iter()
            .filter(|p| p.accepts_positional())
            .collect();

        if call.positional.len() > positional_params.len() {
            return Err(CallShapeMismatch::TooManyPositional {
                accepted: positional_params.len(),
                given: call.positional.len(),
            });
        }

        let mut slots: Vec<Option<A>> = self.parameters.iter().map(|_| None).collect();

        for (param, value) in positional_params.iter().zip(call.positional) {
            check_kind(param, &value)?;
            let index = self.index_of(&param.name);
            slots[index] = Some(value);
        }

        for (name, value) in call.keyword {
            let Some(param) = self.parameter(&name) else {
                return Err(CallShapeMismatch::UnexpectedKeyword(name));
            };
            if !param.accepts_keyword() {
                return Err(CallShapeMismatch::PositionalOnlyAsKeyword(name));
            }
            let index = self.index_of(&name);
            if slots[index].is_some() {
                return Err(CallShapeMismatch::MultipleValues(name));
            }
            check_kind(param, &value)?;
            slots[index] = Some(value);
        }

        let mut values = Vec::new();
        for (param, slot) in self.parameters.iter().zip(slots) {
            match slot {
                Some(value) => values.push((param.name.clone(), value)),
                None if param.required => {
                    return Err(CallShapeMismatch::MissingArgument(param.name.clone()));
                }
                None => {}
            }
        }

        Ok(BoundArguments { values })
    }

    fn index_of(&self, name: &str) -> usize {
        self.parameters
            .iter()
            .position(|p| p.name == name)
            .unwrap_or_default()
    }
}

fn check_kind<A: ArgumentValue>(param: &Parameter, value: &A) -> Result<(), CallShapeMismatch> {
    if param.kind == value.kind() {
        Ok(())
    } else {
        Err(CallShapeMismatch::WrongKind {
            name: param.name.clone(),
            expected: param.kind,
            given: value.kind(),
        })
    }
}

impl fmt::Display for Signature {
    /// `create_agent(model: model, tools: tools, debug?: flag)`, with
    /// `[positional-only]` / `[keyword-only]` markers where they apply.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.entry_point)?;
        for (i, p) in self.parameters.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            let optional = if p.required { "" } else { "?" };
            write!(f, "{}{}: {}", p.name, optional, p.kind)?;
            match p.style {
                ParameterStyle::PositionalOnly => f.write_str(" [positional-only]")?,
                ParameterStyle::KeywordOnly => f.write_str(" [keyword-only]")?,
                ParameterStyle::PositionalOrKeyword => {}
            }
        }
        f.write_str(")")
    }
}
