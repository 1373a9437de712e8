//! Expression evaluation errors

use thiserror::Error;

/// Errors raised while parsing or evaluating an arithmetic expression.
///
/// None of these ever cross the tool boundary: the Calculator handler turns
/// them into an `"Error evaluating expression: ..."` string.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExpressionError {
    /// The text is not a well-formed expression
    #[error("invalid syntax: {0}")]
    Syntax(String),

    /// The expression parsed, but contains a construct outside the allow-list
    #[error("unsupported expression: {0}")]
    UnsupportedExpression(String),

    /// Arithmetic fault (division by zero, overflow, ...)
    #[error("{0}")]
    EvaluationError(String),
}

impl ExpressionError {
    pub fn syntax(message: impl Into<String>) -> Self {
        Self::Syntax(message.into())
    }

    pub fn unsupported(construct: impl Into<String>) -> Self {
        Self::UnsupportedExpression(construct.into())
    }

    pub fn evaluation(message: impl Into<String>) -> Self {
        Self::EvaluationError(message.into())
    }

    /// Whether the expression was rejected by the allow-list
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::UnsupportedExpression(_))
    }
}
