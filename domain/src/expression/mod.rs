//! Safe arithmetic expression evaluation
//!
//! The Calculator tool hands model-written text to [`evaluate`]. The text is
//! parsed with a complete expression grammar (so names, calls, strings,
//! attribute access, comparisons and boolean logic are all *recognised*),
//! and then walked under a strict allow-list:
//!
//! - numeric literals (integer or floating-point)
//! - unary `+` / `-`
//! - binary `+`, `-`, `*`, `/`, `**`, `%`, `//`
//!
//! Nothing outside that list is ever executed; there is no name lookup and no
//! dynamic dispatch.
//!
//! ```text
//! "25 * 4 + 10" ──tokenize──▶ [25, *, 4, +, 10] ──parse──▶ Add(Mul(25, 4), 10) ──eval──▶ 110
//! ```

mod ast;
mod error;
mod evaluator;
mod lexer;
mod number;
mod parser;

pub use ast::{BinaryOp, BoolOp, CompareOp, Expr, UnaryOp};
pub use error::ExpressionError;
pub use number::Number;
pub use parser::{MAX_TOKENS, parse};

/// Prefix of every error string returned by [`evaluate`]
pub const ERROR_PREFIX: &str = "Error evaluating expression: ";

/// Parse and evaluate, returning the number or the reason it was refused.
pub fn evaluate_number(expression: &str) -> Result<Number, ExpressionError> {
    let tree = parse(expression.trim())?;
    evaluator::eval(&tree)
}

/// Evaluate arithmetic text and render the result as a string.
///
/// Never fails: any syntax, allow-list or arithmetic problem comes back as
/// `"Error evaluating expression: <reason>"`.
pub fn evaluate(expression: &str) -> String {
    match evaluate_number(expression) {
        Ok(value) => value.to_string(),
        Err(e) => format!("{}{}", ERROR_PREFIX, e),
    }
}
