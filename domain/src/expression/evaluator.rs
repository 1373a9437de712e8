//! Allow-list evaluation of a parsed expression
//!
//! Only numeric literals, unary `+`/`-` and the arithmetic operators
//! `+ - * / // % **` are ever applied. Every other node kind is rejected the
//! moment the walk reaches it, before any of its children are visited.

use super::ast::{BinaryOp, Expr, UnaryOp};
use super::error::ExpressionError;
use super::number::Number;

/// Evaluate a syntax tree bottom-up under the arithmetic allow-list.
pub fn eval(expr: &Expr) -> Result<Number, ExpressionError> {
    match expr {
        Expr::Number(text) => Number::parse_literal(text),
        Expr::Unary { op, operand } => match op {
            UnaryOp::Plus => eval(operand),
            UnaryOp::Minus => eval(operand)?.neg(),
            UnaryOp::Invert | UnaryOp::Not => Err(ExpressionError::unsupported(expr.describe())),
        },
        Expr::Binary { op, left, right } => {
            if !op.is_arithmetic() {
                return Err(ExpressionError::unsupported(expr.describe()));
            }
            let left = eval(left)?;
            let right = eval(right)?;
            apply(*op, left, right)
        }
        other => Err(ExpressionError::unsupported(other.describe())),
    }
}

fn apply(op: BinaryOp, left: Number, right: Number) -> Result<Number, ExpressionError> {
    match op {
        BinaryOp::Add => left.add(right),
        BinaryOp::Sub => left.sub(right),
        BinaryOp::Mul => left.mul(right),
        BinaryOp::Div => left.div(right),
        BinaryOp::FloorDiv => left.floor_div(right),
        BinaryOp::Mod => left.modulo(right),
        BinaryOp::Pow => left.pow(right),
        BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor | BinaryOp::Shl | BinaryOp::Shr => {
            Err(ExpressionError::unsupported(format!(
                "bitwise operator '{}'",
                op.symbol()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::parser::parse;

    fn eval_str(source: &str) -> Result<Number, ExpressionError> {
        eval(&parse(source).unwrap())
    }

    #[test]
    fn test_literals_and_unary() {
        assert_eq!(eval_str("42").unwrap(), Number::Int(42));
        assert_eq!(eval_str("-3").unwrap(), Number::Int(-3));
        assert_eq!(eval_str("+-3").unwrap(), Number::Int(-3));
        assert_eq!(eval_str("--3").unwrap(), Number::Int(3));
    }

    #[test]
    fn test_rejects_before_visiting_children() {
        // The rejected call never evaluates its argument, so the inner
        // division by zero is not what gets reported.
        let err = eval_str("f(1/0)").unwrap_err();
        assert!(err.is_unsupported());
        assert!(err.to_string().contains("function call 'f()'"));
    }

    #[test]
    fn test_left_error_short_circuits() {
        let err = eval_str("1/0 + x").unwrap_err();
        assert_eq!(err, ExpressionError::evaluation("division by zero"));
    }

    #[test]
    fn test_rejected_constructs() {
        let cases = [
            ("a + 1", "name 'a'"),
            ("'abc'", "string literal"),
            ("(1).real", "attribute access '.real'"),
            ("1 < 2", "comparison"),
            ("1 and 2", "boolean operation 'and'"),
            ("not 1", "boolean operation 'not'"),
            ("~1", "bitwise inversion"),
            ("1 << 2", "bitwise operator '<<'"),
            ("[1][0]", "subscript"),
            ("(1, 2)", "tuple"),
        ];
        for (source, construct) in cases {
            let err = eval_str(source).unwrap_err();
            assert!(err.is_unsupported(), "{} should be rejected", source);
            assert!(
                err.to_string().contains(construct),
                "{}: expected '{}' in '{}'",
                source,
                construct,
                err
            );
        }
    }
}
