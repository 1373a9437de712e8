//! Numeric values produced by the evaluator
//!
//! Integers stay exact (`i64` with checked arithmetic); true division and any
//! operation involving a float produce a float. Floor division and modulo
//! round toward negative infinity, so `-7 // 2 == -4` and `-7 % 3 == 2`.

use std::fmt;

use super::error::ExpressionError;

/// Result of evaluating an expression
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    /// Parse literal source text (underscores already stripped by the lexer)
    pub fn parse_literal(text: &str) -> Result<Self, ExpressionError> {
        let is_float = text.contains(['.', 'e', 'E']);
        if is_float {
            let value: f64 = text
                .parse()
                .map_err(|_| ExpressionError::syntax(format!("malformed number '{}'", text)))?;
            return finite(value);
        }
        text.parse::<i64>().map(Number::Int).map_err(|_| {
            ExpressionError::evaluation(format!("integer literal too large: {}", text))
        })
    }

    pub fn as_f64(&self) -> f64 {
        match self {
            Number::Int(i) => *i as f64,
            Number::Float(f) => *f,
        }
    }

    pub fn neg(self) -> Result<Self, ExpressionError> {
        match self {
            Number::Int(i) => i.checked_neg().map(Number::Int).ok_or_else(overflow),
            Number::Float(f) => Ok(Number::Float(-f)),
        }
    }

    pub fn add(self, rhs: Self) -> Result<Self, ExpressionError> {
        match (self, rhs) {
            (Number::Int(a), Number::Int(b)) => {
                a.checked_add(b).map(Number::Int).ok_or_else(overflow)
            }
            (a, b) => finite(a.as_f64() + b.as_f64()),
        }
    }

    pub fn sub(self, rhs: Self) -> Result<Self, ExpressionError> {
        match (self, rhs) {
            (Number::Int(a), Number::Int(b)) => {
                a.checked_sub(b).map(Number::Int).ok_or_else(overflow)
            }
            (a, b) => finite(a.as_f64() - b.as_f64()),
        }
    }

    pub fn mul(self, rhs: Self) -> Result<Self, ExpressionError> {
        match (self, rhs) {
            (Number::Int(a), Number::Int(b)) => {
                a.checked_mul(b).map(Number::Int).ok_or_else(overflow)
            }
            (a, b) => finite(a.as_f64() * b.as_f64()),
        }
    }

    /// True division, always a float
    pub fn div(self, rhs: Self) -> Result<Self, ExpressionError> {
        if rhs.is_zero() {
            return Err(ExpressionError::evaluation("division by zero"));
        }
        finite(self.as_f64() / rhs.as_f64())
    }

    pub fn floor_div(self, rhs: Self) -> Result<Self, ExpressionError> {
        match (self, rhs) {
            (Number::Int(_), Number::Int(0)) => Err(ExpressionError::evaluation(
                "integer division or modulo by zero",
            )),
            (Number::Int(a), Number::Int(b)) => {
                let quotient = a.checked_div(b).ok_or_else(overflow)?;
                let remainder = a.checked_rem(b).ok_or_else(overflow)?;
                if remainder != 0 && ((remainder < 0) != (b < 0)) {
                    Ok(Number::Int(quotient - 1))
                } else {
                    Ok(Number::Int(quotient))
                }
            }
            (a, b) => {
                if b.is_zero() {
                    return Err(ExpressionError::evaluation("float floor division by zero"));
                }
                finite((a.as_f64() / b.as_f64()).floor())
            }
        }
    }

    pub fn modulo(self, rhs: Self) -> Result<Self, ExpressionError> {
        match (self, rhs) {
            (Number::Int(_), Number::Int(0)) => Err(ExpressionError::evaluation(
                "integer division or modulo by zero",
            )),
            (Number::Int(a), Number::Int(b)) => {
                let remainder = a.checked_rem(b).ok_or_else(overflow)?;
                if remainder != 0 && ((remainder < 0) != (b < 0)) {
                    Ok(Number::Int(remainder + b))
                } else {
                    Ok(Number::Int(remainder))
                }
            }
            (a, b) => {
                if b.is_zero() {
                    return Err(ExpressionError::evaluation("float modulo by zero"));
                }
                let (a, b) = (a.as_f64(), b.as_f64());
                let mut remainder = a % b;
                if remainder != 0.0 && ((remainder < 0.0) != (b < 0.0)) {
                    remainder += b;
                }
                finite(remainder)
            }
        }
    }

    pub fn pow(self, rhs: Self) -> Result<Self, ExpressionError> {
        if self.is_zero() && rhs.as_f64() < 0.0 {
            return Err(ExpressionError::evaluation(
                "0.0 cannot be raised to a negative power",
            ));
        }
        match (self, rhs) {
            (Number::Int(base), Number::Int(exp)) if exp >= 0 => {
                let exp = u32::try_from(exp).map_err(|_| overflow())?;
                base.checked_pow(exp).map(Number::Int).ok_or_else(overflow)
            }
            (base, exp) => {
                let (base, exp) = (base.as_f64(), exp.as_f64());
                if base < 0.0 && exp.fract() != 0.0 {
                    return Err(ExpressionError::evaluation(
                        "negative number cannot be raised to a fractional power",
                    ));
                }
                finite(base.powf(exp))
            }
        }
    }

    fn is_zero(&self) -> bool {
        match self {
            Number::Int(i) => *i == 0,
            Number::Float(f) => *f == 0.0,
        }
    }
}

fn overflow() -> ExpressionError {
    ExpressionError::evaluation("integer overflow")
}

fn finite(value: f64) -> Result<Number, ExpressionError> {
    if value.is_finite() {
        Ok(Number::Float(value))
    } else {
        Err(ExpressionError::evaluation("numerical result out of range"))
    }
}

impl fmt::Display for Number {
    /// Integers print plainly; floats always carry a fractional part or an
    /// exponent (`4.0`, `0.5`, `1e+16`, `1.5e-05`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{}", i),
            Number::Float(value) => {
                let magnitude = value.abs();
                if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
                    return write!(f, "{}", scientific(*value));
                }
                if value.fract() == 0.0 {
                    write!(f, "{:.1}", value)
                } else {
                    write!(f, "{}", value)
                }
            }
        }
    }
}

/// `1e16` → `1e+16`, `1.5e-5` → `1.5e-05`
fn scientific(value: f64) -> String {
    let raw = format!("{:e}", value);
    let Some((mantissa, exponent)) = raw.split_once('e') else {
        return raw;
    };
    let (sign, digits) = match exponent.strip_prefix('-') {
        Some(digits) => ('-', digits),
        None => ('+', exponent),
    };
    format!("{}e{}{:0>2}", mantissa, sign, digits)
}
