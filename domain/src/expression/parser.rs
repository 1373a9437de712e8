//! Recursive-descent parser producing an [`Expr`] tree
//!
//! Precedence, lowest to highest:
//!
//! | Level | Operators |
//! |-------|-----------|
//! | boolean | `or`, `and`, `not` |
//! | comparison | `<` `>` `<=` `>=` `==` `!=` `in` `not in` `is` `is not` |
//! | bitwise | `\|`, `^`, `&`, `<<` `>>` |
//! | additive | `+` `-` |
//! | multiplicative | `*` `/` `//` `%` |
//! | unary | `+x` `-x` `~x` |
//! | power | `**` (right-associative, binds tighter than a unary on its left) |
//! | primary | calls, attribute access, subscripts |

use super::ast::{BinaryOp, BoolOp, CompareOp, Expr, UnaryOp};
use super::error::ExpressionError;
use super::lexer::{Spanned, Symbol, Token, tokenize};

/// Longest token stream accepted; bounds the depth of the evaluation walk.
pub const MAX_TOKENS: usize = 2_000;

/// Deepest nesting of parentheses / unary operators accepted.
const MAX_DEPTH: usize = 100;

const KEYWORDS: &[&str] = &["and", "or", "not", "in", "is", "if", "else", "lambda"];

/// Parse expression text into a syntax tree.
pub fn parse(source: &str) -> Result<Expr, ExpressionError> {
    let tokens = tokenize(source)?;
    if tokens.is_empty() {
        return Err(ExpressionError::syntax("empty expression"));
    }
    if tokens.len() > MAX_TOKENS {
        return Err(ExpressionError::syntax(format!(
            "expression too long ({} tokens, limit {})",
            tokens.len(),
            MAX_TOKENS
        )));
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let expr = parser.expression_list()?;
    if parser.pos < parser.tokens.len() {
        return Err(parser.unexpected());
    }
    Ok(expr)
}

struct Parser {
    tokens: Vec<Spanned>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|s| &s.token)
    }

    fn peek_symbol(&self) -> Option<Symbol> {
        match self.peek() {
            Some(Token::Symbol(s)) => Some(*s),
            _ => None,
        }
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(Token::Name(name)) if name == keyword)
    }

    fn peek_keyword_at(&self, offset: usize, keyword: &str) -> bool {
        matches!(
            self.tokens.get(self.pos + offset).map(|s| &s.token),
            Some(Token::Name(name)) if name == keyword
        )
    }

    fn eat_symbol(&mut self, symbol: Symbol) -> bool {
        if self.peek_symbol() == Some(symbol) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.peek_keyword(keyword) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_symbol(&mut self, symbol: Symbol) -> Result<(), ExpressionError> {
        if self.eat_symbol(symbol) {
            Ok(())
        } else {
            match self.tokens.get(self.pos) {
                Some(spanned) => Err(ExpressionError::syntax(format!(
                    "expected '{}' but found {} at position {}",
                    symbol.as_str(),
                    token_text(&spanned.token),
                    spanned.offset
                ))),
                None => Err(ExpressionError::syntax(format!(
                    "expected '{}' but reached end of input",
                    symbol.as_str()
                ))),
            }
        }
    }

    fn unexpected(&self) -> ExpressionError {
        match self.tokens.get(self.pos) {
            Some(spanned) => ExpressionError::syntax(format!(
                "unexpected {} at position {}",
                token_text(&spanned.token),
                spanned.offset
            )),
            None => ExpressionError::syntax("unexpected end of input"),
        }
    }

    fn enter(&mut self) -> Result<(), ExpressionError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ExpressionError::syntax("expression nested too deeply"));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    /// `expr (',' expr)* [',']`, a bare comma list becomes a tuple
    fn expression_list(&mut self) -> Result<Expr, ExpressionError> {
        let first = self.expression()?;
        if self.peek_symbol() != Some(Symbol::Comma) {
            return Ok(first);
        }

        let mut items = vec![first];
        while self.eat_symbol(Symbol::Comma) {
            if self.at_sequence_end() {
                break;
            }
            items.push(self.expression()?);
        }
        Ok(Expr::Tuple(items))
    }

    fn at_sequence_end(&self) -> bool {
        matches!(
            self.peek_symbol(),
            Some(Symbol::RParen) | Some(Symbol::RBracket)
        ) || self.peek().is_none()
    }

    fn expression(&mut self) -> Result<Expr, ExpressionError> {
        self.enter()?;
        let result = self.or_test();
        self.leave();
        result
    }

    fn or_test(&mut self) -> Result<Expr, ExpressionError> {
        let first = self.and_test()?;
        if !self.peek_keyword("or") {
            return Ok(first);
        }
        let mut values = vec![first];
        while self.eat_keyword("or") {
            values.push(self.and_test()?);
        }
        Ok(Expr::Bool {
            op: BoolOp::Or,
            values,
        })
    }

    fn and_test(&mut self) -> Result<Expr, ExpressionError> {
        let first = self.not_test()?;
        if !self.peek_keyword("and") {
            return Ok(first);
        }
        let mut values = vec![first];
        while self.eat_keyword("and") {
            values.push(self.not_test()?);
        }
        Ok(Expr::Bool {
            op: BoolOp::And,
            values,
        })
    }

    fn not_test(&mut self) -> Result<Expr, ExpressionError> {
        if self.eat_keyword("not") {
            self.enter()?;
            let operand = self.not_test();
            self.leave();
            return Ok(Expr::unary(UnaryOp::Not, operand?));
        }
        self.comparison()
    }

    fn comparison(&mut self) -> Result<Expr, ExpressionError> {
        let left = self.bit_or()?;
        let mut comparisons = Vec::new();
        while let Some(op) = self.compare_op() {
            comparisons.push((op, self.bit_or()?));
        }
        if comparisons.is_empty() {
            Ok(left)
        } else {
            Ok(Expr::Compare {
                left: Box::new(left),
                comparisons,
            })
        }
    }

    fn compare_op(&mut self) -> Option<CompareOp> {
        let op = match self.peek_symbol() {
            Some(Symbol::Lt) => CompareOp::Lt,
            Some(Symbol::Gt) => CompareOp::Gt,
            Some(Symbol::Le) => CompareOp::Le,
            Some(Symbol::Ge) => CompareOp::Ge,
            Some(Symbol::EqEq) => CompareOp::Eq,
            Some(Symbol::NotEq) => CompareOp::NotEq,
            _ => {
                if self.eat_keyword("in") {
                    return Some(CompareOp::In);
                }
                if self.peek_keyword("not") && self.peek_keyword_at(1, "in") {
                    self.pos += 2;
                    return Some(CompareOp::NotIn);
                }
                if self.eat_keyword("is") {
                    if self.eat_keyword("not") {
                        return Some(CompareOp::IsNot);
                    }
                    return Some(CompareOp::Is);
                }
                return None;
            }
        };
        self.pos += 1;
        Some(op)
    }

    fn binary_level(
        &mut self,
        operators: &[(Symbol, BinaryOp)],
        next: fn(&mut Self) -> Result<Expr, ExpressionError>,
    ) -> Result<Expr, ExpressionError> {
        let mut left = next(self)?;
        loop {
            let Some(symbol) = self.peek_symbol() else {
                return Ok(left);
            };
            let Some((_, op)) = operators.iter().find(|(s, _)| *s == symbol) else {
                return Ok(left);
            };
            self.pos += 1;
            let right = next(self)?;
            left = Expr::binary(*op, left, right);
        }
    }

    fn bit_or(&mut self) -> Result<Expr, ExpressionError> {
        self.binary_level(&[(Symbol::Pipe, BinaryOp::BitOr)], Self::bit_xor)
    }

    fn bit_xor(&mut self) -> Result<Expr, ExpressionError> {
        self.binary_level(&[(Symbol::Caret, BinaryOp::BitXor)], Self::bit_and)
    }

    fn bit_and(&mut self) -> Result<Expr, ExpressionError> {
        self.binary_level(&[(Symbol::Amp, BinaryOp::BitAnd)], Self::shift)
    }

    fn shift(&mut self) -> Result<Expr, ExpressionError> {
        self.binary_level(
            &[(Symbol::Shl, BinaryOp::Shl), (Symbol::Shr, BinaryOp::Shr)],
            Self::arith,
        )
    }

    fn arith(&mut self) -> Result<Expr, ExpressionError> {
        self.binary_level(
            &[(Symbol::Plus, BinaryOp::Add), (Symbol::Minus, BinaryOp::Sub)],
            Self::term,
        )
    }

    fn term(&mut self) -> Result<Expr, ExpressionError> {
        self.binary_level(
            &[
                (Symbol::Star, BinaryOp::Mul),
                (Symbol::Slash, BinaryOp::Div),
                (Symbol::DoubleSlash, BinaryOp::FloorDiv),
                (Symbol::Percent, BinaryOp::Mod),
            ],
            Self::factor,
        )
    }

    fn factor(&mut self) -> Result<Expr, ExpressionError> {
        let op = match self.peek_symbol() {
            Some(Symbol::Plus) => UnaryOp::Plus,
            Some(Symbol::Minus) => UnaryOp::Minus,
            Some(Symbol::Tilde) => UnaryOp::Invert,
            _ => return self.power(),
        };
        self.pos += 1;
        self.enter()?;
        let operand = self.factor();
        self.leave();
        Ok(Expr::unary(op, operand?))
    }

    fn power(&mut self) -> Result<Expr, ExpressionError> {
        let base = self.primary()?;
        if self.eat_symbol(Symbol::DoubleStar) {
            self.enter()?;
            let exponent = self.factor();
            self.leave();
            return Ok(Expr::binary(BinaryOp::Pow, base, exponent?));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<Expr, ExpressionError> {
        let mut expr = self.atom()?;
        loop {
            if self.eat_symbol(Symbol::LParen) {
                let args = self.call_arguments()?;
                expr = Expr::Call {
                    func: Box::new(expr),
                    args,
                };
            } else if self.eat_symbol(Symbol::Dot) {
                match self.peek() {
                    Some(Token::Name(name)) => {
                        let attr = name.clone();
                        self.pos += 1;
                        expr = Expr::Attribute {
                            value: Box::new(expr),
                            attr,
                        };
                    }
                    _ => return Err(self.unexpected()),
                }
            } else if self.eat_symbol(Symbol::LBracket) {
                let index = self.expression_list()?;
                self.expect_symbol(Symbol::RBracket)?;
                expr = Expr::Subscript {
                    value: Box::new(expr),
                    index: Box::new(index),
                };
            } else {
                return Ok(expr);
            }
        }
    }

    /// Arguments after an opening parenthesis, consuming the closing one.
    /// Keyword arguments (`f(x=1)`) are parsed and kept as plain values.
    fn call_arguments(&mut self) -> Result<Vec<Expr>, ExpressionError> {
        let mut args = Vec::new();
        while !self.eat_symbol(Symbol::RParen) {
            let mut arg = self.expression()?;
            if self.eat_symbol(Symbol::Assign) {
                arg = self.expression()?;
            }
            args.push(arg);
            if !self.eat_symbol(Symbol::Comma) {
                self.expect_symbol(Symbol::RParen)?;
                break;
            }
        }
        Ok(args)
    }

    fn atom(&mut self) -> Result<Expr, ExpressionError> {
        let Some(spanned) = self.tokens.get(self.pos).cloned() else {
            return Err(self.unexpected());
        };

        match spanned.token {
            Token::Number(text) => {
                self.pos += 1;
                Ok(Expr::Number(text))
            }
            Token::Str(value) => {
                self.pos += 1;
                Ok(Expr::Str(value))
            }
            Token::Name(name) if KEYWORDS.contains(&name.as_str()) => Err(self.unexpected()),
            Token::Name(name) => {
                self.pos += 1;
                Ok(Expr::Name(name))
            }
            Token::Symbol(Symbol::LParen) => {
                self.pos += 1;
                if self.eat_symbol(Symbol::RParen) {
                    return Ok(Expr::Tuple(Vec::new()));
                }
                self.enter()?;
                let inner = self.expression_list();
                self.leave();
                let inner = inner?;
                self.expect_symbol(Symbol::RParen)?;
                Ok(inner)
            }
            Token::Symbol(Symbol::LBracket) => {
                self.pos += 1;
                let mut items = Vec::new();
                while !self.eat_symbol(Symbol::RBracket) {
                    items.push(self.expression()?);
                    if !self.eat_symbol(Symbol::Comma) {
                        self.expect_symbol(Symbol::RBracket)?;
                        break;
                    }
                }
                Ok(Expr::List(items))
            }
            Token::Symbol(_) => Err(self.unexpected()),
        }
    }
}

fn token_text(token: &Token) -> String {
    match token {
        Token::Number(text) => format!("number {}", text),
        Token::Str(_) => "string literal".to_string(),
        Token::Name(name) => format!("'{}'", name),
        Token::Symbol(symbol) => format!("'{}'", symbol.as_str()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(text: &str) -> Expr {
        Expr::Number(text.to_string())
    }

    #[test]
    fn test_precedence_mul_over_add() {
        let expr = parse("25 * 4 + 10").unwrap();
        assert_eq!(
            expr,
            Expr::binary(
                BinaryOp::Add,
                Expr::binary(BinaryOp::Mul, num("25"), num("4")),
                num("10"),
            )
        );
    }

    #[test]
    fn test_parentheses_override_precedence() {
        let expr = parse("(1 + 2) * 3").unwrap();
        assert_eq!(
            expr,
            Expr::binary(
                BinaryOp::Mul,
                Expr::binary(BinaryOp::Add, num("1"), num("2")),
                num("3"),
            )
        );
    }

    #[test]
    fn test_power_is_right_associative() {
        let expr = parse("2 ** 3 ** 2").unwrap();
        assert_eq!(
            expr,
            Expr::binary(
                BinaryOp::Pow,
                num("2"),
                Expr::binary(BinaryOp::Pow, num("3"), num("2")),
            )
        );
    }

    #[test]
    fn test_unary_minus_binds_looser_than_power() {
        let expr = parse("-2 ** 2").unwrap();
        assert_eq!(
            expr,
            Expr::unary(
                UnaryOp::Minus,
                Expr::binary(BinaryOp::Pow, num("2"), num("2"))
            )
        );
    }

    #[test]
    fn test_power_accepts_signed_exponent() {
        let expr = parse("2 ** -1").unwrap();
        assert_eq!(
            expr,
            Expr::binary(BinaryOp::Pow, num("2"), Expr::unary(UnaryOp::Minus, num("1")))
        );
    }

    #[test]
    fn test_subtraction_is_left_associative() {
        let expr = parse("10 - 4 - 3").unwrap();
        assert_eq!(
            expr,
            Expr::binary(
                BinaryOp::Sub,
                Expr::binary(BinaryOp::Sub, num("10"), num("4")),
                num("3"),
            )
        );
    }

    #[test]
    fn test_call_and_attribute_parse() {
        let expr = parse("__import__('os').system('ls')").unwrap();
        match expr {
            Expr::Call { func, args } => {
                assert_eq!(args, vec![Expr::Str("ls".into())]);
                assert!(matches!(*func, Expr::Attribute { ref attr, .. } if attr == "system"));
            }
            other => panic!("expected call, got {:?}", other),
        }
    }

    #[test]
    fn test_comparison_and_boolean_parse() {
        assert!(matches!(parse("1 < 2").unwrap(), Expr::Compare { .. }));
        assert!(matches!(parse("1 not in x").unwrap(), Expr::Compare { .. }));
        assert!(matches!(
            parse("1 and 2").unwrap(),
            Expr::Bool {
                op: BoolOp::And,
                ..
            }
        ));
        assert!(matches!(
            parse("not 1").unwrap(),
            Expr::Unary {
                op: UnaryOp::Not,
                ..
            }
        ));
    }

    #[test]
    fn test_tuples_and_lists() {
        assert_eq!(parse("1, 2").unwrap(), Expr::Tuple(vec![num("1"), num("2")]));
        assert_eq!(parse("()").unwrap(), Expr::Tuple(vec![]));
        assert_eq!(parse("[1]").unwrap(), Expr::List(vec![num("1")]));
    }

    #[test]
    fn test_syntax_errors() {
        assert!(parse("").is_err());
        assert!(parse("1 +").is_err());
        assert!(parse("(1 + 2").is_err());
        assert!(parse("1 2").is_err());
        assert!(parse("and").is_err());
    }

    #[test]
    fn test_nesting_limit() {
        let deep = format!("{}1{}", "(".repeat(500), ")".repeat(500));
        let err = parse(&deep).unwrap_err();
        assert!(err.to_string().contains("nested too deeply"));
    }

    #[test]
    fn test_token_limit() {
        let long = vec!["1"; MAX_TOKENS].join("+");
        let err = parse(&long).unwrap_err();
        assert!(err.to_string().contains("too long"));
    }
}
