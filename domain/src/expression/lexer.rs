//! Tokenizer for expression text
//!
//! Recognizes the full surface syntax a user (or a model) may type, including
//! names, strings and comparison operators. Rejecting those is the
//! evaluator's job, not the lexer's.

use super::error::ExpressionError;

/// Punctuation and operator symbols
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    Plus,
    Minus,
    Star,
    DoubleStar,
    Slash,
    DoubleSlash,
    Percent,
    Tilde,
    Amp,
    Pipe,
    Caret,
    Shl,
    Shr,
    Lt,
    Gt,
    Le,
    Ge,
    EqEq,
    NotEq,
    Assign,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Dot,
}

impl Symbol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Symbol::Plus => "+",
            Symbol::Minus => "-",
            Symbol::Star => "*",
            Symbol::DoubleStar => "**",
            Symbol::Slash => "/",
            Symbol::DoubleSlash => "//",
            Symbol::Percent => "%",
            Symbol::Tilde => "~",
            Symbol::Amp => "&",
            Symbol::Pipe => "|",
            Symbol::Caret => "^",
            Symbol::Shl => "<<",
            Symbol::Shr => ">>",
            Symbol::Lt => "<",
            Symbol::Gt => ">",
            Symbol::Le => "<=",
            Symbol::Ge => ">=",
            Symbol::EqEq => "==",
            Symbol::NotEq => "!=",
            Symbol::Assign => "=",
            Symbol::LParen => "(",
            Symbol::RParen => ")",
            Symbol::LBracket => "[",
            Symbol::RBracket => "]",
            Symbol::Comma => ",",
            Symbol::Dot => ".",
        }
    }
}

/// A lexical token
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Numeric literal, kept as source text until evaluation
    Number(String),
    /// Quoted string literal (unescaped contents)
    Str(String),
    /// Identifier or keyword
    Name(String),
    Symbol(Symbol),
}

/// A token with its byte offset in the source
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub offset: usize,
}

/// Two-character symbols must be tried before their one-character prefixes.
const DOUBLE_SYMBOLS: &[(&str, Symbol)] = &[
    ("**", Symbol::DoubleStar),
    ("//", Symbol::DoubleSlash),
    ("<<", Symbol::Shl),
    (">>", Symbol::Shr),
    ("<=", Symbol::Le),
    (">=", Symbol::Ge),
    ("==", Symbol::EqEq),
    ("!=", Symbol::NotEq),
];

fn single_symbol(c: char) -> Option<Symbol> {
    let symbol = match c {
        '+' => Symbol::Plus,
        '-' => Symbol::Minus,
        '*' => Symbol::Star,
        '/' => Symbol::Slash,
        '%' => Symbol::Percent,
        '~' => Symbol::Tilde,
        '&' => Symbol::Amp,
        '|' => Symbol::Pipe,
        '^' => Symbol::Caret,
        '<' => Symbol::Lt,
        '>' => Symbol::Gt,
        '=' => Symbol::Assign,
        '(' => Symbol::LParen,
        ')' => Symbol::RParen,
        '[' => Symbol::LBracket,
        ']' => Symbol::RBracket,
        ',' => Symbol::Comma,
        '.' => Symbol::Dot,
        _ => return None,
    };
    Some(symbol)
}

/// Split expression text into tokens.
pub fn tokenize(source: &str) -> Result<Vec<Spanned>, ExpressionError> {
    let mut tokens = Vec::new();
    let bytes = source.as_bytes();
    let mut pos = 0;

    while pos < source.len() {
        let rest = &source[pos..];
        let Some(c) = rest.chars().next() else {
            break;
        };

        if c.is_whitespace() {
            pos += c.len_utf8();
            continue;
        }

        let starts_number =
            c.is_ascii_digit() || (c == '.' && bytes.get(pos + 1).is_some_and(u8::is_ascii_digit));
        if starts_number {
            let len = scan_number(rest)?;
            tokens.push(Spanned {
                token: Token::Number(rest[..len].replace('_', "")),
                offset: pos,
            });
            pos += len;
            continue;
        }

        if c.is_alphabetic() || c == '_' {
            let len = rest
                .char_indices()
                .find(|(_, ch)| !(ch.is_alphanumeric() || *ch == '_'))
                .map(|(i, _)| i)
                .unwrap_or(rest.len());
            tokens.push(Spanned {
                token: Token::Name(rest[..len].to_string()),
                offset: pos,
            });
            pos += len;
            continue;
        }

        if c == '\'' || c == '"' {
            let (value, len) = scan_string(rest, c, pos)?;
            tokens.push(Spanned {
                token: Token::Str(value),
                offset: pos,
            });
            pos += len;
            continue;
        }

        if let Some((text, symbol)) = DOUBLE_SYMBOLS.iter().find(|(text, _)| rest.starts_with(text))
        {
            tokens.push(Spanned {
                token: Token::Symbol(*symbol),
                offset: pos,
            });
            pos += text.len();
            continue;
        }

        match single_symbol(c) {
            Some(symbol) => {
                tokens.push(Spanned {
                    token: Token::Symbol(symbol),
                    offset: pos,
                });
                pos += 1;
            }
            None => {
                return Err(ExpressionError::syntax(format!(
                    "unexpected character '{}' at position {}",
                    c, pos
                )));
            }
        }
    }

    Ok(tokens)
}

/// Length in bytes of the numeric literal at the start of `text`.
///
/// Accepts `123`, `1_000`, `1.5`, `.5`, `1.`, `2e10`, `1.5E-3`, `00`.
/// Rejects `0777`, `1_`, `1__0` and `1._5`.
fn scan_number(text: &str) -> Result<usize, ExpressionError> {
    let bytes = text.as_bytes();

    let int_end = digit_part(text, 0)?;
    let mut end = int_end;
    let mut is_float = false;

    if end < bytes.len() && bytes[end] == b'.' {
        is_float = true;
        end = digit_part(text, end + 1)?;
    }
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        is_float = true;
        let mut exp = end + 1;
        if exp < bytes.len() && (bytes[exp] == b'+' || bytes[exp] == b'-') {
            exp += 1;
        }
        let exp_end = digit_part(text, exp)?;
        if exp_end == exp {
            return Err(malformed(text, exp_end));
        }
        end = exp_end;
    }

    // `12abc` is never a valid literal
    if end < bytes.len() && (bytes[end].is_ascii_alphabetic() || bytes[end] == b'_') {
        return Err(malformed(text, end + 1));
    }

    let integer = &text[..int_end];
    if !is_float && integer.starts_with('0') && integer.bytes().any(|b| (b'1'..=b'9').contains(&b))
    {
        return Err(ExpressionError::syntax(format!(
            "leading zeros in decimal integer literals are not permitted: '{}'",
            integer
        )));
    }

    Ok(end)
}

/// End of the digit run starting at `from`. `_` may only sit between two digits.
fn digit_part(text: &str, from: usize) -> Result<usize, ExpressionError> {
    let bytes = text.as_bytes();
    let mut i = from;
    while i < bytes.len() {
        match bytes[i] {
            b'0'..=b'9' => i += 1,
            b'_' if i > from && bytes.get(i + 1).is_some_and(u8::is_ascii_digit) => i += 1,
            b'_' => return Err(malformed(text, i + 1)),
            _ => break,
        }
    }
    Ok(i)
}

fn malformed(text: &str, end: usize) -> ExpressionError {
    ExpressionError::syntax(format!("malformed number '{}'", &text[..end.min(text.len())]))
}

/// Scan a quoted string starting at `text[0] == quote`.
fn scan_string(text: &str, quote: char, offset: usize) -> Result<(String, usize), ExpressionError> {
    let mut value = String::new();
    let mut chars = text.char_indices().skip(1);

    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => {
                if let Some((_, escaped)) = chars.next() {
                    value.push(escaped);
                }
            }
            c if c == quote => return Ok((value, i + c.len_utf8())),
            c => value.push(c),
        }
    }

    Err(ExpressionError::syntax(format!(
        "unterminated string starting at position {}",
        offset
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|s| s.token)
            .collect()
    }

    #[test]
    fn test_arithmetic_tokens() {
        assert_eq!(
            kinds("25 * 4 + 10"),
            vec![
                Token::Number("25".into()),
                Token::Symbol(Symbol::Star),
                Token::Number("4".into()),
                Token::Symbol(Symbol::Plus),
                Token::Number("10".into()),
            ]
        );
    }

    #[test]
    fn test_double_symbols_win() {
        assert_eq!(
            kinds("2**3//4"),
            vec![
                Token::Number("2".into()),
                Token::Symbol(Symbol::DoubleStar),
                Token::Number("3".into()),
                Token::Symbol(Symbol::DoubleSlash),
                Token::Number("4".into()),
            ]
        );
    }

    #[test]
    fn test_number_forms() {
        assert_eq!(kinds(".5"), vec![Token::Number(".5".into())]);
        assert_eq!(kinds("1."), vec![Token::Number("1.".into())]);
        assert_eq!(kinds("1_000"), vec![Token::Number("1000".into())]);
        assert_eq!(kinds("1.5e-3"), vec![Token::Number("1.5e-3".into())]);
    }

    #[test]
    fn test_names_and_strings() {
        assert_eq!(
            kinds("__import__('os')"),
            vec![
                Token::Name("__import__".into()),
                Token::Symbol(Symbol::LParen),
                Token::Str("os".into()),
                Token::Symbol(Symbol::RParen),
            ]
        );
    }

    #[test]
    fn test_malformed_number() {
        assert!(tokenize("12abc").is_err());
        assert!(tokenize("1e").is_err());
    }

    #[test]
    fn test_literals_outside_decimal_grammar() {
        for source in ["0777", "01", "1_", "1__000", "1._5", "1.5_", "1e_5", "1_e5"] {
            let err = tokenize(source).unwrap_err();
            assert!(
                matches!(err, ExpressionError::Syntax(_)),
                "{} should be a syntax error, got {:?}",
                source,
                err
            );
        }
    }

    #[test]
    fn test_zero_and_underscore_forms_still_accepted() {
        assert_eq!(kinds("00"), vec![Token::Number("00".into())]);
        assert_eq!(kinds("0_0"), vec![Token::Number("00".into())]);
        assert_eq!(kinds("0777.5"), vec![Token::Number("0777.5".into())]);
        assert_eq!(kinds("1e1_0"), vec![Token::Number("1e10".into())]);
        assert_eq!(kinds("1_000.2_5"), vec![Token::Number("1000.25".into())]);
    }

    #[test]
    fn test_unterminated_string() {
        let err = tokenize("'abc").unwrap_err();
        assert!(err.to_string().contains("unterminated string"));
    }

    #[test]
    fn test_unknown_character() {
        let err = tokenize("2 $ 3").unwrap_err();
        assert!(err.to_string().contains("'$'"));
    }

    #[test]
    fn test_offsets() {
        let tokens = tokenize("1 +  2").unwrap();
        let offsets: Vec<_> = tokens.iter().map(|t| t.offset).collect();
        assert_eq!(offsets, vec![0, 2, 5]);
    }
}
