//! Output normalization
//!
//! Orchestrators return heterogeneous shapes. [`ResultShape::classify`] tags
//! the raw value, and [`extract_answer`] turns the tag into text:
//!
//! | Shape | Condition | Text |
//! |-------|-----------|------|
//! | `Direct` | mapping with non-empty `output`, `result` or `content` | that value |
//! | `Conversation` | mapping with non-empty `messages` array | last message's `content`, else its string form |
//! | `Text` | a plain string | the string |
//! | `Other` | anything else | generic string form |

use std::fmt;

use serde_json::Value;

/// Keys checked, in order, for a direct answer
pub const ANSWER_KEYS: &[&str] = &["output", "result", "content"];

/// Final answer text for one query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedAnswer {
    pub text: String,
}

impl fmt::Display for NormalizedAnswer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Tagged view over a raw orchestrator result
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResultShape<'a> {
    Direct { key: &'static str, value: &'a Value },
    Conversation { last: &'a Value },
    Text(&'a str),
    Other(&'a Value),
}

impl<'a> ResultShape<'a> {
    pub fn classify(raw: &'a Value) -> Self {
        if let Value::Object(map) = raw {
            for &key in ANSWER_KEYS {
                if let Some(value) = map.get(key)
                    && !is_empty(value)
                {
                    return ResultShape::Direct { key, value };
                }
            }
            if let Some(Value::Array(messages)) = map.get("messages")
                && let Some(last) = messages.last()
            {
                return ResultShape::Conversation { last };
            }
        }
        match raw {
            Value::String(s) => ResultShape::Text(s),
            other => ResultShape::Other(other),
        }
    }
}

/// Extract the final answer text. Never fails.
pub fn extract_answer(raw: &Value) -> NormalizedAnswer {
    let text = match ResultShape::classify(raw) {
        ResultShape::Direct { value, .. } => string_form(value),
        ResultShape::Conversation { last } => {
            match last.get("content").filter(|c| !is_empty(c)) {
                Some(content) => string_form(content),
                None => string_form(last),
            }
        }
        ResultShape::Text(s) => s.to_string(),
        ResultShape::Other(value) => value.to_string(),
    };
    NormalizedAnswer { text }
}

/// Strings as-is, everything else as compact JSON
fn string_form(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Null, `false`, zero, and empty strings, arrays and maps count as empty
fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}
