//! Text tool: reverse_string

use lab_domain::Tool;
use tracing::info;

pub const REVERSE_STRING: &str = "reverse_string";

pub fn reverse_string_tool() -> Tool {
    Tool::new(
        REVERSE_STRING,
        "Reverses a string. Input should be a single string.",
        reverse_string,
    )
}

/// Reverse by Unicode scalar values
pub fn reverse_string(input: &str) -> String {
    info!(tool = REVERSE_STRING, input, "reverse_string tool called");
    let reversed: String = input.chars().rev().collect();
    info!(tool = REVERSE_STRING, result = %reversed, "reverse_string result");
    reversed
}
