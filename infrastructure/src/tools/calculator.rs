//! Calculator tool backed by the restricted expression evaluator

use lab_domain::Tool;
use lab_domain::expression::{ERROR_PREFIX, evaluate};
use tracing::{error, info};

pub const CALCULATOR: &str = "Calculator";

pub fn calculator_tool() -> Tool {
    Tool::new(
        CALCULATOR,
        "Evaluates a math expression string (e.g., '25 * 4 + 10').",
        calculate,
    )
}

pub fn calculate(expression: &str) -> String {
    info!(tool = CALCULATOR, expression, "Calculator tool called");
    let result = evaluate(expression);
    if result.starts_with(ERROR_PREFIX) {
        error!(tool = CALCULATOR, %result, "Calculator error");
    } else {
        info!(tool = CALCULATOR, %result, "Calculator result");
    }
    result
}
