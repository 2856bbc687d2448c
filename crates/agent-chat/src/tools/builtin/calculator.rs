//! Arithmetic expression tool

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::tools::{ParameterProperty, ParameterSchema, Tool, ToolContext, ToolResult};

/// Evaluates a mathematical expression and reports `<expr> = <value>`
pub struct CalculatorTool;

#[async_trait]
impl Tool for CalculatorTool {
    fn name(&self) -> &str {
        "calculator"
    }

    fn description(&self) -> &str {
        "Evaluate a mathematical expression. Supports + - * / ^ %, parentheses, \
         constants (pi, e) and functions such as sqrt, abs, sin, cos, tan, ln, exp, floor, ceil, round, min and max."
    }

    fn parameters_schema(&self) -> ParameterSchema {
        ParameterSchema::new().with_required(
            "expression",
            ParameterProperty::string(
                "Mathematical expression to evaluate (e.g. '2 + 2 * 3', 'sqrt(16)')",
            ),
        )
    }

    async fn execute(&self, args: &Value, _ctx: &ToolContext) -> Result<ToolResult> {
        let expression = args
            .get("expression")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow!("Missing required parameter: expression"))?;

        let value = evaluate(expression)?;
        debug!(expression, value, "Evaluated expression");

        Ok(ToolResult::success(format!("{} = {}", expression, format_number(value))))
    }
}

fn evaluate(expression: &str) -> Result<f64> {
    let value = meval::eval_str(expression)
        .map_err(|e| anyhow!("could not evaluate '{}': {}", expression, e))?;

    if !value.is_finite() {
        bail!("'{}' does not evaluate to a finite number", expression);
    }
    Ok(value)
}

/// Integral values print without a fractional part
fn format_number(value: f64) -> String {
    if value == 0.0 {
        // Avoid "-0"
        return "0".to_string();
    }
    format!("{}", value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn run(expression: &str) -> Result<ToolResult> {
        CalculatorTool
            .execute(&json!({ "expression": expression }), &ToolContext::default())
            .await
    }

    #[tokio::test]
    async fn test_precedence() {
        let result = run("2+2*3").await.unwrap();
        assert!(result.success);
        assert_eq!(result.output, "2+2*3 = 8");
    }

    #[tokio::test]
    async fn test_functions_and_fractions() {
        assert_eq!(run("sqrt(16)").await.unwrap().output, "sqrt(16) = 4");
        assert_eq!(run("7 / 2").await.unwrap().output, "7 / 2 = 3.5");
        assert_eq!(run("(2 + 3) * 4").await.unwrap().output, "(2 + 3) * 4 = 20");
        assert_eq!(run("2^10").await.unwrap().output, "2^10 = 1024");
    }

    #[tokio::test]
    async fn test_invalid_expression_is_error() {
        let err = run("2 +* banana").await.unwrap_err();
        assert!(err.to_string().contains("could not evaluate"));
    }

    #[tokio::test]
    async fn test_division_by_zero_is_error() {
        let err = run("1/0").await.unwrap_err();
        assert!(err.to_string().contains("finite"));
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(8.0), "8");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(0.25), "0.25");
        assert_eq!(format_number(-3.0), "-3");
    }
}
