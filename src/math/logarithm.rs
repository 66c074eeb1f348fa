//! Logarithms in an arbitrary base or base ten.

use std::f64::consts::E;

use super::{number, MathResult};
use crate::mcp::registry::{ToolError, ToolOutcome};

fn require_positive(x: f64) -> Result<(), ToolError> {
    if x <= 0.0 {
        return Err(ToolError::new(
            "Logarithm is only defined for positive real numbers",
        ));
    }
    Ok(())
}

/// `log_base(x)`; the natural logarithm when `base` is `e`.
///
/// # Errors
///
/// Fails for `x ≤ 0`, and for a base that is not positive or equals 1.
#[allow(clippy::float_cmp)]
pub fn log(x: f64, base: f64) -> MathResult {
    require_positive(x)?;
    if base <= 0.0 || base == 1.0 {
        return Err(ToolError::new(
            "Logarithm base must be positive and not equal to 1",
        ));
    }

    let (result, explanation) = if base == E {
        let result = x.ln();
        (result, format!("Natural logarithm: ln({x}) = {result}"))
    } else {
        let result = x.ln() / base.ln();
        (
            result,
            format!("Logarithm base {base}: log_{base}({x}) = {result}"),
        )
    };

    Ok(ToolOutcome::new(number(result), explanation)
        .steps([format!("Calculate logarithm of {x}"), format!("Result: {result}")]))
}

/// # Errors
///
/// Fails for `x ≤ 0`.
pub fn log10(x: f64) -> MathResult {
    require_positive(x)?;
    let result = x.log10();
    Ok(ToolOutcome::new(
        number(result),
        format!("Common logarithm: log₁₀({x}) = {result}"),
    )
    .steps([format!("Calculate log base 10 of {x}"), format!("Result: {result}")]))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn natural_log_is_labelled() {
        let outcome = log(E, E).unwrap();
        assert_eq!(outcome.result, json!(1));
        assert!(outcome.explanation.starts_with("Natural logarithm"));
    }

    #[test]
    fn other_bases() {
        let outcome = log(8.0, 2.0).unwrap();
        assert!((outcome.result.as_f64().unwrap() - 3.0).abs() < 1e-12);
        assert!((log10(1000.0).unwrap().result.as_f64().unwrap() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn invalid_inputs_fail() {
        assert!(log(0.0, E).is_err());
        assert!(log(-1.0, 10.0).is_err());
        assert!(log(5.0, 1.0).is_err());
        assert!(log(5.0, -2.0).is_err());
        assert!(log10(0.0).is_err());
    }
}
