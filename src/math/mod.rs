//! Tool bodies for the math provider.
//!
//! Every function here is a stateless computation that returns either a
//! worked [`ToolOutcome`] (result, explanation, steps) or a [`ToolError`]
//! describing why the input has no answer.

pub mod algebra;
pub mod arithmetic;
pub mod concepts;
pub mod expression;
pub mod fractions;
pub mod geometry;
pub mod logarithm;
pub mod number_theory;
pub mod trig;

use serde_json::Value;

use crate::mcp::registry::{ToolError, ToolOutcome};

/// Outcome of a math tool body.
pub type MathResult = Result<ToolOutcome, ToolError>;

/// Largest magnitude below which every integer is exact in an `f64`.
const EXACT_INTEGER_LIMIT: f64 = 9_007_199_254_740_992.0;

/// Converts a float to JSON, keeping whole numbers integral.
///
/// `42.0` becomes `42`. Non-finite values become `null`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn number(x: f64) -> Value {
    if x.fract() == 0.0 && x.abs() < EXACT_INTEGER_LIMIT {
        // In range and whole, so the cast is exact
        Value::from(x as i64)
    } else {
        serde_json::Number::from_f64(x).map_or(Value::Null, Value::Number)
    }
}

/// Rejects infinities and NaN produced by a computation.
///
/// # Errors
///
/// Returns a [`ToolError`] naming `what` if `x` is not finite.
pub fn finite(x: f64, what: &str) -> Result<f64, ToolError> {
    if x.is_finite() {
        Ok(x)
    } else {
        Err(ToolError::new(format!("{what} is not a finite number")))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn whole_numbers_stay_integral() {
        assert_eq!(number(42.0), json!(42));
        assert_eq!(number(-3.0), json!(-3));
        assert_eq!(number(2.5), json!(2.5));
        assert_eq!(number(f64::NAN), Value::Null);
    }

    #[test]
    fn finite_rejects_overflow() {
        assert!(finite(f64::INFINITY, "result").is_err());
        assert_eq!(finite(1.5, "result").unwrap(), 1.5);
    }
}
