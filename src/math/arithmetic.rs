//! Basic and advanced single-number operations.

use super::{finite, number, MathResult};
use crate::mcp::registry::{ToolError, ToolOutcome};

/// Largest `n` whose factorial fits in an `f64`.
pub const MAX_FACTORIAL: u32 = 170;

#[must_use]
pub fn add(a: f64, b: f64) -> ToolOutcome {
    let result = a + b;
    ToolOutcome::new(number(result), format!("Addition: {a} + {b} = {result}"))
        .steps([format!("Add {a} and {b}"), format!("Result: {result}")])
}

#[must_use]
pub fn subtract(a: f64, b: f64) -> ToolOutcome {
    let result = a - b;
    ToolOutcome::new(number(result), format!("Subtraction: {a} - {b} = {result}"))
        .steps([format!("Subtract {b} from {a}"), format!("Result: {result}")])
}

#[must_use]
pub fn multiply(a: f64, b: f64) -> ToolOutcome {
    let result = a * b;
    ToolOutcome::new(number(result), format!("Multiplication: {a} × {b} = {result}"))
        .steps([format!("Multiply {a} by {b}"), format!("Result: {result}")])
}

/// # Errors
///
/// Fails when `b` is zero.
pub fn divide(a: f64, b: f64) -> MathResult {
    if b == 0.0 {
        return Err(ToolError::new("Division by zero is undefined"));
    }
    let result = a / b;
    Ok(
        ToolOutcome::new(number(result), format!("Division: {a} ÷ {b} = {result}"))
            .steps([format!("Divide {a} by {b}"), format!("Result: {result}")]),
    )
}

/// # Errors
///
/// Fails when the result overflows or is not real.
pub fn power(base: f64, exponent: f64) -> MathResult {
    let result = finite(base.powf(exponent), "Power result")
        .map_err(|e| ToolError::new(format!("Error in power calculation: {}", e.message())))?;
    Ok(ToolOutcome::new(
        number(result),
        format!("Exponentiation: {base}^{exponent} = {result}"),
    )
    .steps([
        format!("Raise {base} to the power of {exponent}"),
        format!("Result: {result}"),
    ]))
}

/// # Errors
///
/// Fails for negative input.
pub fn sqrt(n: f64) -> MathResult {
    if n < 0.0 {
        return Err(ToolError::new("Square root of negative number is not real"));
    }
    let result = n.sqrt();
    Ok(ToolOutcome::new(number(result), format!("Square root: √{n} = {result}"))
        .steps([format!("Calculate square root of {n}"), format!("Result: {result}")]))
}

/// # Errors
///
/// Fails unless `n` is a non-negative integer no larger than
/// [`MAX_FACTORIAL`].
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn factorial(n: f64) -> MathResult {
    if n < 0.0 || n.fract() != 0.0 {
        return Err(ToolError::new(
            "Factorial is only defined for non-negative integers",
        ));
    }
    if n > f64::from(MAX_FACTORIAL) {
        return Err(ToolError::new(format!(
            "Number too large for factorial calculation (maximum is {MAX_FACTORIAL})"
        )));
    }

    // Whole and within 0..=170
    let n = n as u32;
    let result = (1..=n).fold(1.0_f64, |acc, k| acc * f64::from(k));
    Ok(ToolOutcome::new(number(result), format!("Factorial: {n}! = {result}"))
        .steps([format!("Calculate {n}!"), format!("Result: {result}")]))
}

#[must_use]
pub fn abs(x: f64) -> ToolOutcome {
    let result = x.abs();
    ToolOutcome::new(number(result), format!("Absolute value: |{x}| = {result}"))
        .steps([format!("Take absolute value of {x}"), format!("Result: {result}")])
}

/// Rounds half away from zero to `decimals` places. Negative `decimals`
/// round to tens, hundreds and so on. More places than `f64` can scale to
/// leave `x` unchanged, and a coarser precision than that rounds to zero.
///
/// # Errors
///
/// Fails if the scaled value overflows.
pub fn round_number(x: f64, decimals: i32) -> MathResult {
    // Scale by an exact power of ten in both directions
    let scale = 10_f64.powi(decimals.saturating_abs());
    let rounded = if decimals >= 0 {
        if (x * scale).is_finite() {
            (x * scale).round() / scale
        } else {
            x
        }
    } else if scale.is_finite() {
        (x / scale).round() * scale
    } else {
        0.0_f64.copysign(x)
    };
    let result = finite(rounded, "Rounded value")?;
    Ok(ToolOutcome::new(
        number(result),
        format!("Round {x} to {decimals} decimal places: {result}"),
    )
    .steps([
        format!("Round {x} to {decimals} decimal places"),
        format!("Result: {result}"),
    ]))
}

/// What percentage `part` is of `whole`.
///
/// # Errors
///
/// Fails when `whole` is zero.
pub fn percentage(part: f64, whole: f64) -> MathResult {
    if whole == 0.0 {
        return Err(ToolError::new(
            "Cannot calculate percentage with zero as whole",
        ));
    }
    let result = part / whole * 100.0;
    Ok(
        ToolOutcome::new(number(result), format!("{part} is {result}% of {whole}")).steps([
            "Percentage = (part/whole) × 100".to_string(),
            format!("Percentage = ({part}/{whole}) × 100 = {result}%"),
        ]),
    )
}
