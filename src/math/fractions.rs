//! Fraction simplification and fraction/decimal conversion.

use serde::Deserialize;

use super::{number, MathResult};
use crate::mcp::registry::{ToolError, ToolOutcome};

/// Largest denominator `convert_to_fraction` will produce.
pub const MAX_DENOMINATOR: u128 = 1000;

/// Decimals at or above this magnitude are not converted.
const MAX_DECIMAL: f64 = 1e15;

/// Below this magnitude the closest bounded fraction is always `0/1`.
const MIN_DECIMAL: f64 = 1e-18;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FractionOp {
    SimplifyFraction,
    ConvertToDecimal,
    ConvertToFraction,
}

impl FractionOp {
    pub const NAMES: &'static [&'static str] =
        &["simplify_fraction", "convert_to_decimal", "convert_to_fraction"];
}

const fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

fn nonzero_denominator(denominator: i64) -> Result<(), ToolError> {
    if denominator == 0 {
        return Err(ToolError::new("Denominator cannot be zero"));
    }
    Ok(())
}

/// Reduces `numerator/denominator` to lowest terms with a positive
/// denominator.
///
/// # Errors
///
/// Fails when `denominator` is zero.
pub fn simplify_fraction(numerator: i64, denominator: i64) -> MathResult {
    nonzero_denominator(denominator)?;

    let (n, d) = (i128::from(numerator), i128::from(denominator));
    let g = gcd(n.unsigned_abs(), d.unsigned_abs());
    // g divides both, so it fits in i128
    let g = i128::try_from(g).map_err(|_| ToolError::new("Fraction is too large"))?;
    let sign = if d < 0 { -1 } else { 1 };
    let too_large = |_| ToolError::new("Fraction is too large");
    let sn = i64::try_from(sign * n / g).map_err(too_large)?;
    let sd = i64::try_from(sign * d / g).map_err(too_large)?;

    Ok(ToolOutcome::new(
        serde_json::json!([sn, sd]),
        format!("Simplified fraction: {numerator}/{denominator} = {sn}/{sd}"),
    )
    .steps([
        format!("Original fraction: {numerator}/{denominator}"),
        format!("GCD of {numerator} and {denominator} is {g}"),
        format!("Simplified: {sn}/{sd}"),
    ]))
}

/// # Errors
///
/// Fails when `denominator` is zero.
#[allow(clippy::cast_precision_loss)]
pub fn convert_to_decimal(numerator: i64, denominator: i64) -> MathResult {
    nonzero_denominator(denominator)?;
    let decimal = numerator as f64 / denominator as f64;
    Ok(ToolOutcome::new(
        number(decimal),
        format!("Fraction to decimal: {numerator}/{denominator} = {decimal}"),
    )
    .steps([
        format!("Divide {numerator} by {denominator}"),
        format!("Result: {decimal}"),
    ]))
}

/// Closest fraction to `decimal` with a denominator of at most
/// [`MAX_DENOMINATOR`].
///
/// # Errors
///
/// Fails for non-finite input or magnitudes of 1e15 and above.
pub fn convert_to_fraction(decimal: f64) -> MathResult {
    if !decimal.is_finite() || decimal.abs() >= MAX_DECIMAL {
        return Err(ToolError::new(format!(
            "Cannot convert {decimal} to a fraction (magnitude must be below {MAX_DECIMAL})"
        )));
    }

    let (p, q) = limit_denominator(decimal.abs(), MAX_DENOMINATOR);
    let too_large = |_| ToolError::new("Fraction is too large");
    let p = i64::try_from(p).map_err(too_large)?;
    let q = u64::try_from(q).map_err(too_large)?;
    let numerator = if decimal < 0.0 { -p } else { p };

    Ok(ToolOutcome::new(
        serde_json::json!([numerator, q]),
        format!("Decimal to fraction: {decimal} = {numerator}/{q}"),
    )
    .steps([
        format!("Convert {decimal} to fraction"),
        format!("Result: {numerator}/{q}"),
    ]))
}

/// Exact `numerator/denominator` of a non-negative float in
/// `[MIN_DECIMAL, MAX_DECIMAL)`.
fn exact_ratio(x: f64) -> (u128, u128) {
    let bits = x.to_bits();
    let biased = (bits >> 52) & 0x7ff;
    let fraction = bits & 0x000f_ffff_ffff_ffff;
    let mut mantissa = u128::from(if biased == 0 {
        fraction << 1
    } else {
        fraction | 0x0010_0000_0000_0000
    });
    // Bounded by 0x7ff, the cast is lossless
    #[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
    let mut exponent = biased as i32 - 1075;

    if exponent >= 0 {
        return (mantissa << exponent, 1);
    }
    #[allow(clippy::cast_possible_wrap)]
    let shift = (mantissa.trailing_zeros() as i32).min(-exponent);
    mantissa >>= shift;
    exponent += shift;
    (mantissa, 1_u128 << -exponent)
}

/// Best rational approximation by continued fractions.
#[allow(clippy::cast_precision_loss)]
fn limit_denominator(x: f64, max_denominator: u128) -> (u128, u128) {
    if x < MIN_DECIMAL {
        return (0, 1);
    }

    let (mut n, mut d) = exact_ratio(x);
    if d <= max_denominator {
        return (n, d);
    }

    let (mut p0, mut q0, mut p1, mut q1) = (0_u128, 1_u128, 1_u128, 0_u128);
    loop {
        let a = n / d;
        let q2 = match a.checked_mul(q1).and_then(|aq| aq.checked_add(q0)) {
            Some(q2) if q2 <= max_denominator => q2,
            _ => break,
        };
        (p0, q0, p1, q1) = (p1, q1, p0 + a * p1, q2);
        (n, d) = (d, n - a * d);
    }

    let k = (max_denominator - q0) / q1;
    let lower = (p0 + k * p1, q0 + k * q1);
    let upper = (p1, q1);

    let error = |(p, q): (u128, u128)| (p as f64 / q as f64 - x).abs();
    if error(upper) <= error(lower) {
        upper
    } else {
        lower
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn simplifies_with_sign_on_numerator() {
        assert_eq!(simplify_fraction(6, 8).unwrap().result, json!([3, 4]));
        assert_eq!(simplify_fraction(3, -9).unwrap().result, json!([-1, 3]));
        assert_eq!(simplify_fraction(0, 5).unwrap().result, json!([0, 1]));
    }

    #[test]
    fn zero_denominator_fails() {
        assert!(simplify_fraction(1, 0).is_err());
        assert!(convert_to_decimal(1, 0).is_err());
    }

    #[test]
    fn fraction_to_decimal() {
        assert_eq!(convert_to_decimal(3, 4).unwrap().result, json!(0.75));
    }

    #[test]
    fn decimal_to_fraction() {
        assert_eq!(convert_to_fraction(0.75).unwrap().result, json!([3, 4]));
        assert_eq!(convert_to_fraction(-0.5).unwrap().result, json!([-1, 2]));
        assert_eq!(convert_to_fraction(2.0).unwrap().result, json!([2, 1]));
        assert_eq!(convert_to_fraction(0.0).unwrap().result, json!([0, 1]));
    }

    #[test]
    fn denominator_is_limited() {
        assert_eq!(
            convert_to_fraction(std::f64::consts::PI).unwrap().result,
            json!([355, 113])
        );
        assert_eq!(convert_to_fraction(0.1).unwrap().result, json!([1, 10]));
        assert_eq!(convert_to_fraction(1.0 / 3.0).unwrap().result, json!([1, 3]));
    }

    #[test]
    fn huge_decimals_are_rejected() {
        assert!(convert_to_fraction(1e16).is_err());
        assert!(convert_to_fraction(f64::NAN).is_err());
    }
}
