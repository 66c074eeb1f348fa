//! Integer operations: GCD, LCM, factorisation and primality.

use serde_json::Value;

use super::MathResult;
use crate::mcp::registry::{ToolError, ToolOutcome};

/// Trial division above this bound would take too long for one call.
pub const MAX_TRIAL_DIVISION: u64 = 1_000_000_000_000_000;

const fn gcd_u64(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

#[must_use]
pub fn gcd(a: i64, b: i64) -> ToolOutcome {
    let result = gcd_u64(a.unsigned_abs(), b.unsigned_abs());
    ToolOutcome::new(
        result,
        format!("Greatest Common Divisor of {a} and {b} is {result}"),
    )
    .steps([format!("Find GCD of {a} and {b}"), format!("Result: {result}")])
}

/// # Errors
///
/// Fails if the LCM does not fit in 64 bits.
pub fn lcm(a: i64, b: i64) -> MathResult {
    if a == 0 || b == 0 {
        return Ok(ToolOutcome::new(0, "LCM with zero is zero")
            .steps(["One number is zero", "LCM = 0"]));
    }

    let g = gcd_u64(a.unsigned_abs(), b.unsigned_abs());
    let result = (a.unsigned_abs() / g)
        .checked_mul(b.unsigned_abs())
        .ok_or_else(|| ToolError::new("LCM is too large to represent"))?;

    Ok(ToolOutcome::new(
        result,
        format!("Least Common Multiple of {a} and {b} is {result}"),
    )
    .steps([
        "LCM = |a × b| / GCD(a, b)".to_string(),
        format!("GCD({a}, {b}) = {g}"),
        format!("LCM = |{a} × {b}| / {g} = {result}"),
    ]))
}

fn check_trial_bound(n: u64) -> Result<(), ToolError> {
    if n > MAX_TRIAL_DIVISION {
        return Err(ToolError::new(format!(
            "Number too large for trial division (maximum is {MAX_TRIAL_DIVISION})"
        )));
    }
    Ok(())
}

/// Prime factors of `|n|` in ascending order, with multiplicity.
///
/// # Errors
///
/// Fails above [`MAX_TRIAL_DIVISION`].
pub fn prime_factors(n: i64) -> MathResult {
    let original = n.unsigned_abs();
    check_trial_bound(original)?;

    if original < 2 {
        return Ok(
            ToolOutcome::new(Value::Array(Vec::new()), format!("{original} has no prime factors"))
                .step("Numbers less than 2 have no prime factors"),
        );
    }

    let mut factors = Vec::new();
    let mut rest = original;
    let mut d = 2_u64;
    while d * d <= rest {
        while rest % d == 0 {
            factors.push(d);
            rest /= d;
        }
        d += 1;
    }
    if rest > 1 {
        factors.push(rest);
    }

    Ok(
        ToolOutcome::new(factors.clone(), format!("Prime factors: {factors:?}"))
            .steps([format!("Factor {original}"), format!("Prime factors: {factors:?}")]),
    )
}

/// # Errors
///
/// Fails above [`MAX_TRIAL_DIVISION`].
pub fn is_prime(n: i64) -> MathResult {
    if n < 2 {
        return Ok(ToolOutcome::new(
            false,
            format!("{n} is not prime (numbers < 2 are not prime)"),
        )
        .steps([
            format!("Check if {n} is prime"),
            "Numbers less than 2 are not prime".to_string(),
        ]));
    }

    let n = n.unsigned_abs();
    check_trial_bound(n)?;

    let mut i = 2_u64;
    while i * i <= n {
        if n % i == 0 {
            return Ok(
                ToolOutcome::new(false, format!("{n} is not prime (divisible by {i})")).steps([
                    format!("Check divisors of {n}"),
                    format!("Found divisor: {i}"),
                    "Therefore not prime".to_string(),
                ]),
            );
        }
        i += 1;
    }

    Ok(ToolOutcome::new(true, format!("{n} is prime")).steps([
        format!("Check all divisors up to √{n}"),
        "No divisors found".to_string(),
        "Therefore prime".to_string(),
    ]))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn gcd_and_lcm() {
        assert_eq!(gcd(48, -18).result, json!(6));
        assert_eq!(lcm(4, 6).unwrap().result, json!(12));
        assert_eq!(lcm(0, 9).unwrap().result, json!(0));
    }

    #[test]
    fn factorises_with_multiplicity() {
        assert_eq!(prime_factors(360).unwrap().result, json!([2, 2, 2, 3, 3, 5]));
        assert_eq!(prime_factors(-13).unwrap().result, json!([13]));
        assert_eq!(prime_factors(1).unwrap().result, json!([]));
    }

    #[test]
    fn primality() {
        assert_eq!(is_prime(97).unwrap().result, json!(true));
        assert_eq!(is_prime(91).unwrap().result, json!(false));
        assert_eq!(is_prime(1).unwrap().result, json!(false));
        assert!(is_prime(i64::MAX).is_err());
    }
}
