//! Linear and quadratic equation solving.

use serde_json::Value;

use super::number;
use crate::mcp::registry::ToolOutcome;

/// Solves `ax + b = 0`.
///
/// Degenerate equations are answered with `"infinite solutions"` or
/// `"no solution"` rather than an error.
#[must_use]
pub fn solve_linear(a: f64, b: f64) -> ToolOutcome {
    if a == 0.0 {
        if b == 0.0 {
            return ToolOutcome::new("infinite solutions", "0x + 0 = 0 is always true")
                .steps(["The equation 0 = 0 is always true", "Therefore infinite solutions"]);
        }
        return ToolOutcome::new("no solution", format!("0x + {b} = 0 is impossible"))
            .steps([format!("The equation {b} = 0 is false"), "Therefore no solution".to_string()]);
    }

    let result = -b / a;
    ToolOutcome::new(
        number(result),
        format!("Linear equation: {a}x + {b} = 0, solution: x = {result}"),
    )
    .steps([
        format!("{a}x + {b} = 0"),
        format!("{a}x = {}", -b),
        format!("x = {}/{a} = {result}", -b),
    ])
}

/// Solves `ax² + bx + c = 0` over the reals.
///
/// With `a = 0` this is the linear equation `bx + c = 0`.
#[must_use]
pub fn solve_quadratic(a: f64, b: f64, c: f64) -> ToolOutcome {
    if a == 0.0 {
        return solve_linear(b, c);
    }

    let discriminant = b.mul_add(b, -4.0 * a * c);
    let equation = format!("For {a}x² + {b}x + {c} = 0");

    if discriminant < 0.0 {
        return ToolOutcome::new(
            "no real solutions",
            format!("Discriminant = {discriminant} < 0, no real solutions"),
        )
        .steps([
            equation,
            format!("Discriminant = b² - 4ac = {b}² - 4({a})({c}) = {discriminant}"),
            "Since discriminant < 0, no real solutions".to_string(),
        ]);
    }

    if discriminant == 0.0 {
        let x = -b / (2.0 * a);
        return ToolOutcome::new(
            Value::Array(vec![number(x)]),
            format!("One solution (repeated root): x = {x}"),
        )
        .steps([
            equation,
            format!("Discriminant = {discriminant} = 0"),
            format!("x = -b/(2a) = {}/(2×{a}) = {x}", -b),
        ]);
    }

    let root = discriminant.sqrt();
    let x1 = (-b + root) / (2.0 * a);
    let x2 = (-b - root) / (2.0 * a);
    ToolOutcome::new(
        Value::Array(vec![number(x1), number(x2)]),
        format!("Two solutions: x₁ = {x1}, x₂ = {x2}"),
    )
    .steps([
        equation,
        format!("Discriminant = {discriminant}"),
        "x = (-b ± √discriminant)/(2a)".to_string(),
        format!("x₁ = ({} + √{discriminant})/(2×{a}) = {x1}", -b),
        format!("x₂ = ({} - √{discriminant})/(2×{a}) = {x2}", -b),
    ])
}
