//! Planar geometry on positional value lists.

use serde::Deserialize;
use serde_json::Value;

use super::{number, MathResult};
use crate::mcp::registry::{ToolError, ToolOutcome};

/// The operations of the `geometry` tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeometryOp {
    AreaCircle,
    AreaRectangle,
    AreaTriangle,
    Pythagorean,
    Distance,
    Slope,
    Midpoint,
}

impl GeometryOp {
    pub const NAMES: &'static [&'static str] = &[
        "area_circle",
        "area_rectangle",
        "area_triangle",
        "pythagorean",
        "distance",
        "slope",
        "midpoint",
    ];

    /// How many leading entries of `values` the operation reads.
    #[must_use]
    pub const fn arity(self) -> usize {
        match self {
            Self::AreaCircle => 1,
            Self::AreaRectangle | Self::AreaTriangle | Self::Pythagorean => 2,
            Self::Distance | Self::Slope | Self::Midpoint => 4,
        }
    }

    const fn name(self) -> &'static str {
        Self::NAMES[self as usize]
    }
}

/// Runs `op` on the first [`GeometryOp::arity`] entries of `values`.
///
/// # Errors
///
/// Fails when too few values are supplied.
pub fn compute(op: GeometryOp, values: &[f64]) -> MathResult {
    let needed = op.arity();
    if values.len() < needed {
        return Err(ToolError::new(format!(
            "Operation '{}' requires {needed} values, got {}",
            op.name(),
            values.len()
        )));
    }

    Ok(match op {
        GeometryOp::AreaCircle => area_circle(values[0]),
        GeometryOp::AreaRectangle => area_rectangle(values[0], values[1]),
        GeometryOp::AreaTriangle => area_triangle(values[0], values[1]),
        GeometryOp::Pythagorean => pythagorean(values[0], values[1]),
        GeometryOp::Distance => distance(values[0], values[1], values[2], values[3]),
        GeometryOp::Slope => slope(values[0], values[1], values[2], values[3]),
        GeometryOp::Midpoint => midpoint(values[0], values[1], values[2], values[3]),
    })
}

fn area_circle(radius: f64) -> ToolOutcome {
    let area = std::f64::consts::PI * radius * radius;
    ToolOutcome::new(
        number(area),
        format!("Area of circle with radius {radius} is {area}"),
    )
    .steps(["Area = π × r²".to_string(), format!("Area = π × {radius}² = {area}")])
}

fn area_rectangle(length: f64, width: f64) -> ToolOutcome {
    let area = length * width;
    ToolOutcome::new(
        number(area),
        format!("Area of rectangle with length {length} and width {width} is {area}"),
    )
    .steps([
        "Area = length × width".to_string(),
        format!("Area = {length} × {width} = {area}"),
    ])
}

fn area_triangle(base: f64, height: f64) -> ToolOutcome {
    let area = 0.5 * base * height;
    ToolOutcome::new(
        number(area),
        format!("Area of triangle with base {base} and height {height} is {area}"),
    )
    .steps([
        "Area = ½ × base × height".to_string(),
        format!("Area = ½ × {base} × {height} = {area}"),
    ])
}

fn pythagorean(a: f64, b: f64) -> ToolOutcome {
    let sum = a.mul_add(a, b * b);
    let c = sum.sqrt();
    ToolOutcome::new(
        number(c),
        format!("Hypotenuse of right triangle with legs {a} and {b} is {c}"),
    )
    .steps([
        "Pythagorean theorem: c² = a² + b²".to_string(),
        format!("c² = {a}² + {b}² = {} + {} = {sum}", a * a, b * b),
        format!("c = √{sum} = {c}"),
    ])
}

fn distance(x1: f64, y1: f64, x2: f64, y2: f64) -> ToolOutcome {
    let (dx, dy) = (x2 - x1, y2 - y1);
    let d = dx.hypot(dy);
    ToolOutcome::new(
        number(d),
        format!("Distance between ({x1}, {y1}) and ({x2}, {y2}) is {d}"),
    )
    .steps([
        "Distance formula: d = √[(x₂-x₁)² + (y₂-y₁)²]".to_string(),
        format!("d = √[({x2}-{x1})² + ({y2}-{y1})²]"),
        format!("d = √[{dx}² + {dy}²] = √[{} + {}] = {d}", dx * dx, dy * dy),
    ])
}

fn slope(x1: f64, y1: f64, x2: f64, y2: f64) -> ToolOutcome {
    let run = x2 - x1;
    if run == 0.0 {
        return ToolOutcome::new("undefined", "Slope is undefined (vertical line)")
            .steps(["x₂ - x₁ = 0", "Division by zero", "Slope is undefined"]);
    }

    let rise = y2 - y1;
    let m = rise / run;
    ToolOutcome::new(
        number(m),
        format!("Slope between ({x1}, {y1}) and ({x2}, {y2}) is {m}"),
    )
    .steps([
        "Slope formula: m = (y₂-y₁)/(x₂-x₁)".to_string(),
        format!("m = ({y2}-{y1})/({x2}-{x1}) = {rise}/{run} = {m}"),
    ])
}

fn midpoint(x1: f64, y1: f64, x2: f64, y2: f64) -> ToolOutcome {
    let (mx, my) = ((x1 + x2) / 2.0, (y1 + y2) / 2.0);
    ToolOutcome::new(
        Value::Array(vec![number(mx), number(my)]),
        format!("Midpoint between ({x1}, {y1}) and ({x2}, {y2}) is ({mx}, {my})"),
    )
    .steps([
        "Midpoint formula: ((x₁+x₂)/2, (y₁+y₂)/2)".to_string(),
        format!("Midpoint = (({x1}+{x2})/2, ({y1}+{y2})/2) = ({mx}, {my})"),
    ])
}
