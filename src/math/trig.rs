//! Sine, cosine and tangent in radians or degrees.

use serde::Deserialize;

use super::number;
use crate::mcp::registry::ToolOutcome;

/// Below this `|cos θ|` the tangent is reported as undefined.
const COSINE_EPSILON: f64 = 1e-10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrigFunction {
    Sin,
    Cos,
    Tan,
}

impl TrigFunction {
    pub const NAMES: &'static [&'static str] = &["sin", "cos", "tan"];

    const fn name(self) -> &'static str {
        Self::NAMES[self as usize]
    }

    const fn long_name(self) -> &'static str {
        match self {
            Self::Sin => "sine",
            Self::Cos => "cosine",
            Self::Tan => "tangent",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AngleUnit {
    #[default]
    Radians,
    Degrees,
}

impl AngleUnit {
    pub const NAMES: &'static [&'static str] = &["radians", "degrees"];

    const fn name(self) -> &'static str {
        Self::NAMES[self as usize]
    }
}

#[must_use]
pub fn evaluate(function: TrigFunction, angle: f64, unit: AngleUnit) -> ToolOutcome {
    let radians = match unit {
        AngleUnit::Radians => angle,
        AngleUnit::Degrees => angle.to_radians(),
    };
    let shown = match unit {
        AngleUnit::Radians => format!("{angle}"),
        AngleUnit::Degrees => format!("{angle}°"),
    };
    let name = function.name();

    let result = match function {
        TrigFunction::Sin => radians.sin(),
        TrigFunction::Cos => radians.cos(),
        TrigFunction::Tan => {
            if radians.cos().abs() < COSINE_EPSILON {
                return ToolOutcome::new(
                    "undefined",
                    format!("tan({shown}) is undefined (cosine is zero)"),
                )
                .steps([
                    format!("tan({shown}) = sin({shown})/cos({shown})"),
                    "cos is zero".to_string(),
                    "Therefore undefined".to_string(),
                ]);
            }
            radians.tan()
        }
    };

    ToolOutcome::new(number(result), format!("{name}({shown}) = {result}")).steps([
        format!(
            "Calculate {} of {angle} {}",
            function.long_name(),
            unit.name()
        ),
        format!("Result: {result}"),
    ])
}
