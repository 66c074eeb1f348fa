//! `plot_function`: samples an expression in `x` over a range.

use serde_json::{json, Value};

use super::{Chart, ChartSink, VizResult};
use crate::config::MIN_PLOT_POINTS;
use crate::math::expression::parse_function;
use crate::mcp::registry::ToolError;

pub const DEFAULT_X_RANGE: [f64; 2] = [-10.0, 10.0];
pub const DEFAULT_POINTS: usize = 1000;
/// Hard ceiling on samples regardless of configuration.
pub const MAX_POINTS: usize = 10_000;

/// Evenly spaced samples from `start` to `end` inclusive.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::suggest_mul_add)]
pub fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            (0..count)
                .map(|i| if i == count - 1 { end } else { start + i as f64 * step })
                .collect()
        }
    }
}

/// Plots `y = expression` for `num_points` values of `x` across `x_range`.
///
/// Samples where the expression is undefined (division by zero, `log` of
/// a negative) are emitted as `null` so a renderer draws a gap.
///
/// # Errors
///
/// Fails on a malformed expression, an empty or inverted range, a point
/// count outside `10..=max`, or when no sample is finite.
pub fn plot_function(
    expression: &str,
    x_range: Option<&[f64]>,
    num_points: Option<usize>,
    title: Option<String>,
    sink: &ChartSink,
) -> VizResult {
    let parsed = parse_function(expression).map_err(|e| {
        ToolError::new(format!("Error plotting function '{expression}': {e}"))
    })?;

    let [x_min, x_max] = match x_range {
        None => DEFAULT_X_RANGE,
        Some(&[min, max]) => [min, max],
        Some(other) => {
            return Err(ToolError::new(format!(
                "x_range must be [min, max], got {} values",
                other.len()
            )))
        }
    };
    if !(x_min.is_finite() && x_max.is_finite() && x_min < x_max) {
        return Err(ToolError::new(format!(
            "x_range minimum must be less than maximum, got [{x_min}, {x_max}]"
        )));
    }

    let limit = sink.max_points().min(MAX_POINTS);
    let count = num_points.unwrap_or_else(|| DEFAULT_POINTS.min(limit));
    if !(MIN_PLOT_POINTS..=limit).contains(&count) {
        return Err(ToolError::new(format!(
            "num_points must be between {MIN_PLOT_POINTS} and {limit}, got {count}"
        )));
    }

    let xs = linspace(x_min, x_max, count);
    let ys: Vec<Value> = xs
        .iter()
        .map(|&x| {
            let y = parsed.evaluate(x);
            if y.is_finite() {
                json!(y)
            } else {
                Value::Null
            }
        })
        .collect();

    let gaps = ys.iter().filter(|y| y.is_null()).count();
    if gaps == count {
        return Err(ToolError::new(format!(
            "Error plotting function '{expression}': no finite values in [{x_min}, {x_max}]"
        )));
    }

    let chart = Chart::new("function_plot", json!({ "expression": expression, "x": xs, "y": ys }))
        .titled(Some(title.unwrap_or_else(|| format!("Plot of y = {expression}"))))
        .labelled(Some("x".to_string()), Some("y".to_string()));

    let mut explanation =
        format!("Plot of y = {expression} over [{x_min}, {x_max}] with {count} points");
    if gaps > 0 {
        explanation.push_str(&format!(" ({gaps} undefined)"));
    }

    Ok(sink.finish(chart, explanation)?.with("undefined_points", gaps))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sink() -> ChartSink {
        ChartSink::in_memory(10_000)
    }

    #[test]
    fn linspace_hits_both_ends() {
        let xs = linspace(-1.0, 1.0, 5);
        assert_eq!(xs, [-1.0, -0.5, 0.0, 0.5, 1.0]);
        assert_eq!(linspace(0.1, 0.7, 7).last(), Some(&0.7));
    }

    #[test]
    fn defaults_sample_a_thousand_points() {
        let outcome = plot_function("x^2", None, None, None, &sink()).unwrap();
        let ys = outcome.result["data"]["y"].as_array().unwrap();
        assert_eq!(ys.len(), DEFAULT_POINTS);
        assert_eq!(ys[0], json!(100.0));
        assert_eq!(outcome.result["title"], json!("Plot of y = x^2"));
    }

    #[test]
    fn undefined_samples_become_gaps() {
        let outcome = plot_function("1/x", Some(&[-1.0, 1.0]), Some(11), None, &sink()).unwrap();
        let ys = outcome.result["data"]["y"].as_array().unwrap();
        assert_eq!(ys[5], Value::Null);
        assert_eq!(outcome.extra["undefined_points"], json!(1));
    }

    #[test]
    fn entirely_undefined_plot_fails() {
        assert!(plot_function("log(x)", Some(&[-5.0, -1.0]), Some(10), None, &sink()).is_err());
    }

    #[test]
    fn range_and_count_are_validated() {
        assert!(plot_function("x", Some(&[1.0, 1.0]), None, None, &sink()).is_err());
        assert!(plot_function("x", Some(&[2.0, 1.0]), None, None, &sink()).is_err());
        assert!(plot_function("x", None, Some(9), None, &sink()).is_err());
        assert!(plot_function("x", None, Some(10_001), None, &sink()).is_err());
    }

    #[test]
    fn configured_ceiling_caps_points() {
        let capped = ChartSink::in_memory(50);
        assert!(plot_function("x", None, Some(51), None, &capped).is_err());
        let outcome = plot_function("x", None, None, None, &capped).unwrap();
        assert_eq!(outcome.result["data"]["x"].as_array().unwrap().len(), 50);
    }

    #[test]
    fn bad_expression_is_reported() {
        let err = plot_function("import os", None, None, None, &sink()).unwrap_err();
        assert!(err.message().starts_with("Error plotting function 'import os'"));
    }
}
