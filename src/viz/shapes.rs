//! `visualize_geometry`: outlines of basic shapes.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::{Chart, ChartSink, VizResult};
use crate::math::number;
use crate::mcp::registry::ToolError;

/// Segments used to approximate a circle outline.
const CIRCLE_SEGMENTS: usize = 72;

/// Share of the shape's extent added around it in the plot bounds.
const MARGIN: f64 = 0.2;

type Point = [f64; 2];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Circle,
    Rectangle,
    Triangle,
    Polygon,
}

impl ShapeKind {
    pub const NAMES: &'static [&'static str] = &["circle", "rectangle", "triangle", "polygon"];
}

/// Reads an optional parameter, falling back to `default` when absent.
fn param<T: DeserializeOwned>(
    params: &Map<String, Value>,
    key: &str,
    default: T,
) -> Result<T, ToolError> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(default),
        Some(value) => T::deserialize(value)
            .map_err(|e| ToolError::new(format!("Invalid parameter '{key}': {e}"))),
    }
}

fn positive(value: f64, name: &str) -> Result<f64, ToolError> {
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(ToolError::new(format!("{name} must be a positive number, got {value}")))
    }
}

/// Axis-aligned extent of `points`, padded by [`MARGIN`] of the larger side.
fn bounds(points: &[Point], extent: f64) -> Value {
    let (mut min, mut max) = ([f64::INFINITY; 2], [f64::NEG_INFINITY; 2]);
    for p in points {
        for axis in 0..2 {
            min[axis] = min[axis].min(p[axis]);
            max[axis] = max[axis].max(p[axis]);
        }
    }
    let margin = extent * MARGIN;
    json!({
        "x": [min[0] - margin, max[0] + margin],
        "y": [min[1] - margin, max[1] + margin],
    })
}

fn perimeter(points: &[Point]) -> f64 {
    points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| (b[0] - a[0]).hypot(b[1] - a[1]))
        .sum()
}

/// Shoelace formula; the absolute area of a simple polygon.
fn polygon_area(points: &[Point]) -> f64 {
    let twice: f64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a[0].mul_add(b[1], -(b[0] * a[1])))
        .sum();
    twice.abs() / 2.0
}

fn side_extent(points: &[Point]) -> f64 {
    let span = |axis: usize| {
        let (lo, hi) = points.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p[axis]), hi.max(p[axis]))
        });
        hi - lo
    };
    span(0).max(span(1))
}

fn vertices_json(points: &[Point]) -> Value {
    Value::Array(
        points
            .iter()
            .map(|p| Value::Array(vec![number(p[0]), number(p[1])]))
            .collect(),
    )
}

/// Builds an outline of `kind` from its parameters.
///
/// # Errors
///
/// Fails on non-positive sizes, malformed points, a triangle without
/// exactly three vertices or a polygon with fewer than three.
pub fn visualize_geometry(
    kind: ShapeKind,
    params: &Map<String, Value>,
    title: Option<String>,
    sink: &ChartSink,
) -> VizResult {
    let (chart_type, default_title, spec, explanation) = match kind {
        ShapeKind::Circle => circle(params)?,
        ShapeKind::Rectangle => rectangle(params)?,
        ShapeKind::Triangle => {
            let vertices: Vec<Point> =
                param(params, "vertices", vec![[0.0, 0.0], [1.0, 0.0], [0.5, 1.0]])?;
            if vertices.len() != 3 {
                return Err(ToolError::new("Triangle requires exactly 3 vertices"));
            }
            polygon("triangle", "Triangle".to_string(), &vertices)
        }
        ShapeKind::Polygon => {
            let vertices: Vec<Point> = param(params, "vertices", Vec::new())?;
            if vertices.len() < 3 {
                return Err(ToolError::new("Polygon requires at least 3 vertices"));
            }
            let default_title = format!("Polygon ({} vertices)", vertices.len());
            polygon("polygon", default_title, &vertices)
        }
    };

    let chart = Chart::new(chart_type, spec).titled(Some(title.unwrap_or(default_title)));
    sink.finish(chart, explanation)
}

type Shape = (&'static str, String, Value, String);

#[allow(clippy::cast_precision_loss)]
fn circle(params: &Map<String, Value>) -> Result<Shape, ToolError> {
    let radius = positive(param(params, "radius", 1.0)?, "radius")?;
    let center: Point = param(params, "center", [0.0, 0.0])?;

    let outline: Vec<Point> = (0..CIRCLE_SEGMENTS)
        .map(|i| {
            let theta = std::f64::consts::TAU * i as f64 / CIRCLE_SEGMENTS as f64;
            [
                radius.mul_add(theta.cos(), center[0]),
                radius.mul_add(theta.sin(), center[1]),
            ]
        })
        .collect();
    let area = std::f64::consts::PI * radius * radius;
    let circumference = std::f64::consts::TAU * radius;
    let margin = radius * MARGIN;

    let spec = json!({
        "center": [number(center[0]), number(center[1])],
        "radius": number(radius),
        "outline": vertices_json(&outline),
        "area": area,
        "perimeter": circumference,
        "bounds": {
            "x": [center[0] - radius - margin, center[0] + radius + margin],
            "y": [center[1] - radius - margin, center[1] + radius + margin],
        },
    });
    Ok((
        "circle",
        format!("Circle (radius={radius})"),
        spec,
        format!("Circle with radius {radius}: area {area}, circumference {circumference}"),
    ))
}

fn rectangle(params: &Map<String, Value>) -> Result<Shape, ToolError> {
    let width = positive(param(params, "width", 2.0)?, "width")?;
    let height = positive(param(params, "height", 1.0)?, "height")?;
    let center: Point = param(params, "center", [0.0, 0.0])?;

    let (x, y) = (center[0] - width / 2.0, center[1] - height / 2.0);
    let corners = [[x, y], [x + width, y], [x + width, y + height], [x, y + height]];
    let area = width * height;
    let perimeter = 2.0 * (width + height);

    let spec = json!({
        "center": [number(center[0]), number(center[1])],
        "vertices": vertices_json(&corners),
        "area": number(area),
        "perimeter": number(perimeter),
        "bounds": bounds(&corners, width.max(height)),
    });
    Ok((
        "rectangle",
        format!("Rectangle ({width}×{height})"),
        spec,
        format!("Rectangle {width}×{height}: area {area}, perimeter {perimeter}"),
    ))
}

fn polygon(chart_type: &'static str, default_title: String, vertices: &[Point]) -> Shape {
    let area = polygon_area(vertices);
    let perimeter = perimeter(vertices);
    let spec = json!({
        "vertices": vertices_json(vertices),
        "area": number(area),
        "perimeter": number(perimeter),
        "bounds": bounds(vertices, side_extent(vertices)),
    });
    let explanation = format!("{default_title}: area {area}, perimeter {perimeter}");
    (chart_type, default_title, spec, explanation)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    fn draw(kind: ShapeKind, value: Value) -> VizResult {
        visualize_geometry(kind, &params(value), None, &ChartSink::in_memory(10_000))
    }

    #[test]
    fn circle_defaults() {
        let outcome = draw(ShapeKind::Circle, json!({})).unwrap();
        let spec = &outcome.result["data"];
        assert_eq!(spec["radius"], json!(1));
        assert_eq!(spec["center"], json!([0, 0]));
        assert_eq!(spec["outline"].as_array().unwrap().len(), CIRCLE_SEGMENTS);
        assert_eq!(spec["bounds"]["x"], json!([-1.2, 1.2]));
        assert_eq!(outcome.result["title"], json!("Circle (radius=1)"));
    }

    #[test]
    fn circle_rejects_non_positive_radius() {
        assert!(draw(ShapeKind::Circle, json!({"radius": 0})).is_err());
        assert!(draw(ShapeKind::Circle, json!({"radius": -2})).is_err());
    }

    #[test]
    fn rectangle_corners_and_area() {
        let outcome = draw(ShapeKind::Rectangle, json!({"width": 4, "height": 2})).unwrap();
        let spec = &outcome.result["data"];
        assert_eq!(spec["vertices"], json!([[-2, -1], [2, -1], [2, 1], [-2, 1]]));
        assert_eq!(spec["area"], json!(8));
        assert_eq!(spec["perimeter"], json!(12));
    }

    #[test]
    fn triangle_requires_three_vertices() {
        let err = draw(ShapeKind::Triangle, json!({"vertices": [[0, 0], [1, 0]]})).unwrap_err();
        assert_eq!(err.message(), "Triangle requires exactly 3 vertices");

        let outcome = draw(ShapeKind::Triangle, json!({})).unwrap();
        assert_eq!(outcome.result["data"]["area"], json!(0.5));
    }

    #[test]
    fn polygon_needs_at_least_three() {
        assert!(draw(ShapeKind::Polygon, json!({"vertices": []})).is_err());
        let outcome = draw(
            ShapeKind::Polygon,
            json!({"vertices": [[0, 0], [2, 0], [2, 2], [0, 2]]}),
        )
        .unwrap();
        assert_eq!(outcome.result["data"]["area"], json!(4));
        assert_eq!(outcome.result["data"]["perimeter"], json!(8));
        assert_eq!(outcome.result["title"], json!("Polygon (4 vertices)"));
    }

    #[test]
    fn malformed_points_are_rejected() {
        let err = draw(ShapeKind::Polygon, json!({"vertices": [[0], [1, 1], [2, 2]]})).unwrap_err();
        assert!(err.message().starts_with("Invalid parameter 'vertices'"));
    }
}
