//! Visualization tools.
//!
//! Every handler captures its own clone of the [`ChartSink`], so the sink's
//! output directory and point ceiling are fixed when the registry is built.

use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::{decode, optional_whole_number};
use crate::config::MIN_PLOT_POINTS;
use crate::error::RegistryError;
use crate::mcp::registry::{ToolDescriptor, ToolError, ToolOutcome, ToolRegistry};
use crate::mcp::schema::{InputSchema, PropertySchema, ValueKind};
use crate::viz::chart::{create_chart, create_statistics_chart, ChartKind, Labels, StatisticsLayout};
use crate::viz::plot::{plot_function, DEFAULT_POINTS, DEFAULT_X_RANGE, MAX_POINTS};
use crate::viz::shapes::{visualize_geometry, ShapeKind};
use crate::viz::ChartSink;

#[derive(Debug, Deserialize)]
struct ChartArgs {
    chart_type: ChartKind,
    data: Map<String, Value>,
    #[serde(flatten)]
    labels: Labels,
}

#[derive(Debug, Deserialize)]
struct PlotArgs {
    expression: String,
    #[serde(default)]
    x_range: Option<Vec<f64>>,
    #[serde(default, deserialize_with = "optional_whole_number")]
    num_points: Option<i64>,
    #[serde(default)]
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatisticsArgs {
    data: Vec<f64>,
    #[serde(default)]
    chart_type: StatisticsLayout,
    #[serde(default)]
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeometryArgs {
    shape_type: ShapeKind,
    parameters: Map<String, Value>,
    #[serde(default)]
    title: Option<String>,
}

fn labels_schema(schema: InputSchema) -> InputSchema {
    schema
        .optional("title", PropertySchema::string().describe("Chart title"))
        .optional("xlabel", PropertySchema::string().describe("X-axis label"))
        .optional("ylabel", PropertySchema::string().describe("Y-axis label"))
}

/// Registers the visualization tools, all writing through `sink`.
///
/// # Errors
///
/// Fails if any tool is already registered.
#[allow(clippy::cast_precision_loss)]
pub fn register(tools: &mut ToolRegistry, sink: &ChartSink) -> Result<(), RegistryError> {
    let chart_sink = sink.clone();
    tools.register(
        ToolDescriptor::new(
            "create_chart",
            "Create various types of charts and graphs",
            labels_schema(
                InputSchema::new()
                    .required(
                        "chart_type",
                        PropertySchema::one_of(ChartKind::NAMES)
                            .describe("Type of chart to create"),
                    )
                    .required(
                        "data",
                        PropertySchema::object()
                            .describe("Chart data; the expected keys depend on chart_type"),
                    ),
            ),
        ),
        move |arguments: &Value| -> Result<ToolOutcome, ToolError> {
            let args: ChartArgs = decode(arguments)?;
            create_chart(args.chart_type, &args.data, args.labels, &chart_sink)
        },
    )?;

    let plot_sink = sink.clone();
    let ceiling = sink.max_points().min(MAX_POINTS);
    tools.register(
        ToolDescriptor::new(
            "plot_function",
            "Plot mathematical functions",
            InputSchema::new()
                .required(
                    "expression",
                    PropertySchema::string()
                        .describe("Function of x, e.g. 'x^2 + 2*x + 1' or 'sin(x)'"),
                )
                .optional(
                    "x_range",
                    PropertySchema::array_of(ValueKind::Number)
                        .items_between(2, 2)
                        .describe("Range of x values [min, max]")
                        .default_value(json!(DEFAULT_X_RANGE)),
                )
                .optional(
                    "num_points",
                    PropertySchema::integer()
                        .range(MIN_PLOT_POINTS as f64, ceiling as f64)
                        .describe("Number of points to plot")
                        .default_value(json!(DEFAULT_POINTS.min(ceiling))),
                )
                .optional("title", PropertySchema::string().describe("Plot title")),
        ),
        move |arguments: &Value| -> Result<ToolOutcome, ToolError> {
            let args: PlotArgs = decode(arguments)?;
            let num_points = args
                .num_points
                .map(|n| {
                    usize::try_from(n).map_err(|_| {
                        ToolError::new(format!("num_points must be positive, got {n}"))
                    })
                })
                .transpose()?;
            plot_function(
                &args.expression,
                args.x_range.as_deref(),
                num_points,
                args.title,
                &plot_sink,
            )
        },
    )?;

    let statistics_sink = sink.clone();
    tools.register(
        ToolDescriptor::new(
            "create_statistics_chart",
            "Create statistical visualizations for data analysis",
            InputSchema::new()
                .required(
                    "data",
                    PropertySchema::array_of(ValueKind::Number)
                        .describe("Numerical data to analyze"),
                )
                .optional(
                    "chart_type",
                    PropertySchema::one_of(StatisticsLayout::NAMES)
                        .describe("Type of statistical visualization")
                        .default_value(json!("all")),
                )
                .optional("title", PropertySchema::string().describe("Chart title")),
        ),
        move |arguments: &Value| -> Result<ToolOutcome, ToolError> {
            let args: StatisticsArgs = decode(arguments)?;
            create_statistics_chart(&args.data, args.chart_type, args.title, &statistics_sink)
        },
    )?;

    let geometry_sink = sink.clone();
    tools.register(
        ToolDescriptor::new(
            "visualize_geometry",
            "Visualize geometric shapes",
            InputSchema::new()
                .required(
                    "shape_type",
                    PropertySchema::one_of(ShapeKind::NAMES).describe("Type of geometric shape"),
                )
                .required(
                    "parameters",
                    PropertySchema::object()
                        .describe("Shape parameters such as radius, width or vertices"),
                )
                .optional("title", PropertySchema::string().describe("Plot title")),
        ),
        move |arguments: &Value| -> Result<ToolOutcome, ToolError> {
            let args: GeometryArgs = decode(arguments)?;
            visualize_geometry(args.shape_type, &args.parameters, args.title, &geometry_sink)
        },
    )?;

    Ok(())
}
