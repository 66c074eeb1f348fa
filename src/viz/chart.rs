//! `create_chart` and `create_statistics_chart`.

use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::stats::{five_number, histogram, sorted, summarize};
use super::{Chart, ChartSink, VizResult};
use crate::mcp::registry::ToolError;

/// Histogram bin count when the caller gives none.
pub const DEFAULT_BINS: usize = 30;

/// Histogram bin count used by the statistics summary.
const SUMMARY_BINS: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Bar,
    Scatter,
    Pie,
    Histogram,
    Box,
}

impl ChartKind {
    pub const NAMES: &'static [&'static str] =
        &["line", "bar", "scatter", "pie", "histogram", "box"];
}

/// Title and axis labels shared by every chart kind.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Labels {
    pub title: Option<String>,
    pub xlabel: Option<String>,
    pub ylabel: Option<String>,
}

/// The first of `keys` present in `data` with a non-null value.
fn field<'a>(data: &'a Map<String, Value>, keys: &[&'a str]) -> Option<(&'a str, &'a Value)> {
    keys.iter()
        .find_map(|&k| data.get(k).filter(|v| !v.is_null()).map(|v| (k, v)))
}

/// Numeric series under the first matching key; empty when absent.
fn numbers(data: &Map<String, Value>, keys: &[&str]) -> Result<Vec<f64>, ToolError> {
    let Some((key, value)) = field(data, keys) else {
        return Ok(Vec::new());
    };
    value
        .as_array()
        .and_then(|items| items.iter().map(Value::as_f64).collect::<Option<Vec<_>>>())
        .ok_or_else(|| ToolError::new(format!("'{key}' must be an array of numbers")))
}

/// Category labels under the first matching key; numbers are accepted and
/// shown as text.
fn categories(data: &Map<String, Value>, keys: &[&str]) -> Result<Vec<String>, ToolError> {
    let Some((key, value)) = field(data, keys) else {
        return Ok(Vec::new());
    };
    value
        .as_array()
        .and_then(|items| {
            items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .collect::<Option<Vec<_>>>()
        })
        .ok_or_else(|| ToolError::new(format!("'{key}' must be an array of strings or numbers")))
}

fn same_length(a: usize, b: usize, names: &str) -> Result<(), ToolError> {
    if a == b {
        Ok(())
    } else {
        Err(ToolError::new(format!("{names} arrays must have the same length")))
    }
}

/// Builds a chart specification of `kind` from `data`.
///
/// # Errors
///
/// Fails when the data arrays a kind requires are missing, empty, of the
/// wrong type or of mismatched lengths.
pub fn create_chart(
    kind: ChartKind,
    data: &Map<String, Value>,
    labels: Labels,
    sink: &ChartSink,
) -> VizResult {
    let (chart, explanation) = match kind {
        ChartKind::Line => line(data)?,
        ChartKind::Bar => bar(data)?,
        ChartKind::Scatter => scatter(data)?,
        ChartKind::Pie => pie(data)?,
        ChartKind::Histogram => histogram_chart(data)?,
        ChartKind::Box => box_plot(data)?,
    };

    let chart = match kind {
        ChartKind::Pie => chart.titled(labels.title),
        ChartKind::Histogram => {
            let ylabel = labels.ylabel.unwrap_or_else(|| "Frequency".to_string());
            chart.titled(labels.title).labelled(labels.xlabel, Some(ylabel))
        }
        _ => chart.titled(labels.title).labelled(labels.xlabel, labels.ylabel),
    };

    sink.finish(chart, explanation)
}

fn xy(data: &Map<String, Value>, chart: &str) -> Result<(Vec<f64>, Vec<f64>), ToolError> {
    let x = numbers(data, &["x"])?;
    let y = numbers(data, &["y"])?;
    if x.is_empty() || y.is_empty() {
        return Err(ToolError::new(format!("{chart} requires 'x' and 'y' data arrays")));
    }
    same_length(x.len(), y.len(), "x and y")?;
    Ok((x, y))
}

fn line(data: &Map<String, Value>) -> Result<(Chart, String), ToolError> {
    let (x, y) = xy(data, "Line chart")?;
    let explanation = format!("Line chart with {} points", x.len());
    Ok((Chart::new("line_chart", json!({ "x": x, "y": y })), explanation))
}

fn bar(data: &Map<String, Value>) -> Result<(Chart, String), ToolError> {
    let names = categories(data, &["categories", "x"])?;
    let values = numbers(data, &["values", "y"])?;
    if names.is_empty() || values.is_empty() {
        return Err(ToolError::new(
            "Bar chart requires 'categories' and 'values' data arrays",
        ));
    }
    same_length(names.len(), values.len(), "categories and values")?;

    let explanation = format!("Bar chart with {} categories", names.len());
    Ok((
        Chart::new("bar_chart", json!({ "categories": names, "values": values })),
        explanation,
    ))
}

fn scatter(data: &Map<String, Value>) -> Result<(Chart, String), ToolError> {
    let (x, y) = xy(data, "Scatter plot")?;

    let sizes = match field(data, &["sizes"]) {
        None => json!(50),
        Some((_, size)) if size.is_number() => size.clone(),
        Some(_) => {
            let sizes = numbers(data, &["sizes"])?;
            same_length(x.len(), sizes.len(), "x and sizes")?;
            json!(sizes)
        }
    };

    let mut spec = json!({ "x": x, "y": y, "sizes": sizes });
    if let Some((_, colors)) = field(data, &["colors"]) {
        if let Some(colors) = colors.as_array() {
            same_length(x.len(), colors.len(), "x and colors")?;
        }
        spec["colors"] = colors.clone();
    }

    let explanation = format!("Scatter plot with {} points", x.len());
    Ok((Chart::new("scatter_plot", spec), explanation))
}

fn pie(data: &Map<String, Value>) -> Result<(Chart, String), ToolError> {
    let names = categories(data, &["labels"])?;
    let values = numbers(data, &["values"])?;
    if names.is_empty() || values.is_empty() {
        return Err(ToolError::new(
            "Pie chart requires 'labels' and 'values' data arrays",
        ));
    }
    same_length(names.len(), values.len(), "labels and values")?;

    if values.iter().any(|v| *v < 0.0) {
        return Err(ToolError::new("Pie chart values must not be negative"));
    }
    let total: f64 = values.iter().sum();
    if total <= 0.0 {
        return Err(ToolError::new("Pie chart values must sum to a positive number"));
    }
    let percentages: Vec<f64> = values.iter().map(|v| v / total * 100.0).collect();

    let explanation = format!("Pie chart with {} slices", names.len());
    Ok((
        Chart::new(
            "pie_chart",
            json!({ "labels": names, "values": values, "percentages": percentages }),
        ),
        explanation,
    ))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn histogram_chart(data: &Map<String, Value>) -> Result<(Chart, String), ToolError> {
    let values = numbers(data, &["values", "x"])?;
    if values.is_empty() {
        return Err(ToolError::new("Histogram requires 'values' data array"));
    }

    let bins = match field(data, &["bins"]) {
        None => DEFAULT_BINS,
        Some((_, bins)) => bins
            .as_u64()
            .filter(|&b| b >= 1)
            .and_then(|b| usize::try_from(b).ok())
            .ok_or_else(|| ToolError::new("'bins' must be a positive integer"))?,
    };

    let (edges, counts) = histogram(&values, bins);
    let explanation = format!("Histogram of {} values in {bins} bins", values.len());
    Ok((
        Chart::new(
            "histogram",
            json!({ "values": values, "bin_edges": edges, "counts": counts }),
        ),
        explanation,
    ))
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BoxValues {
    Single(Vec<f64>),
    Multiple(Vec<Vec<f64>>),
}

fn box_plot(data: &Map<String, Value>) -> Result<(Chart, String), ToolError> {
    let datasets = match field(data, &["values"]) {
        None => Vec::new(),
        Some((_, value)) => match BoxValues::deserialize(value) {
            Ok(BoxValues::Single(values)) if values.is_empty() => Vec::new(),
            Ok(BoxValues::Single(values)) => vec![values],
            Ok(BoxValues::Multiple(sets)) => sets,
            Err(_) => {
                return Err(ToolError::new(
                    "'values' must be an array of numbers or an array of number arrays",
                ))
            }
        },
    };
    if datasets.is_empty() {
        return Err(ToolError::new("Box plot requires 'values' data"));
    }

    let mut names = categories(data, &["labels"])?;
    if names.is_empty() {
        names = if datasets.len() == 1 {
            vec!["Data".to_string()]
        } else {
            (1..=datasets.len()).map(|i| format!("Dataset {i}")).collect()
        };
    }
    same_length(datasets.len(), names.len(), "values and labels")?;

    let boxes = datasets
        .iter()
        .zip(&names)
        .map(|(set, label)| {
            let summary = five_number(set)
                .ok_or_else(|| ToolError::new(format!("Dataset '{label}' is empty")))?;
            let mut entry = serde_json::to_value(summary)
                .map_err(|e| ToolError::new(format!("Error creating chart: {e}")))?;
            entry["label"] = json!(label);
            Ok(entry)
        })
        .collect::<Result<Vec<_>, ToolError>>()?;

    let explanation = format!("Box plot of {} datasets", boxes.len());
    Ok((Chart::new("box_plot", json!({ "boxes": boxes })), explanation))
}

/// The only statistics layout: histogram, box, quantile plot and summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatisticsLayout {
    #[default]
    All,
}

impl StatisticsLayout {
    pub const NAMES: &'static [&'static str] = &["all"];
}

/// A multi-panel statistical summary of `data`.
///
/// # Errors
///
/// Fails on an empty sample.
#[allow(clippy::cast_precision_loss)]
pub fn create_statistics_chart(
    data: &[f64],
    _layout: StatisticsLayout,
    title: Option<String>,
    sink: &ChartSink,
) -> VizResult {
    let summary = summarize(data)
        .ok_or_else(|| ToolError::new("No data provided for statistical analysis"))?;
    let five = five_number(data)
        .ok_or_else(|| ToolError::new("No data provided for statistical analysis"))?;

    let (edges, counts) = histogram(data, SUMMARY_BINS);
    let sample = sorted(data);
    let last = (sample.len() - 1).max(1) as f64;
    let theoretical: Vec<f64> = if sample.len() == 1 {
        vec![0.0]
    } else {
        (0..sample.len()).map(|i| i as f64 / last).collect()
    };

    let spec = json!({
        "distribution": { "bin_edges": edges, "counts": counts },
        "box": five,
        "quantiles": { "theoretical": theoretical, "sample": sample },
        "summary": summary,
    });

    let explanation = format!(
        "Statistics for {} values: mean {:.3}, median {:.3}, std dev {:.3}",
        summary.count, summary.mean, summary.median, summary.std_dev
    );
    let steps = [
        format!("Count: {}", summary.count),
        format!("Mean: {:.3}", summary.mean),
        format!("Median: {:.3}", summary.median),
        format!("Std Dev: {:.3}", summary.std_dev),
        format!("Min: {:.3}", summary.min),
        format!("Max: {:.3}", summary.max),
        format!("Q1: {:.3}", summary.q1),
        format!("Q3: {:.3}", summary.q3),
    ];

    let statistics = serde_json::to_value(&summary)
        .map_err(|e| ToolError::new(format!("Error creating statistics chart: {e}")))?;
    let outcome = sink.finish(Chart::new("statistics_summary", spec).titled(title), explanation)?;
    Ok(outcome.steps(steps).with("statistics", statistics))
}
