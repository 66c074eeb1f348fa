//! Tool bodies for the visualization provider.
//!
//! Nothing here renders pixels. Each tool validates its input and produces a
//! [`Chart`]: a JSON chart specification that a client can draw with the
//! plotting library of its choice. When file output is enabled the
//! specification is also written under the configured output directory.

pub mod chart;
pub mod plot;
pub mod shapes;
pub mod stats;

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;

use crate::config::VisualizationConfig;
use crate::mcp::registry::{ToolError, ToolOutcome};

/// Outcome of a visualization tool body.
pub type VizResult = Result<ToolOutcome, ToolError>;

/// A chart specification.
#[derive(Debug, Clone, Serialize)]
pub struct Chart {
    /// Kind of chart, also used as the file name prefix.
    pub chart_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_label: Option<String>,
    /// Chart-specific series, bins or outlines.
    pub data: Value,
}

impl Chart {
    #[must_use]
    pub fn new(chart_type: &'static str, data: Value) -> Self {
        Self {
            chart_type,
            title: None,
            x_label: None,
            y_label: None,
            data,
        }
    }

    #[must_use]
    pub fn titled(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }

    #[must_use]
    pub fn labelled(mut self, x_label: Option<String>, y_label: Option<String>) -> Self {
        self.x_label = x_label;
        self.y_label = y_label;
        self
    }
}

/// Where chart specifications go once built.
#[derive(Debug, Clone)]
pub struct ChartSink {
    output_dir: Option<PathBuf>,
    max_points: usize,
}

impl ChartSink {
    /// Keeps charts in the response only.
    #[must_use]
    pub const fn in_memory(max_points: usize) -> Self {
        Self {
            output_dir: None,
            max_points,
        }
    }

    /// Also writes every chart to a uniquely named file under `dir`.
    #[must_use]
    pub fn to_directory(dir: impl Into<PathBuf>, max_points: usize) -> Self {
        Self {
            output_dir: Some(dir.into()),
            max_points,
        }
    }

    #[must_use]
    pub fn from_config(config: &VisualizationConfig) -> Self {
        if config.write_files {
            Self::to_directory(&config.output_dir, config.max_points)
        } else {
            Self::in_memory(config.max_points)
        }
    }

    /// Upper bound on samples a single plot may request.
    #[must_use]
    pub const fn max_points(&self) -> usize {
        self.max_points
    }

    /// Turns a finished chart into a tool outcome, writing it out first if
    /// this sink has an output directory.
    ///
    /// # Errors
    ///
    /// Fails if the chart cannot be written.
    pub fn finish(&self, chart: Chart, explanation: impl Into<String>) -> VizResult {
        let chart_type = chart.chart_type;
        let spec = serde_json::to_value(&chart)
            .map_err(|e| ToolError::new(format!("Error creating chart: {e}")))?;

        let mut outcome = ToolOutcome::new(spec, explanation)
            .with("success", true)
            .with("chart_type", chart_type);

        let description = match &self.output_dir {
            Some(dir) => {
                let path = write_chart(dir, &chart)?;
                let filename = path
                    .file_name()
                    .map(|f| f.to_string_lossy().into_owned())
                    .unwrap_or_default();
                tracing::debug!(path = %path.display(), "Chart specification written");
                outcome = outcome
                    .with("file_path", path.display().to_string())
                    .with("filename", filename.clone());
                format!("Chart saved as {filename}")
            }
            None => format!("{chart_type} specification"),
        };

        Ok(outcome.with("description", description))
    }
}

/// Writes `chart` as `<dir>/<chart_type>_<uuid>.json` and returns the path.
fn write_chart(dir: &Path, chart: &Chart) -> Result<PathBuf, ToolError> {
    let io_error = |e: std::io::Error| ToolError::new(format!("Failed to save chart: {e}"));

    std::fs::create_dir_all(dir).map_err(io_error)?;
    let path = dir.join(format!("{}_{}.json", chart.chart_type, uuid::Uuid::new_v4()));

    let contents = serde_json::to_vec_pretty(chart)
        .map_err(|e| ToolError::new(format!("Failed to save chart: {e}")))?;
    let mut file = File::create(&path).map_err(io_error)?;
    file.write_all(&contents).map_err(io_error)?;

    Ok(path)
}
