//! Configuration structures for deserialisation.
//!
//! These structures map directly to the JSON configuration file format.

use std::path::PathBuf;

use serde::Deserialize;

use crate::error::ConfigError;

/// Smallest sample count a plot may be configured to allow.
pub const MIN_PLOT_POINTS: usize = 10;

/// Log levels accepted in `logging.level`.
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Root configuration structure.
///
/// This is the top-level structure that matches the JSON config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Optional JSON schema reference (ignored during parsing).
    #[serde(rename = "$schema", default)]
    _schema: Option<String>,

    /// Optional comment field (ignored during parsing).
    #[serde(rename = "_comment", default)]
    _comment: Option<String>,

    /// Which tool and resource providers are registered.
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Visualization settings.
    #[serde(default)]
    pub visualization: VisualizationConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any validation checks fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.visualization.max_points < MIN_PLOT_POINTS {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "visualization.max_points must be at least {MIN_PLOT_POINTS}, got {}",
                    self.visualization.max_points
                ),
            });
        }

        let level = self.logging.level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "Invalid log level '{}'. Must be one of: {}",
                    self.logging.level,
                    LOG_LEVELS.join(", ")
                ),
            });
        }

        Ok(())
    }
}

/// Provider toggles.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProvidersConfig {
    /// Register the math tools.
    #[serde(default = "default_true")]
    pub math: bool,

    /// Register the visualization tools.
    #[serde(default = "default_true")]
    pub visualization: bool,

    /// Register the educational resources.
    #[serde(default = "default_true")]
    pub resources: bool,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            math: default_true(),
            visualization: default_true(),
            resources: default_true(),
        }
    }
}

const fn default_true() -> bool {
    true
}

/// Visualization configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VisualizationConfig {
    /// Directory chart specifications are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Write each chart specification to a file in `output_dir`.
    #[serde(default)]
    pub write_files: bool,

    /// Upper bound on `plot_function` samples.
    #[serde(default = "default_max_points")]
    pub max_points: usize,
}

impl Default for VisualizationConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            write_files: false,
            max_points: default_max_points(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("visualizations")
}

const fn default_max_points() -> usize {
    10_000
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}
