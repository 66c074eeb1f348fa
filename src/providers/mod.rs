//! Tool and resource providers.
//!
//! Each provider registers a fixed set of tools or resources at startup.
//! Which providers are enabled is decided by [`crate::config::ProvidersConfig`].

pub mod math;
pub mod resources;
pub mod visualization;

use serde::de::{DeserializeOwned, Deserializer, Error as _};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::Config;
use crate::error::RegistryError;
use crate::mcp::registry::{ToolError, ToolRegistry};
use crate::mcp::resources::ResourceRegistry;
use crate::viz::ChartSink;

/// Builds the tool and resource registries for `config`.
///
/// # Errors
///
/// Fails on a duplicate or malformed registration. This is a startup
/// configuration error and the server must not start.
pub fn build_registries(
    config: &Config,
) -> Result<(ToolRegistry, ResourceRegistry), RegistryError> {
    let mut tools = ToolRegistry::new();
    let mut resources = ResourceRegistry::new();

    if config.providers.math {
        math::register(&mut tools)?;
    }
    if config.providers.visualization {
        visualization::register(&mut tools, &ChartSink::from_config(&config.visualization))?;
    }
    if config.providers.resources {
        resources::register(&mut resources)?;
    }

    tracing::debug!(
        tools = tools.len(),
        resources = resources.len(),
        "Registries built"
    );
    Ok((tools, resources))
}

/// One valid call per registered tool, as `(name, arguments)`.
#[must_use]
pub fn example_calls() -> Vec<(&'static str, Value)> {
    vec![
        ("basic_arithmetic", json!({"operation": "add", "a": 15, "b": 27})),
        ("advanced_operations", json!({"operation": "power", "value": 2, "extra_param": 10})),
        ("number_theory", json!({"operation": "gcd", "a": 48, "b": 18})),
        ("solve_equations", json!({"equation_type": "quadratic", "a": 1, "b": -5, "c": 6})),
        ("geometry", json!({"operation": "distance", "values": [0, 0, 3, 4]})),
        ("trigonometry", json!({"function": "sin", "angle": 30, "unit": "degrees"})),
        ("logarithms", json!({"log_type": "log10", "x": 1000})),
        ("fractions", json!({"operation": "simplify_fraction", "numerator": 6, "denominator": 8})),
        ("percentages", json!({"part": 25, "whole": 200})),
        ("evaluate_expression", json!({"expression": "2 + 3 * (4 - 1)"})),
        ("explain_concept", json!({"concept": "fractions", "level": "middle"})),
        (
            "create_chart",
            json!({
                "chart_type": "bar",
                "data": {"categories": ["A", "B", "C"], "values": [10, 20, 15]}
            }),
        ),
        (
            "plot_function",
            json!({"expression": "sin(x)", "x_range": [-3.14, 3.14], "num_points": 50}),
        ),
        ("create_statistics_chart", json!({"data": [1, 2, 2, 3, 3, 3, 4, 4, 5]})),
        ("visualize_geometry", json!({"shape_type": "circle", "parameters": {"radius": 2}})),
    ]
}

/// Decodes already-validated tool arguments into their typed form.
///
/// Serde failures here mean the schema let through something the body
/// cannot use, such as a fraction where an integer is needed.
pub(crate) fn decode<T: DeserializeOwned>(arguments: &Value) -> Result<T, ToolError> {
    T::deserialize(arguments).map_err(|e| ToolError::arguments(&e))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn integral(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    value
        .as_f64()
        .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
        .map(|f| f as i64)
}

/// Accepts `12` and `12.0` alike for integer arguments.
pub(crate) fn whole_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    integral(&value).ok_or_else(|| D::Error::custom(format!("expected an integer, got {value}")))
}

/// [`whole_number`] for optional fields; `null` reads as absent.
pub(crate) fn optional_whole_number<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<i64>, D::Error> {
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => integral(&value)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("expected an integer, got {value}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::errors::Failure;

    #[derive(Debug, Deserialize)]
    struct Counted {
        #[serde(deserialize_with = "whole_number")]
        n: i64,
        #[serde(default, deserialize_with = "optional_whole_number")]
        m: Option<i64>,
    }

    #[test]
    fn whole_numbers_accept_integral_floats() {
        let parsed: Counted = decode(&json!({"n": 12.0, "m": 3})).unwrap();
        assert_eq!(parsed.n, 12);
        assert_eq!(parsed.m, Some(3));

        let parsed: Counted = decode(&json!({"n": -4, "m": null})).unwrap();
        assert_eq!(parsed.m, None);

        assert!(decode::<Counted>(&json!({"n": 1.5})).is_err());
    }

    #[test]
    fn every_provider_registers() {
        let (tools, resources) = build_registries(&Config::default()).unwrap();
        assert_eq!(tools.len(), example_calls().len());
        assert_eq!(resources.len(), 7);
    }

    #[test]
    fn disabled_providers_register_nothing() {
        let mut config = Config::default();
        config.providers.math = false;
        config.providers.resources = false;
        let (tools, resources) = build_registries(&config).unwrap();
        assert_eq!(tools.len(), 4);
        assert!(resources.is_empty());
    }

    #[test]
    fn oversized_integers_are_invalid_params() {
        let (tools, _) = build_registries(&Config::default()).unwrap();
        for a in [json!(1e20), json!(u64::MAX)] {
            let err = tools
                .invoke("number_theory", &json!({"operation": "gcd", "a": a, "b": 4}))
                .unwrap_err();
            assert!(matches!(err, Failure::InvalidParams { .. }), "{err:?}");
        }
    }

    #[test]
    fn example_calls_cover_every_tool() {
        let (tools, _) = build_registries(&Config::default()).unwrap();
        for (name, arguments) in example_calls() {
            let outcome = tools.invoke(name, &arguments);
            assert!(outcome.is_ok(), "{name} failed: {outcome:?}");
        }
    }
}
