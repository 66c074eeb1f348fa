//! Static educational resources.

use serde_json::{json, Value};

use crate::error::RegistryError;
use crate::mcp::resources::{ResourceDescriptor, ResourcePayload, ResourceRegistry, StaticResource};

const TEXT: &str = "text/plain";
const JSON: &str = "application/json";

/// `(uri, name, description, content)` for every plain-text resource.
const TEXT_RESOURCES: &[(&str, &str, &str, &str)] = &[
    (
        "math://concepts/elementary",
        "Elementary Math Concepts",
        "Basic arithmetic and foundational concepts",
        include_str!("content/concepts_elementary.txt"),
    ),
    (
        "math://concepts/middle",
        "Middle School Math Concepts",
        "Fractions, decimals, basic algebra",
        include_str!("content/concepts_middle.txt"),
    ),
    (
        "math://concepts/high_school",
        "High School Math Concepts",
        "Advanced algebra, geometry, trigonometry",
        include_str!("content/concepts_high_school.txt"),
    ),
    (
        "math://formulas/geometry",
        "Geometry Formulas",
        "Common geometric formulas and equations",
        include_str!("content/formulas_geometry.txt"),
    ),
    (
        "math://formulas/algebra",
        "Algebra Formulas",
        "Algebraic formulas and identities",
        include_str!("content/formulas_algebra.txt"),
    ),
];

const FUNCTION_EXAMPLES: &str = include_str!("content/examples_functions.txt");

/// Example `data` payloads for each `create_chart` type.
fn chart_examples() -> Value {
    json!({
        "line_chart": {
            "description": "Line chart for continuous data",
            "data": {"x": [1, 2, 3, 4, 5], "y": [2, 4, 6, 8, 10]},
        },
        "bar_chart": {
            "description": "Bar chart for categorical data",
            "data": {"categories": ["A", "B", "C", "D"], "values": [10, 25, 15, 30]},
        },
        "scatter_plot": {
            "description": "Scatter plot for correlation analysis",
            "data": {
                "x": [1, 2, 3, 4, 5],
                "y": [2, 5, 3, 8, 7],
                "colors": [1, 2, 3, 4, 5],
                "sizes": [20, 50, 80, 110, 140],
            },
        },
        "pie_chart": {
            "description": "Pie chart for proportional data",
            "data": {"labels": ["Red", "Blue", "Green"], "values": [30, 45, 25]},
        },
        "histogram": {
            "description": "Histogram for data distribution",
            "data": {"values": [1, 2, 2, 3, 3, 3, 4, 4, 5], "bins": 10},
        },
        "box_plot": {
            "description": "Box plot for comparing distributions",
            "data": {"values": [[1, 2, 3, 4, 5], [2, 4, 6, 8, 10]], "labels": ["First", "Second"]},
        },
    })
}

/// Registers the static resources.
///
/// # Errors
///
/// Fails if any URI is already registered.
pub fn register(resources: &mut ResourceRegistry) -> Result<(), RegistryError> {
    for &(uri, name, description, content) in TEXT_RESOURCES {
        resources.register(
            ResourceDescriptor::new(uri, name, description, TEXT),
            StaticResource(ResourcePayload::Text(content.to_string())),
        )?;
    }

    resources.register(
        ResourceDescriptor::new(
            "viz://examples/charts",
            "Chart Examples",
            "Examples of different chart types and their data formats",
            JSON,
        ),
        StaticResource(ResourcePayload::Structured(chart_examples())),
    )?;

    resources.register(
        ResourceDescriptor::new(
            "viz://examples/functions",
            "Function Plotting Examples",
            "Examples of mathematical function expressions for plotting",
            TEXT,
        ),
        StaticResource(ResourcePayload::Text(FUNCTION_EXAMPLES.to_string())),
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viz::chart::{create_chart, ChartKind, Labels};
    use crate::viz::ChartSink;

    fn registry() -> ResourceRegistry {
        let mut resources = ResourceRegistry::new();
        register(&mut resources).unwrap();
        resources
    }

    #[test]
    fn listing_keeps_registration_order() {
        let uris: Vec<_> = registry().list().iter().map(|d| d.uri.clone()).collect();
        assert_eq!(uris.len(), 7);
        assert_eq!(uris[0], "math://concepts/elementary");
        assert_eq!(uris[6], "viz://examples/functions");
    }

    #[test]
    fn chart_examples_are_json() {
        let content = registry().read("viz://examples/charts").unwrap();
        assert_eq!(content.mime_type, JSON);
        let parsed: Value = serde_json::from_str(&content.text).unwrap();
        assert!(parsed["bar_chart"]["data"]["categories"].is_array());
    }

    #[test]
    fn chart_examples_are_accepted_by_create_chart() {
        let sink = ChartSink::in_memory(10_000);
        let examples = chart_examples();
        for (key, kind) in [
            ("line_chart", ChartKind::Line),
            ("bar_chart", ChartKind::Bar),
            ("scatter_plot", ChartKind::Scatter),
            ("pie_chart", ChartKind::Pie),
            ("histogram", ChartKind::Histogram),
            ("box_plot", ChartKind::Box),
        ] {
            let data = examples[key]["data"].as_object().unwrap();
            assert!(
                create_chart(kind, data, Labels::default(), &sink).is_ok(),
                "{key} example rejected"
            );
        }
    }

    #[test]
    fn text_resources_are_non_empty() {
        let resources = registry();
        for &(uri, ..) in TEXT_RESOURCES {
            let content = resources.read(uri).unwrap();
            assert_eq!(content.mime_type, TEXT);
            assert!(!content.text.trim().is_empty(), "{uri} is empty");
        }
    }
}
