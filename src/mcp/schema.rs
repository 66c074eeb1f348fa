//! Structural input schemas for tools.
//!
//! A tool declares its arguments as an [`InputSchema`]: a flat object with
//! typed properties and a list of required names. The schema serialises to
//! the JSON Schema subset MCP clients expect, and the registry validates
//! arguments against it before any handler runs.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

/// 2^63: whole floats strictly inside this magnitude convert to `i64` exactly.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// Primitive JSON value kinds a property may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
}

impl ValueKind {
    /// Returns whether `value` is of this kind.
    ///
    /// Integers are numbers that fit an `i64`; a float with no fractional
    /// part inside that range counts as an integer.
    #[must_use]
    pub fn matches(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Integer => {
                value.is_i64()
                    || value
                        .as_f64()
                        .is_some_and(|f| f.fract() == 0.0 && f.abs() < I64_BOUND)
            }
            Self::Boolean => value.is_boolean(),
            Self::Array => value.is_array(),
            Self::Object => value.is_object(),
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

/// Schema for a single property.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertySchema {
    #[serde(rename = "type")]
    pub kind: ValueKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<ItemSchema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

/// Element type of an array property.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ItemSchema {
    #[serde(rename = "type")]
    pub kind: ValueKind,
}

impl PropertySchema {
    #[must_use]
    pub const fn new(kind: ValueKind) -> Self {
        Self {
            kind,
            description: None,
            allowed: None,
            items: None,
            min_items: None,
            max_items: None,
            minimum: None,
            maximum: None,
            default: None,
        }
    }

    #[must_use]
    pub const fn string() -> Self {
        Self::new(ValueKind::String)
    }

    #[must_use]
    pub const fn number() -> Self {
        Self::new(ValueKind::Number)
    }

    #[must_use]
    pub const fn integer() -> Self {
        Self::new(ValueKind::Integer)
    }

    #[must_use]
    pub const fn object() -> Self {
        Self::new(ValueKind::Object)
    }

    /// An array whose elements are all of `kind`.
    #[must_use]
    pub fn array_of(kind: ValueKind) -> Self {
        let mut schema = Self::new(ValueKind::Array);
        schema.items = Some(ItemSchema { kind });
        schema
    }

    /// A string restricted to the given values.
    #[must_use]
    pub fn one_of(values: &[&str]) -> Self {
        let mut schema = Self::string();
        schema.allowed = Some(values.iter().map(ToString::to_string).collect());
        schema
    }

    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    #[must_use]
    pub fn items_between(mut self, min: usize, max: usize) -> Self {
        self.min_items = Some(min);
        self.max_items = Some(max);
        self
    }

    #[must_use]
    pub fn range(mut self, minimum: f64, maximum: f64) -> Self {
        self.minimum = Some(minimum);
        self.maximum = Some(maximum);
        self
    }

    fn check(&self, field: &str, value: &Value) -> Result<(), SchemaViolation> {
        if !self.kind.matches(value) {
            return Err(SchemaViolation::new(
                field,
                format!("expected {}, got {}", self.kind.name(), kind_of(value)),
            ));
        }

        if let (Some(allowed), Some(s)) = (&self.allowed, value.as_str()) {
            if !allowed.iter().any(|a| a == s) {
                return Err(SchemaViolation::new(
                    field,
                    format!("'{s}' is not one of: {}", allowed.join(", ")),
                ));
            }
        }

        if let Some(n) = value.as_f64() {
            if self.minimum.is_some_and(|min| n < min) || self.maximum.is_some_and(|max| n > max) {
                return Err(SchemaViolation::new(
                    field,
                    format!(
                        "{n} is outside the allowed range [{}, {}]",
                        self.minimum.map_or_else(|| "-inf".to_string(), |m| m.to_string()),
                        self.maximum.map_or_else(|| "inf".to_string(), |m| m.to_string()),
                    ),
                ));
            }
        }

        if let Some(elements) = value.as_array() {
            if self.min_items.is_some_and(|min| elements.len() < min)
                || self.max_items.is_some_and(|max| elements.len() > max)
            {
                return Err(SchemaViolation::new(
                    field,
                    format!("array has {} items", elements.len()),
                ));
            }
            if let Some(items) = self.items {
                if let Some(index) = elements.iter().position(|e| !items.kind.matches(e)) {
                    return Err(SchemaViolation::new(
                        field,
                        format!("item {index} is not of type {}", items.kind.name()),
                    ));
                }
            }
        }

        Ok(())
    }
}

/// A tool's declared argument object.
#[derive(Debug, Clone, Default)]
pub struct InputSchema {
    properties: IndexMap<String, PropertySchema>,
    required: Vec<String>,
}

impl InputSchema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a required property.
    #[must_use]
    pub fn required(mut self, name: &str, schema: PropertySchema) -> Self {
        self.required.push(name.to_string());
        self.properties.insert(name.to_string(), schema);
        self
    }

    /// Adds an optional property.
    #[must_use]
    pub fn optional(mut self, name: &str, schema: PropertySchema) -> Self {
        self.properties.insert(name.to_string(), schema);
        self
    }

    /// Returns the name of the first property whose constraints can never
    /// be satisfied (an empty enum, or inverted bounds).
    #[must_use]
    pub fn unsatisfiable_property(&self) -> Option<&str> {
        self.properties
            .iter()
            .find(|(_, p)| {
                p.allowed.as_ref().is_some_and(Vec::is_empty)
                    || matches!((p.min_items, p.max_items), (Some(min), Some(max)) if min > max)
                    || matches!((p.minimum, p.maximum), (Some(min), Some(max)) if min > max)
            })
            .map(|(name, _)| name.as_str())
    }

    /// Validates an argument value against this schema.
    ///
    /// # Errors
    ///
    /// Returns the first violation found, naming the offending field.
    pub fn validate(&self, arguments: &Value) -> Result<(), SchemaViolation> {
        let Some(object) = arguments.as_object() else {
            return Err(SchemaViolation::new(
                "arguments",
                format!("expected object, got {}", kind_of(arguments)),
            ));
        };

        for name in &self.required {
            match object.get(name) {
                None | Some(Value::Null) => {
                    return Err(SchemaViolation::new(name, "missing required field"));
                }
                Some(_) => {}
            }
        }

        for (name, schema) in &self.properties {
            match object.get(name) {
                None | Some(Value::Null) => {}
                Some(value) => schema.check(name, value)?,
            }
        }

        Ok(())
    }

    /// Renders the schema as a JSON Schema object.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let properties: Map<String, Value> = self
            .properties
            .iter()
            .map(|(name, schema)| {
                (
                    name.clone(),
                    serde_json::to_value(schema).unwrap_or(Value::Null),
                )
            })
            .collect();

        serde_json::json!({
            "type": "object",
            "properties": properties,
            "required": self.required,
        })
    }
}

impl Serialize for InputSchema {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// A single argument that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    pub field: String,
    pub reason: String,
}

impl SchemaViolation {
    fn new(field: &str, reason: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "field '{}': {}", self.field, self.reason)
    }
}

const fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn arithmetic() -> InputSchema {
        InputSchema::new()
            .required("operation", PropertySchema::one_of(&["add", "divide"]))
            .required("a", PropertySchema::number())
            .required("b", PropertySchema::number())
    }

    #[test]
    fn accepts_valid_arguments() {
        assert!(arithmetic()
            .validate(&json!({"operation": "add", "a": 1, "b": 2.5}))
            .is_ok());
    }

    #[test]
    fn rejects_missing_required() {
        let err = arithmetic()
            .validate(&json!({"operation": "add", "a": 1}))
            .unwrap_err();
        assert_eq!(err.field, "b");
    }

    #[test]
    fn rejects_wrong_type() {
        let err = arithmetic()
            .validate(&json!({"operation": "add", "a": "1", "b": 2}))
            .unwrap_err();
        assert_eq!(err.field, "a");
        assert!(err.reason.contains("expected number"));
    }

    #[test]
    fn rejects_value_outside_enum() {
        let err = arithmetic()
            .validate(&json!({"operation": "modulo", "a": 1, "b": 2}))
            .unwrap_err();
        assert_eq!(err.field, "operation");
    }

    #[test]
    fn rejects_non_object_arguments() {
        assert!(arithmetic().validate(&json!([1, 2])).is_err());
    }

    #[test]
    fn integer_accepts_whole_floats_only() {
        assert!(ValueKind::Integer.matches(&json!(4)));
        assert!(ValueKind::Integer.matches(&json!(4.0)));
        assert!(!ValueKind::Integer.matches(&json!(4.5)));
    }

    #[test]
    fn integer_rejects_values_beyond_i64() {
        assert!(ValueKind::Integer.matches(&json!(i64::MIN)));
        assert!(ValueKind::Integer.matches(&json!(i64::MAX)));
        assert!(ValueKind::Integer.matches(&json!(1e15)));
        assert!(!ValueKind::Integer.matches(&json!(u64::MAX)));
        assert!(!ValueKind::Integer.matches(&json!(1e20)));
        assert!(!ValueKind::Integer.matches(&json!(-1e19)));
    }

    #[test]
    fn array_constraints() {
        let schema = InputSchema::new().required(
            "x_range",
            PropertySchema::array_of(ValueKind::Number).items_between(2, 2),
        );
        assert!(schema.validate(&json!({"x_range": [0, 1]})).is_ok());
        assert!(schema.validate(&json!({"x_range": [0]})).is_err());
        assert!(schema.validate(&json!({"x_range": [0, "1"]})).is_err());
    }

    #[test]
    fn numeric_range() {
        let schema =
            InputSchema::new().optional("num_points", PropertySchema::integer().range(10.0, 100.0));
        assert!(schema.validate(&json!({"num_points": 50})).is_ok());
        assert!(schema.validate(&json!({"num_points": 5})).is_err());
        assert!(schema.validate(&json!({})).is_ok());
    }

    #[test]
    fn serialises_as_json_schema() {
        let value = arithmetic().to_json();
        assert_eq!(value["type"], "object");
        assert_eq!(value["required"], json!(["operation", "a", "b"]));
        assert_eq!(value["properties"]["operation"]["enum"], json!(["add", "divide"]));
        assert_eq!(value["properties"]["a"]["type"], "number");
    }

    #[test]
    fn detects_unsatisfiable_property() {
        assert_eq!(arithmetic().unsatisfiable_property(), None);

        let schema = InputSchema::new().required("mode", PropertySchema::one_of(&[]));
        assert_eq!(schema.unsatisfiable_property(), Some("mode"));

        let schema = InputSchema::new().optional("n", PropertySchema::integer().range(10.0, 1.0));
        assert_eq!(schema.unsatisfiable_property(), Some("n"));
    }
}
