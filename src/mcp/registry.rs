//! Tool registry: name → {descriptor, handler}.
//!
//! The registry is populated once at startup by the providers and is then
//! shared read-only by every session. It knows nothing about what a handler
//! computes, only how to validate arguments and invoke it.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::error::RegistryError;
use crate::mcp::errors::Failure;
use crate::mcp::schema::InputSchema;

/// Describes a tool in `tools/list`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    /// Unique tool name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Declared arguments.
    pub input_schema: InputSchema,
}

impl ToolDescriptor {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: InputSchema,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

/// Successful result of a tool call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolOutcome {
    /// The computed value.
    pub result: Value,
    /// One-line human-readable explanation.
    pub explanation: String,
    /// Ordered working steps.
    pub steps: Vec<String>,
    /// Tool-specific fields, flattened next to the standard ones.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ToolOutcome {
    #[must_use]
    pub fn new(result: impl Into<Value>, explanation: impl Into<String>) -> Self {
        Self {
            result: result.into(),
            explanation: explanation.into(),
            steps: Vec::new(),
            extra: Map::new(),
        }
    }

    #[must_use]
    pub fn step(mut self, step: impl Into<String>) -> Self {
        self.steps.push(step.into());
        self
    }

    #[must_use]
    pub fn steps<I, S>(mut self, steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.steps.extend(steps.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }
}

/// A domain failure reported by a tool handler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ToolError {
    message: String,
}

impl ToolError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Wraps an argument decoding error.
    #[must_use]
    pub fn arguments(err: &serde_json::Error) -> Self {
        Self::new(format!("Invalid arguments: {err}"))
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Executes one tool.
///
/// Handlers are synchronous, must not retain state across calls, and must
/// not block indefinitely.
pub trait ToolHandler: Send + Sync {
    /// Runs the tool on already-validated arguments.
    ///
    /// # Errors
    ///
    /// Returns a [`ToolError`] when the computation fails on domain grounds.
    fn call(&self, arguments: &Value) -> Result<ToolOutcome, ToolError>;
}

impl<F> ToolHandler for F
where
    F: Fn(&Value) -> Result<ToolOutcome, ToolError> + Send + Sync,
{
    fn call(&self, arguments: &Value) -> Result<ToolOutcome, ToolError> {
        self(arguments)
    }
}

struct RegisteredTool {
    descriptor: ToolDescriptor,
    handler: Box<dyn ToolHandler>,
}

/// Registration-ordered set of tools.
#[derive(Default)]
pub struct ToolRegistry {
    tools: IndexMap<String, RegisteredTool>,
}

impl ToolRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool.
    ///
    /// # Errors
    ///
    /// Fails if the name is taken or the descriptor is malformed. Both are
    /// startup configuration errors.
    pub fn register(
        &mut self,
        descriptor: ToolDescriptor,
        handler: impl ToolHandler + 'static,
    ) -> Result<(), RegistryError> {
        if descriptor.name.trim().is_empty() || descriptor.name.contains(char::is_whitespace) {
            return Err(RegistryError::MalformedDescriptor {
                key: descriptor.name,
                reason: "tool names must be non-empty and contain no whitespace".to_string(),
            });
        }

        if let Some(property) = descriptor.input_schema.unsatisfiable_property() {
            return Err(RegistryError::MalformedDescriptor {
                reason: format!("property '{property}' has unsatisfiable constraints"),
                key: descriptor.name,
            });
        }

        if self.tools.contains_key(&descriptor.name) {
            return Err(RegistryError::DuplicateTool {
                name: descriptor.name,
            });
        }

        self.tools.insert(
            descriptor.name.clone(),
            RegisteredTool {
                descriptor,
                handler: Box::new(handler),
            },
        );
        Ok(())
    }

    /// Lists descriptors in registration order.
    #[must_use]
    pub fn list(&self) -> Vec<&ToolDescriptor> {
        self.tools.values().map(|t| &t.descriptor).collect()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools.get(name).map(|t| &t.descriptor)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Validates `arguments` and runs the named tool.
    ///
    /// # Errors
    ///
    /// - [`Failure::ToolNotFound`] for an unregistered name
    /// - [`Failure::InvalidParams`] when arguments violate the schema; the
    ///   handler is not called
    /// - [`Failure::ToolExecution`] when the handler fails
    pub fn invoke(&self, name: &str, arguments: &Value) -> Result<ToolOutcome, Failure> {
        let tool = self.tools.get(name).ok_or_else(|| Failure::ToolNotFound {
            name: name.to_string(),
        })?;

        tool.descriptor
            .input_schema
            .validate(arguments)
            .map_err(|violation| Failure::InvalidParams {
                detail: violation.to_string(),
                tool: Some(name.to_string()),
                field: Some(violation.field),
            })?;

        tool.handler.call(arguments).map_err(|err| {
            tracing::warn!(tool = name, error = %err, "Tool handler failed");
            Failure::ToolExecution {
                tool: name.to_string(),
                cause: err.message,
            }
        })
    }
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tools.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::mcp::schema::PropertySchema;

    fn echo_descriptor(name: &str) -> ToolDescriptor {
        ToolDescriptor::new(
            name,
            "Echo a number",
            InputSchema::new().required("n", PropertySchema::number()),
        )
    }

    #[allow(clippy::unnecessary_wraps)]
    fn noop(_: &Value) -> Result<ToolOutcome, ToolError> {
        Ok(ToolOutcome::new(0, ""))
    }

    fn counting_registry(counter: &Arc<AtomicUsize>) -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        let counter = Arc::clone(counter);
        let echo = move |args: &Value| -> Result<ToolOutcome, ToolError> {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(ToolOutcome::new(args["n"].clone(), "echoed"))
        };
        registry.register(echo_descriptor("echo"), echo).unwrap();
        registry
    }

    #[test]
    fn invoke_runs_handler() {
        let counter = Arc::new(AtomicUsize::new(0));
        let registry = counting_registry(&counter);

        let outcome = registry.invoke("echo", &json!({"n": 5})).unwrap();
        assert_eq!(outcome.result, json!(5));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unknown_tool_never_calls_handler() {
        let counter = Arc::new(AtomicUsize::new(0));
        let registry = counting_registry(&counter);

        let err = registry.invoke("missing", &json!({"n": 5})).unwrap_err();
        assert!(matches!(err, Failure::ToolNotFound { .. }));
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn schema_violation_never_calls_handler() {
        let counter = Arc::new(AtomicUsize::new(0));
        let registry = counting_registry(&counter);

        let err = registry.invoke("echo", &json!({"n": "five"})).unwrap_err();
        assert!(matches!(err, Failure::InvalidParams { .. }));
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn out_of_range_integer_never_calls_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut registry = ToolRegistry::new();
        registry
            .register(
                ToolDescriptor::new(
                    "count",
                    "Counts",
                    InputSchema::new().required("a", PropertySchema::integer()),
                ),
                move |_: &Value| -> Result<ToolOutcome, ToolError> {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(ToolOutcome::new(0, "counted"))
                },
            )
            .unwrap();

        for a in [json!(1e20), json!(u64::MAX)] {
            let err = registry.invoke("count", &json!({ "a": a })).unwrap_err();
            assert_eq!(err.code().code(), -32602, "{err:?}");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn handler_error_becomes_tool_execution() {
        let mut registry = ToolRegistry::new();
        registry
            .register(
                echo_descriptor("fail"),
                |_: &Value| -> Result<ToolOutcome, ToolError> {
                    Err(ToolError::new("negative input"))
                },
            )
            .unwrap();

        let err = registry.invoke("fail", &json!({"n": -1})).unwrap_err();
        assert_eq!(
            err,
            Failure::ToolExecution {
                tool: "fail".to_string(),
                cause: "negative input".to_string(),
            }
        );
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut registry = counting_registry(&counter);

        let err = registry
            .register(echo_descriptor("echo"), noop)
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicateTool {
                name: "echo".to_string()
            }
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn malformed_name_is_rejected() {
        let mut registry = ToolRegistry::new();
        let err = registry
            .register(echo_descriptor("two words"), noop)
            .unwrap_err();
        assert!(matches!(err, RegistryError::MalformedDescriptor { .. }));
    }

    #[test]
    fn list_preserves_registration_order() {
        let mut registry = ToolRegistry::new();
        for name in ["zeta", "alpha", "mid"] {
            registry
                .register(echo_descriptor(name), noop)
                .unwrap();
        }

        let names: Vec<_> = registry.list().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn outcome_serialises_extra_fields_flat() {
        let outcome = ToolOutcome::new(42, "Addition: 15 + 27 = 42")
            .step("Add 15 and 27")
            .with("chart_type", "line");
        let value = serde_json::to_value(&outcome).unwrap();

        assert_eq!(value["result"], 42);
        assert_eq!(value["steps"], json!(["Add 15 and 27"]));
        assert_eq!(value["chart_type"], "line");
    }

    #[test]
    fn descriptor_serialises_input_schema_camel_case() {
        let value = serde_json::to_value(echo_descriptor("echo")).unwrap();
        assert_eq!(value["inputSchema"]["type"], "object");
        assert_eq!(value["inputSchema"]["required"], json!(["n"]));
    }
}
