//! Protocol failure taxonomy and the mapping onto JSON-RPC error objects.
//!
//! Every failure the engine can report to a caller is a [`Failure`]. The
//! conversion to the wire representation happens in exactly one place,
//! [`Failure::to_error_data`], which is pure: it never performs I/O and
//! never panics.

use serde_json::{json, Value};
use thiserror::Error;

use crate::mcp::protocol::{ErrorCode, JsonRpcError, JsonRpcErrorData, RequestId};

/// A per-request failure, reported to the caller as a JSON-RPC error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Failure {
    /// Input bytes were not valid JSON.
    #[error("Parse error: {detail}")]
    Parse {
        /// Description of the syntax problem.
        detail: String,
    },

    /// Well-formed data that violates envelope or session-state rules.
    #[error("Invalid Request: {reason}")]
    InvalidRequest {
        /// Why the request was rejected.
        reason: String,
    },

    /// The method name is not routed by the dispatcher.
    #[error("Method not found: {method}")]
    MethodNotFound {
        /// The offending method name.
        method: String,
    },

    /// Params did not satisfy the targeted method or tool.
    #[error("Invalid params: {detail}")]
    InvalidParams {
        /// What was wrong with the params.
        detail: String,
        /// Tool whose schema was violated, if any.
        tool: Option<String>,
        /// Offending field, if known.
        field: Option<String>,
    },

    /// An uncaught fault inside the engine.
    #[error("Internal error: {detail}")]
    Internal {
        /// Description of the fault.
        detail: String,
    },

    /// The tool name is not registered.
    #[error("Tool not found: {name}")]
    ToolNotFound {
        /// Requested tool name.
        name: String,
    },

    /// The resource URI is not registered.
    #[error("Resource not found: {uri}")]
    ResourceNotFound {
        /// Requested resource URI.
        uri: String,
    },

    /// A handler ran and failed on domain grounds.
    #[error("Tool execution error in '{tool}': {cause}")]
    ToolExecution {
        /// Tool that failed.
        tool: String,
        /// Human-readable cause.
        cause: String,
    },
}

impl Failure {
    /// Shorthand for a session-state or envelope violation.
    #[must_use]
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            reason: reason.into(),
        }
    }

    /// Shorthand for params that are not tied to a tool schema.
    #[must_use]
    pub fn invalid_params(detail: impl Into<String>) -> Self {
        Self::InvalidParams {
            detail: detail.into(),
            tool: None,
            field: None,
        }
    }

    /// Shorthand for an internal fault.
    #[must_use]
    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            detail: detail.into(),
        }
    }

    /// Returns the error code this failure maps to.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Parse { .. } => ErrorCode::ParseError,
            Self::InvalidRequest { .. } => ErrorCode::InvalidRequest,
            Self::MethodNotFound { .. } => ErrorCode::MethodNotFound,
            Self::InvalidParams { .. } => ErrorCode::InvalidParams,
            Self::Internal { .. } => ErrorCode::InternalError,
            Self::ToolNotFound { .. } => ErrorCode::ToolNotFound,
            Self::ResourceNotFound { .. } => ErrorCode::ResourceNotFound,
            Self::ToolExecution { .. } => ErrorCode::ToolExecutionError,
        }
    }

    /// Maps this failure onto its wire representation.
    #[must_use]
    pub fn to_error_data(&self) -> JsonRpcErrorData {
        let error = JsonRpcErrorData::with_message(self.code(), self.to_string());

        match self.data() {
            Some(data) => error.with_data(data),
            None => error,
        }
    }

    /// Builds the full error response for a request.
    #[must_use]
    pub fn into_response(self, id: Option<RequestId>) -> JsonRpcError {
        JsonRpcError::new(id, self.to_error_data())
    }

    fn data(&self) -> Option<Value> {
        match self {
            Self::Parse { .. } | Self::InvalidRequest { .. } | Self::Internal { .. } => None,
            Self::MethodNotFound { method } => Some(json!({ "method": method })),
            Self::InvalidParams { tool, field, .. } => {
                if tool.is_none() && field.is_none() {
                    return None;
                }
                Some(json!({ "tool": tool, "field": field }))
            }
            Self::ToolNotFound { name } => Some(json!({ "tool": name })),
            Self::ResourceNotFound { uri } => Some(json!({ "uri": uri })),
            Self::ToolExecution { tool, cause } => Some(json!({ "tool": tool, "cause": cause })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_taxonomy() {
        let cases = [
            (Failure::Parse { detail: "x".into() }, -32700),
            (Failure::invalid_request("x"), -32600),
            (Failure::MethodNotFound { method: "x".into() }, -32601),
            (Failure::invalid_params("x"), -32602),
            (Failure::internal("x"), -32603),
            (
                Failure::ToolExecution {
                    tool: "t".into(),
                    cause: "c".into(),
                },
                -32000,
            ),
            (Failure::ToolNotFound { name: "x".into() }, -32001),
            (Failure::ResourceNotFound { uri: "x".into() }, -32002),
        ];

        for (failure, code) in cases {
            assert_eq!(failure.to_error_data().code, code, "{failure:?}");
        }
    }

    #[test]
    fn tool_execution_carries_tool_and_cause() {
        let failure = Failure::ToolExecution {
            tool: "basic_arithmetic".into(),
            cause: "Division by zero is undefined".into(),
        };
        let data = failure.to_error_data();

        assert!(data.message.contains("basic_arithmetic"));
        let payload = data.data.unwrap();
        assert_eq!(payload["tool"], "basic_arithmetic");
        assert_eq!(payload["cause"], "Division by zero is undefined");
    }

    #[test]
    fn plain_invalid_params_has_no_data() {
        assert!(Failure::invalid_params("Missing tool name")
            .to_error_data()
            .data
            .is_none());
    }

    #[test]
    fn schema_violation_names_field() {
        let failure = Failure::InvalidParams {
            detail: "missing required field 'a'".into(),
            tool: Some("basic_arithmetic".into()),
            field: Some("a".into()),
        };
        let data = failure.to_error_data().data.unwrap();
        assert_eq!(data["field"], "a");
    }

    #[test]
    fn into_response_keeps_id() {
        let response = Failure::invalid_request("server not initialized")
            .into_response(Some(RequestId::Number(9)));
        assert_eq!(response.id, Some(RequestId::Number(9)));
        assert_eq!(response.error.code, -32600);
    }
}
