//! JSON-RPC 2.0 message types for MCP protocol.
//!
//! This module defines the envelope types carried by the protocol engine.
//! All messages follow the JSON-RPC 2.0 specification with MCP-specific extensions.
//!
//! # Message Types
//!
//! - **Request**: A message expecting a response (has `id`)
//! - **Response**: A reply to a request (success or error, never both)
//! - **Notification**: A one-way message (no `id`, no response expected)
//!
//! # MCP-Specific Constraints
//!
//! - Request IDs must be strings or integers (never `null`)
//! - Request IDs are echoed verbatim in the matching response

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::mcp::errors::Failure;

/// The MCP protocol version this server prefers.
pub const MCP_PROTOCOL_VERSION: &str = "2024-11-05";

/// Protocol versions the server accepts when a client asks for one explicitly.
pub const SUPPORTED_PROTOCOL_VERSIONS: &[&str] = &["2024-11-05", "2025-03-26", "2025-06-18"];

/// Server name for capability negotiation.
pub const SERVER_NAME: &str = "mathviz-mcp";

/// Method names understood by the dispatcher.
pub mod methods {
    pub const INITIALIZE: &str = "initialize";
    pub const INITIALIZED: &str = "initialized";
    pub const NOTIFICATIONS_INITIALIZED: &str = "notifications/initialized";
    pub const PING: &str = "ping";
    pub const TOOLS_LIST: &str = "tools/list";
    pub const TOOLS_CALL: &str = "tools/call";
    pub const RESOURCES_LIST: &str = "resources/list";
    pub const RESOURCES_READ: &str = "resources/read";
}

/// A JSON-RPC 2.0 request ID.
///
/// Per the MCP specification, IDs must be strings or integers, never `null`.
/// Integers above `i64::MAX` land in [`RequestId::Unsigned`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    /// Numeric request ID.
    Number(i64),
    /// Numeric request ID too large for `i64`.
    Unsigned(u64),
    /// String request ID.
    String(String),
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Unsigned(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s}"),
        }
    }
}

/// A JSON-RPC 2.0 request message.
///
/// Requests expect a response from the server.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    /// Must be "2.0".
    pub jsonrpc: String,

    /// Unique request identifier.
    pub id: RequestId,

    /// The method to invoke.
    pub method: String,

    /// Optional parameters for the method.
    #[serde(default)]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    /// Validates that this is a well-formed JSON-RPC 2.0 request.
    ///
    /// Returns an error message if validation fails.
    #[must_use]
    pub fn validate(&self) -> Option<&'static str> {
        if self.jsonrpc != "2.0" {
            return Some("jsonrpc field must be \"2.0\"");
        }
        if self.method.is_empty() {
            return Some("method field cannot be empty");
        }
        None
    }
}

/// A JSON-RPC 2.0 notification message (incoming).
///
/// Notifications do not have an ID and do not expect a response.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcNotification {
    /// Must be "2.0".
    pub jsonrpc: String,

    /// The notification method.
    pub method: String,

    /// Optional parameters for the notification.
    #[serde(default)]
    pub params: Option<Value>,
}

/// A successful JSON-RPC 2.0 response.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcResponse {
    /// Always "2.0".
    pub jsonrpc: &'static str,

    /// The request ID this response corresponds to.
    pub id: RequestId,

    /// The result of the method call.
    pub result: Value,
}

impl JsonRpcResponse {
    /// Creates a new success response.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Value is not const-compatible
    pub fn success(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result,
        }
    }
}

/// JSON-RPC 2.0 error codes, including the application-defined band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Invalid JSON was received by the server.
    ParseError,
    /// The JSON sent is not a valid Request object, or violates session state.
    InvalidRequest,
    /// The method does not exist or is not available.
    MethodNotFound,
    /// Invalid method parameters.
    InvalidParams,
    /// Internal JSON-RPC error.
    InternalError,
    /// A tool handler ran but failed on domain grounds.
    ToolExecutionError,
    /// The requested tool is not registered.
    ToolNotFound,
    /// The requested resource is not registered.
    ResourceNotFound,
}

impl ErrorCode {
    /// Returns the numeric code for this error.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::ParseError => -32700,
            Self::InvalidRequest => -32600,
            Self::MethodNotFound => -32601,
            Self::InvalidParams => -32602,
            Self::InternalError => -32603,
            Self::ToolExecutionError => -32000,
            Self::ToolNotFound => -32001,
            Self::ResourceNotFound => -32002,
        }
    }
}

/// A JSON-RPC 2.0 error object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonRpcErrorData {
    /// The error code.
    pub code: i32,

    /// A short description of the error.
    pub message: String,

    /// Additional information about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcErrorData {
    /// Creates a new error with a custom message.
    #[must_use]
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.code(),
            message: message.into(),
            data: None,
        }
    }

    /// Adds additional data to the error.
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// A JSON-RPC 2.0 error response.
///
/// The `id` is serialised as `null` when it could not be recovered.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcError {
    /// Always "2.0".
    pub jsonrpc: &'static str,

    /// The request ID this error corresponds to (if known).
    pub id: Option<RequestId>,

    /// The error details.
    pub error: JsonRpcErrorData,
}

impl JsonRpcError {
    /// Creates a new error response.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // JsonRpcErrorData contains String
    pub fn new(id: Option<RequestId>, error: JsonRpcErrorData) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            error,
        }
    }
}

/// An incoming message that could be either a request or notification.
#[derive(Debug, Clone)]
pub enum IncomingMessage {
    /// A request expecting a response.
    Request(JsonRpcRequest),
    /// A notification (no response expected).
    Notification(JsonRpcNotification),
}

impl IncomingMessage {
    /// Returns the method name of this message.
    #[must_use]
    pub fn method(&self) -> &str {
        match self {
            Self::Request(req) => &req.method,
            Self::Notification(notif) => &notif.method,
        }
    }
}

/// Why a frame was rejected: the id, if one could be recovered, and the
/// failure to report.
pub type Rejection = (Option<RequestId>, Failure);

/// Parses a JSON string into an incoming message.
///
/// Bytes that are not valid JSON yield a parse error with no id. Valid JSON
/// that breaks the envelope rules yields an invalid request error, carrying
/// the id when one can be recovered.
///
/// # Errors
///
/// Returns a [`Rejection`] if the JSON is malformed or not a valid message.
pub fn parse_message(json: &str) -> Result<IncomingMessage, Rejection> {
    let value: Value = serde_json::from_str(json).map_err(|e| {
        (
            None,
            Failure::Parse {
                detail: e.to_string(),
            },
        )
    })?;

    let Some(obj) = value.as_object() else {
        return Err((None, Failure::invalid_request("message must be a JSON object")));
    };

    // Recover the id early so envelope errors can still be correlated
    let recovered_id = obj
        .get("id")
        .and_then(|id| serde_json::from_value::<RequestId>(id.clone()).ok());

    let Some(jsonrpc) = obj.get("jsonrpc").and_then(Value::as_str) else {
        return Err((recovered_id, Failure::invalid_request("missing jsonrpc field")));
    };

    if jsonrpc != "2.0" {
        return Err((
            recovered_id,
            Failure::invalid_request("jsonrpc field must be \"2.0\""),
        ));
    }

    if obj.contains_key("id") {
        if recovered_id.is_none() {
            return Err((None, Failure::invalid_request("id must be a string or an integer")));
        }

        let request: JsonRpcRequest = serde_json::from_value(value)
            .map_err(|e| (recovered_id, Failure::invalid_request(e.to_string())))?;

        if let Some(reason) = request.validate() {
            return Err((Some(request.id), Failure::invalid_request(reason)));
        }

        Ok(IncomingMessage::Request(request))
    } else {
        let notification: JsonRpcNotification = serde_json::from_value(value)
            .map_err(|e| (None, Failure::invalid_request(e.to_string())))?;

        Ok(IncomingMessage::Notification(notification))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_request() {
        let json = r#"{"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}"#;
        let msg = parse_message(json).unwrap();

        let IncomingMessage::Request(req) = msg else {
            panic!("Expected Request, got Notification");
        };
        assert_eq!(req.id, RequestId::Number(1));
        assert_eq!(req.method, "initialize");
    }

    #[test]
    fn parse_valid_notification() {
        let json = r#"{"jsonrpc": "2.0", "method": "notifications/initialized"}"#;
        let msg = parse_message(json).unwrap();

        let IncomingMessage::Notification(notif) = msg else {
            panic!("Expected Notification, got Request");
        };
        assert_eq!(notif.method, "notifications/initialized");
    }

    #[test]
    fn parse_string_id() {
        let json = r#"{"jsonrpc": "2.0", "id": "abc-123", "method": "test"}"#;
        let msg = parse_message(json).unwrap();

        let IncomingMessage::Request(req) = msg else {
            panic!("Expected Request, got Notification");
        };
        assert_eq!(req.id, RequestId::String("abc-123".to_string()));
    }

    #[test]
    fn parse_invalid_json() {
        let (id, failure) = parse_message("not valid json").unwrap_err();
        assert_eq!(failure.code(), ErrorCode::ParseError);
        assert!(id.is_none());
    }

    #[test]
    fn parse_missing_jsonrpc_keeps_id() {
        let json = r#"{"id": 7, "method": "test"}"#;
        let (id, failure) = parse_message(json).unwrap_err();
        assert_eq!(failure.code(), ErrorCode::InvalidRequest);
        assert_eq!(id, Some(RequestId::Number(7)));
    }

    #[test]
    fn parse_wrong_jsonrpc_version() {
        let json = r#"{"jsonrpc": "1.0", "id": 1, "method": "test"}"#;
        let (_, failure) = parse_message(json).unwrap_err();
        assert_eq!(failure.code(), ErrorCode::InvalidRequest);
    }

    #[test]
    fn parse_null_id_is_invalid() {
        let json = r#"{"jsonrpc": "2.0", "id": null, "method": "test"}"#;
        let (id, failure) = parse_message(json).unwrap_err();
        assert_eq!(failure.code(), ErrorCode::InvalidRequest);
        assert!(id.is_none());
    }

    #[test]
    fn parse_non_object_is_invalid_request() {
        let (_, failure) = parse_message("[1, 2, 3]").unwrap_err();
        assert_eq!(failure.code(), ErrorCode::InvalidRequest);
    }

    #[test]
    fn parse_empty_method_is_invalid() {
        let json = r#"{"jsonrpc": "2.0", "id": 3, "method": ""}"#;
        let (id, _) = parse_message(json).unwrap_err();
        assert_eq!(id, Some(RequestId::Number(3)));
    }

    #[test]
    fn parse_id_beyond_i64_round_trips() {
        let json = r#"{"jsonrpc": "2.0", "id": 18446744073709551615, "method": "ping"}"#;
        let IncomingMessage::Request(req) = parse_message(json).unwrap() else {
            panic!("Expected Request, got Notification");
        };
        assert_eq!(req.id, RequestId::Unsigned(u64::MAX));

        let response = JsonRpcResponse::success(req.id, serde_json::json!({}));
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains(r#""id":18446744073709551615"#));
    }

    #[test]
    fn parse_fractional_id_is_invalid() {
        let json = r#"{"jsonrpc": "2.0", "id": 1.5, "method": "ping"}"#;
        let (id, failure) = parse_message(json).unwrap_err();
        assert_eq!(failure.code(), ErrorCode::InvalidRequest);
        assert!(id.is_none());
    }

    #[test]
    fn serialise_success_response() {
        let response =
            JsonRpcResponse::success(RequestId::Number(1), serde_json::json!({"ok": true}));
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains(r#""jsonrpc":"2.0""#));
        assert!(json.contains(r#""id":1"#));
        assert!(json.contains(r#""result":{"ok":true}"#));
        assert!(!json.contains("error"));
    }

    #[test]
    fn serialise_error_with_unknown_id_as_null() {
        let error = Failure::Parse {
            detail: "eof".to_string(),
        }
        .into_response(None);
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains(r#""id":null"#));
        assert!(json.contains(r#""code":-32700"#));
        assert!(!json.contains("result"));
    }

    #[test]
    fn application_codes() {
        assert_eq!(ErrorCode::ToolExecutionError.code(), -32000);
        assert_eq!(ErrorCode::ToolNotFound.code(), -32001);
        assert_eq!(ErrorCode::ResourceNotFound.code(), -32002);
    }

    #[test]
    fn request_id_display() {
        assert_eq!(format!("{}", RequestId::Number(42)), "42");
        assert_eq!(format!("{}", RequestId::String("abc".to_string())), "abc");
    }
}
