//! Routes incoming messages to the negotiator and the registries.
//!
//! The dispatcher branches only on protocol method names. Every fault it
//! encounters, including a panicking handler, ends up as a [`Failure`] and
//! is turned into an error response here, so nothing escapes to the
//! transport.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};

use crate::mcp::errors::Failure;
use crate::mcp::protocol::{methods, IncomingMessage, JsonRpcError, JsonRpcResponse};
use crate::mcp::registry::{ToolOutcome, ToolRegistry};
use crate::mcp::resources::ResourceRegistry;
use crate::mcp::session::{ServerCapabilities, Session};

/// What a request produces on the wire.
pub type Reply = Result<JsonRpcResponse, JsonRpcError>;

/// Content item in a tool call response.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    /// Text content.
    Text {
        /// The text content.
        text: String,
    },
}

/// Method router shared by every session.
///
/// Cloning is cheap; clones share the same registries.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    tools: Arc<ToolRegistry>,
    resources: Arc<ResourceRegistry>,
}

impl Dispatcher {
    #[must_use]
    pub fn new(tools: ToolRegistry, resources: ResourceRegistry) -> Self {
        Self::from_shared(Arc::new(tools), Arc::new(resources))
    }

    #[must_use]
    pub const fn from_shared(tools: Arc<ToolRegistry>, resources: Arc<ResourceRegistry>) -> Self {
        Self { tools, resources }
    }

    #[must_use]
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    #[must_use]
    pub fn resources(&self) -> &ResourceRegistry {
        &self.resources
    }

    /// Capabilities this dispatcher advertises in `initialize`.
    #[must_use]
    pub fn capabilities(&self) -> ServerCapabilities {
        ServerCapabilities::new(!self.resources.is_empty())
    }

    /// Handles one message.
    ///
    /// Returns `None` for notifications; their failures are logged and
    /// dropped.
    pub fn handle(&self, message: IncomingMessage, session: &mut Session) -> Option<Reply> {
        match message {
            IncomingMessage::Request(req) => {
                tracing::debug!(method = %req.method, id = %req.id, "Handling request");

                let result = guarded(&req.method, || {
                    self.route(&req.method, req.params.as_ref(), session)
                });

                Some(match result {
                    Ok(value) => Ok(JsonRpcResponse::success(req.id, value)),
                    Err(failure) => Err(failure.into_response(Some(req.id))),
                })
            }
            IncomingMessage::Notification(notif) => {
                tracing::debug!(method = %notif.method, "Handling notification");

                // The capabilities reply needs an id to travel on
                if notif.method == methods::INITIALIZE {
                    tracing::warn!("Ignoring initialize sent as a notification");
                    return None;
                }

                let result = guarded(&notif.method, || {
                    self.route(&notif.method, notif.params.as_ref(), session)
                });

                if let Err(failure) = result {
                    tracing::warn!(
                        method = %notif.method,
                        error = %failure,
                        "Dropping failed notification"
                    );
                }
                None
            }
        }
    }

    /// Calls a tool without any session gate.
    ///
    /// This is the negotiation-free path for stateless callers. The returned
    /// value is the same `tools/call` result a session would receive.
    ///
    /// # Errors
    ///
    /// Any [`Failure`] the registry reports, or [`Failure::Internal`] if the
    /// handler panics.
    pub fn call_tool(&self, name: &str, arguments: &Value) -> Result<Value, Failure> {
        guarded(methods::TOOLS_CALL, || self.invoke_tool(name, arguments))
    }

    fn route(
        &self,
        method: &str,
        params: Option<&Value>,
        session: &mut Session,
    ) -> Result<Value, Failure> {
        match method {
            methods::INITIALIZE => {
                let result = session.initialize(params, self.capabilities())?;
                to_result_value(&result)
            }
            methods::INITIALIZED | methods::NOTIFICATIONS_INITIALIZED => {
                session.initialized()?;
                Ok(json!({}))
            }
            _ => {
                session.require_ready()?;
                self.route_ready(method, params)
            }
        }
    }

    fn route_ready(&self, method: &str, params: Option<&Value>) -> Result<Value, Failure> {
        match method {
            methods::PING => Ok(json!({})),
            methods::TOOLS_LIST => Ok(json!({ "tools": self.tools.list() })),
            methods::TOOLS_CALL => self.handle_tools_call(params),
            methods::RESOURCES_LIST => Ok(json!({ "resources": self.resources.list() })),
            methods::RESOURCES_READ => self.handle_resources_read(params),
            other => Err(Failure::MethodNotFound {
                method: other.to_string(),
            }),
        }
    }

    fn handle_tools_call(&self, params: Option<&Value>) -> Result<Value, Failure> {
        let params = params.unwrap_or(&Value::Null);

        let name = params
            .get("name")
            .and_then(Value::as_str)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| Failure::invalid_params("Missing tool name"))?;

        let arguments = match params.get("arguments") {
            None | Some(Value::Null) => json!({}),
            Some(Value::String(raw)) => serde_json::from_str(raw)
                .map_err(|_| Failure::invalid_params("Invalid arguments format"))?,
            Some(other) => other.clone(),
        };

        self.invoke_tool(name, &arguments)
    }

    fn invoke_tool(&self, name: &str, arguments: &Value) -> Result<Value, Failure> {
        let outcome = self.tools.invoke(name, arguments)?;
        compose_tool_result(&outcome)
    }

    fn handle_resources_read(&self, params: Option<&Value>) -> Result<Value, Failure> {
        let uri = params
            .and_then(|p| p.get("uri"))
            .and_then(Value::as_str)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| Failure::invalid_params("Missing resource URI"))?;

        let content = self.resources.read(uri)?;
        Ok(json!({ "contents": [content] }))
    }
}

/// Builds the `tools/call` result: the outcome's own fields plus MCP text
/// content holding the pretty-printed outcome.
fn compose_tool_result(outcome: &ToolOutcome) -> Result<Value, Failure> {
    let mut value = to_result_value(outcome)?;
    let text = serde_json::to_string_pretty(&value).map_err(|e| {
        tracing::error!(error = %e, "Failed to serialise tool outcome");
        Failure::internal("failed to serialise result")
    })?;

    let content = to_result_value(&[ToolContent::Text { text }])?;
    if let Value::Object(map) = &mut value {
        map.insert("content".to_string(), content);
    }
    Ok(value)
}

fn to_result_value(result: &impl Serialize) -> Result<Value, Failure> {
    serde_json::to_value(result).map_err(|e| {
        tracing::error!(error = %e, "Failed to serialise result");
        Failure::internal("failed to serialise result")
    })
}

/// Runs `f`, converting a panic into [`Failure::Internal`].
fn guarded<F>(method: &str, f: F) -> Result<Value, Failure>
where
    F: FnOnce() -> Result<Value, Failure>,
{
    panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| {
        let detail = panic_message(payload.as_ref());
        tracing::error!(method, panic = %detail, "Handler panicked");
        Err(Failure::internal(detail))
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "handler panicked".to_string()
    }
}
