//! Session lifecycle and capability negotiation.
//!
//! A session moves `Unstarted → AwaitingInitialized → Ready` and never moves
//! back. Only [`Session::initialize`] and [`Session::initialized`] change the
//! state; everything else just asks [`Session::require_ready`].

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::mcp::errors::Failure;
use crate::mcp::protocol::{MCP_PROTOCOL_VERSION, SERVER_NAME, SUPPORTED_PROTOCOL_VERSIONS};

/// Short description sent in `serverInfo`.
pub const SERVER_DESCRIPTION: &str =
    "Mathematical computation and data visualization tools over the Model Context Protocol";

/// Where a session is in the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for `initialize`.
    Unstarted,
    /// `initialize` answered, waiting for `initialized`.
    AwaitingInitialized,
    /// Handshake complete. Terminal.
    Ready,
}

/// Server capabilities advertised during initialisation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerCapabilities {
    /// Tool-related capabilities.
    pub tools: ToolCapabilities,
    /// Resource-related capabilities, absent when no resources are served.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourceCapabilities>,
}

impl ServerCapabilities {
    /// Capabilities for a server that does or does not expose resources.
    #[must_use]
    pub fn new(serves_resources: bool) -> Self {
        Self {
            tools: ToolCapabilities::default(),
            resources: serves_resources.then(ResourceCapabilities::default),
        }
    }
}

/// Tool-specific capabilities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ToolCapabilities {
    /// Whether the tool list can change during the session.
    #[serde(rename = "listChanged")]
    pub list_changed: bool,
}

/// Resource-specific capabilities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceCapabilities {
    pub subscribe: bool,
    pub list_changed: bool,
}

/// Server information for initialisation response.
#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
    /// Server name.
    pub name: String,
    /// Server version.
    pub version: String,
    /// Human-readable summary.
    pub description: String,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            name: SERVER_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            description: SERVER_DESCRIPTION.to_string(),
        }
    }
}

/// Client information received during initialisation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientInfo {
    /// Client name.
    pub name: String,
    /// Client version.
    #[serde(default)]
    pub version: Option<String>,
}

/// Parameters for the initialize request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    /// Protocol version requested by client.
    pub protocol_version: String,
    /// Client capabilities.
    pub capabilities: Map<String, Value>,
    /// Client information.
    #[serde(default)]
    pub client_info: Option<ClientInfo>,
}

/// Result of a successful `initialize`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    pub server_info: ServerInfo,
}

/// Picks the protocol version to answer with.
///
/// A supported version is echoed back; anything else gets the preferred one.
#[must_use]
pub fn negotiate_version(requested: &str) -> &'static str {
    SUPPORTED_PROTOCOL_VERSIONS
        .iter()
        .copied()
        .find(|v| *v == requested)
        .unwrap_or(MCP_PROTOCOL_VERSION)
}

/// Per-connection negotiation state.
#[derive(Debug, Clone)]
pub struct Session {
    state: SessionState,
    protocol_version: Option<String>,
    client_capabilities: BTreeSet<String>,
    client_info: Option<ClientInfo>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// A fresh session awaiting `initialize`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: SessionState::Unstarted,
            protocol_version: None,
            client_capabilities: BTreeSet::new(),
            client_info: None,
        }
    }

    /// A session that skips the handshake.
    ///
    /// Used by stateless callers where each call is its own implicit,
    /// already-negotiated session.
    #[must_use]
    pub fn pre_negotiated() -> Self {
        Self {
            state: SessionState::Ready,
            protocol_version: Some(MCP_PROTOCOL_VERSION.to_string()),
            client_capabilities: BTreeSet::new(),
            client_info: None,
        }
    }

    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Whether tool and resource calls are accepted.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state == SessionState::Ready
    }

    #[must_use]
    pub fn protocol_version(&self) -> Option<&str> {
        self.protocol_version.as_deref()
    }

    /// Capability names the client declared.
    #[must_use]
    pub const fn client_capabilities(&self) -> &BTreeSet<String> {
        &self.client_capabilities
    }

    #[must_use]
    pub const fn client_info(&self) -> Option<&ClientInfo> {
        self.client_info.as_ref()
    }

    /// Handles `initialize`.
    ///
    /// # Errors
    ///
    /// [`Failure::InvalidRequest`] if the session is past `Unstarted`, or
    /// [`Failure::InvalidParams`] if the params lack a protocol version or a
    /// capabilities object. The state is unchanged on error.
    pub fn initialize(
        &mut self,
        params: Option<&Value>,
        capabilities: ServerCapabilities,
    ) -> Result<InitializeResult, Failure> {
        if self.state != SessionState::Unstarted {
            return Err(Failure::invalid_request("already initialized"));
        }

        let params = params.ok_or_else(|| Failure::invalid_params("Missing initialize params"))?;
        let params = InitializeParams::deserialize(params)
            .map_err(|e| Failure::invalid_params(format!("Invalid initialize params: {e}")))?;

        let version = negotiate_version(&params.protocol_version);
        if version != params.protocol_version {
            tracing::info!(
                requested = %params.protocol_version,
                negotiated = version,
                "Client requested unsupported protocol version"
            );
        }

        if let Some(client) = &params.client_info {
            tracing::info!(client = %client.name, version = ?client.version, "Client connected");
        }

        self.protocol_version = Some(version.to_string());
        self.client_capabilities = params.capabilities.keys().cloned().collect();
        self.client_info = params.client_info;
        self.state = SessionState::AwaitingInitialized;

        Ok(InitializeResult {
            protocol_version: version.to_string(),
            capabilities,
            server_info: ServerInfo::default(),
        })
    }

    /// Handles `initialized`.
    ///
    /// # Errors
    ///
    /// [`Failure::InvalidRequest`] unless the session is awaiting it.
    pub fn initialized(&mut self) -> Result<(), Failure> {
        match self.state {
            SessionState::AwaitingInitialized => {
                self.state = SessionState::Ready;
                tracing::debug!("Session ready");
                Ok(())
            }
            SessionState::Unstarted => Err(Failure::invalid_request("server not initialized")),
            SessionState::Ready => Err(Failure::invalid_request("already initialized")),
        }
    }

    /// Gate for every non-lifecycle method.
    ///
    /// # Errors
    ///
    /// [`Failure::InvalidRequest`] until the handshake has completed.
    pub fn require_ready(&self) -> Result<(), Failure> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(Failure::invalid_request("server not initialized"))
        }
    }
}
