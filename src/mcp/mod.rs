//! Model Context Protocol (MCP) engine.
//!
//! This module performs the MCP handshake, frames and correlates JSON-RPC
//! 2.0 messages, and routes `tools/*` and `resources/*` requests to the
//! registries. It knows nothing about what a tool computes.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          McpServer                           │
//! │                                                              │
//! │   ┌─────────────┐    ┌─────────────┐    ┌────────────────┐   │
//! │   │  Transport  │───▶│ Dispatcher  │───▶│   Registries   │   │
//! │   │ (stdio/tcp) │    │ + Session   │    │ (tools, rsrc)  │   │
//! │   └─────────────┘    └─────────────┘    └────────────────┘   │
//! │          │                  │                   │            │
//! │          ▼                  ▼                   ▼            │
//! │   ┌──────────────────────────────────────────────────────┐   │
//! │   │        JSON-RPC messages  /  Failure → error         │   │
//! │   └──────────────────────────────────────────────────────┘   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Protocol Version
//!
//! The server prefers MCP protocol version 2024-11-05 and echoes any other
//! version it supports.

pub mod dispatcher;
pub mod errors;
pub mod protocol;
pub mod registry;
pub mod resources;
pub mod schema;
pub mod server;
pub mod session;
pub mod transport;

pub use dispatcher::Dispatcher;
pub use errors::Failure;
pub use protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, MCP_PROTOCOL_VERSION};
pub use registry::{ToolDescriptor, ToolError, ToolOutcome, ToolRegistry};
pub use resources::{ResourceDescriptor, ResourceRegistry};
pub use server::McpServer;
pub use session::Session;
pub use transport::{StdioTransport, Transport};
