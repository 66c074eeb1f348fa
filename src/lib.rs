//! mathviz-mcp: MCP server for mathematics and visualisation tools
//!
//! This library exposes a fixed catalogue of computational tools and static
//! educational resources to MCP clients over newline-delimited JSON-RPC.
//!
//! # Architecture
//!
//! The protocol engine is independent of the tools it serves:
//!
//! - **Engine**: handshake, framing, dispatch and the error taxonomy
//! - **Providers**: register tools and resources into the registries once
//!   at startup
//! - **Tool bodies**: stateless computations returning a result, an
//!   explanation and working steps
//!
//! Charts are produced as JSON specifications; rendering is left to the
//! client.
//!
//! # Modules
//!
//! - [`config`]: Configuration loading and validation
//! - [`error`]: Startup error types
//! - [`mcp`]: MCP protocol engine
//! - [`math`]: Arithmetic, algebra, geometry and friends
//! - [`viz`]: Chart specifications
//! - [`providers`]: Tool and resource registration

pub mod config;
pub mod error;
pub mod math;
pub mod mcp;
pub mod providers;
pub mod viz;
