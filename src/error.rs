//! Error types for mathviz-mcp.
//!
//! These are startup-time errors. Anything that goes wrong while serving a
//! request is a [`crate::mcp::Failure`] and is reported to the caller
//! instead.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("failed to read configuration file: {path}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration file could not be parsed.
    #[error("failed to parse configuration file: {path}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Configuration file not found.
    #[error("configuration file not found: {path}")]
    NotFound {
        /// Path where the configuration file was expected.
        path: PathBuf,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation failure.
        message: String,
    },
}

/// Errors raised while populating the tool and resource registries.
///
/// These are fatal: the process must not start serving with a registry that
/// failed to build.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    /// A tool with the same name is already registered.
    #[error("duplicate tool registration: {name}")]
    DuplicateTool {
        /// The conflicting tool name.
        name: String,
    },

    /// A resource with the same URI is already registered.
    #[error("duplicate resource registration: {uri}")]
    DuplicateResource {
        /// The conflicting resource URI.
        uri: String,
    },

    /// A descriptor is structurally unusable.
    #[error("malformed descriptor '{key}': {reason}")]
    MalformedDescriptor {
        /// Tool name or resource URI of the descriptor.
        key: String,
        /// What is wrong with it.
        reason: String,
    },
}
