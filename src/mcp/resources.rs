//! Resource registry: URI → {descriptor, loader}.
//!
//! Resources are read-only content. Nothing is cached: every read calls the
//! loader again, and loaders are expected to be idempotent.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::error::RegistryError;
use crate::mcp::errors::Failure;

/// Describes a resource in `resources/list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDescriptor {
    /// Opaque identifier; not necessarily dereferenceable.
    pub uri: String,
    pub name: String,
    pub description: String,
    pub mime_type: String,
}

impl ResourceDescriptor {
    #[must_use]
    pub fn new(
        uri: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            uri: uri.into(),
            name: name.into(),
            description: description.into(),
            mime_type: mime_type.into(),
        }
    }
}

/// What a loader produces.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourcePayload {
    Text(String),
    Structured(Value),
}

impl ResourcePayload {
    /// Renders the payload as text.
    ///
    /// Structured payloads are pretty-printed; object keys come out sorted,
    /// so equal values always render to identical bytes.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Structured(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
        }
    }
}

/// One content item of a `resources/read` result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceContent {
    pub uri: String,
    pub mime_type: String,
    pub text: String,
}

/// A loader failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to load resource: {0}")]
pub struct ResourceError(pub String);

/// Produces resource content on demand.
pub trait ResourceLoader: Send + Sync {
    /// Loads the content for `uri`.
    ///
    /// # Errors
    ///
    /// Returns a [`ResourceError`] if the content cannot be produced.
    fn load(&self, uri: &str) -> Result<ResourcePayload, ResourceError>;
}

impl<F> ResourceLoader for F
where
    F: Fn(&str) -> Result<ResourcePayload, ResourceError> + Send + Sync,
{
    fn load(&self, uri: &str) -> Result<ResourcePayload, ResourceError> {
        self(uri)
    }
}

/// Loader for content fixed at startup.
#[derive(Debug, Clone)]
pub struct StaticResource(pub ResourcePayload);

impl ResourceLoader for StaticResource {
    fn load(&self, _uri: &str) -> Result<ResourcePayload, ResourceError> {
        Ok(self.0.clone())
    }
}

struct RegisteredResource {
    descriptor: ResourceDescriptor,
    loader: Box<dyn ResourceLoader>,
}

/// Registration-ordered set of resources.
#[derive(Default)]
pub struct ResourceRegistry {
    resources: IndexMap<String, RegisteredResource>,
}

impl ResourceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a resource.
    ///
    /// # Errors
    ///
    /// Fails if the URI is empty or already registered.
    pub fn register(
        &mut self,
        descriptor: ResourceDescriptor,
        loader: impl ResourceLoader + 'static,
    ) -> Result<(), RegistryError> {
        if descriptor.uri.trim().is_empty() {
            return Err(RegistryError::MalformedDescriptor {
                key: descriptor.name,
                reason: "resource URI must not be empty".to_string(),
            });
        }

        if self.resources.contains_key(&descriptor.uri) {
            return Err(RegistryError::DuplicateResource {
                uri: descriptor.uri,
            });
        }

        self.resources.insert(
            descriptor.uri.clone(),
            RegisteredResource {
                descriptor,
                loader: Box::new(loader),
            },
        );
        Ok(())
    }

    /// Lists descriptors in registration order.
    #[must_use]
    pub fn list(&self) -> Vec<&ResourceDescriptor> {
        self.resources.values().map(|r| &r.descriptor).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Loads the content of a registered resource.
    ///
    /// # Errors
    ///
    /// [`Failure::ResourceNotFound`] for an unregistered URI, or
    /// [`Failure::Internal`] if the loader fails.
    pub fn read(&self, uri: &str) -> Result<ResourceContent, Failure> {
        let resource = self
            .resources
            .get(uri)
            .ok_or_else(|| Failure::ResourceNotFound {
                uri: uri.to_string(),
            })?;

        let payload = resource.loader.load(uri).map_err(|err| {
            tracing::error!(uri, error = %err, "Resource loader failed");
            Failure::internal(err.to_string())
        })?;

        Ok(ResourceContent {
            uri: resource.descriptor.uri.clone(),
            mime_type: resource.descriptor.mime_type.clone(),
            text: payload.to_text(),
        })
    }
}

impl fmt::Debug for ResourceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceRegistry")
            .field("resources", &self.resources.keys().collect::<Vec<_>>())
            .finish()
    }
}
