use crate::compute::client::ComputeError;
use crate::provider::diagnostics::Diagnostic;
use crate::provider::schema::Schema;
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ResourceError {
    /// A compute API call failed; `action` reads like "remove security groups"
    #[error("Unable to {action}: {source}")]
    Client {
        action: String,
        #[source]
        source: ComputeError,
    },

    #[error("{0}")]
    Config(String),

    #[error("Invalid resource data: {0}")]
    Decode(String),

    #[error("Unknown resource type '{0}'")]
    UnknownResourceType(String),

    #[error("Invalid import id '{0}'")]
    InvalidImportId(String),
}

impl ResourceError {
    pub fn client(action: impl Into<String>, source: ComputeError) -> Self {
        ResourceError::Client {
            action: action.into(),
            source,
        }
    }

    /// Diagnostic summary used when reporting this error
    pub fn summary(&self) -> &'static str {
        match self {
            ResourceError::Client { .. } => "Client Error",
            _ => "Config Error",
        }
    }
}

impl From<serde_json::Error> for ResourceError {
    fn from(error: serde_json::Error) -> Self {
        ResourceError::Decode(error.to_string())
    }
}

impl From<ResourceError> for Diagnostic {
    fn from(error: ResourceError) -> Self {
        Diagnostic::error(error.summary(), error.to_string())
    }
}

/// Lifecycle of one managed resource type.
///
/// Configuration and state cross this boundary as JSON objects matching
/// [`Resource::schema`]; implementations decode them into their own data type.
#[async_trait]
pub trait Resource: Send + Sync {
    /// Type name the host registers this resource under
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> Schema;

    async fn create(&self, config: Value) -> Result<Value, ResourceError>;

    async fn read(&self, state: Value) -> Result<Value, ResourceError>;

    async fn update(&self, prior_state: Value, config: Value) -> Result<Value, ResourceError>;

    async fn delete(&self, state: Value) -> Result<(), ResourceError>;

    /// Turn an import id into a seed state that `read` can refresh
    fn import_state(&self, id: &str) -> Result<Value, ResourceError>;
}
