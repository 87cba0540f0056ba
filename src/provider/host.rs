use crate::compute::api::ComputeApi;
use crate::provider::diagnostics::{Diagnostic, Diagnostics};
use crate::provider::resource::{Resource, ResourceError};
use crate::provider::schema::Schema;
use crate::provider::security_group_attachment::SecurityGroupAttachment;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info};

/// Registry of resource types and the entry point for every lifecycle call.
///
/// Configuration is validated against the resource schema before it reaches
/// the resource. Failures come back as [`Diagnostics`]; the caller keeps
/// whatever state it held before the call.
pub struct FlowProvider {
    resources: BTreeMap<&'static str, Arc<dyn Resource>>,
}

impl FlowProvider {
    pub fn new(client: Arc<dyn ComputeApi>) -> Self {
        let mut provider = Self {
            resources: BTreeMap::new(),
        };
        provider.register(Arc::new(SecurityGroupAttachment::new(client)));
        provider
    }

    pub fn register(&mut self, resource: Arc<dyn Resource>) {
        self.resources.insert(resource.type_name(), resource);
    }

    pub fn resource_types(&self) -> Vec<&'static str> {
        self.resources.keys().copied().collect()
    }

    pub fn schema(&self, resource_type: &str) -> Result<Schema, Diagnostics> {
        Ok(self.resource(resource_type)?.schema())
    }

    pub fn validate_resource_config(&self, resource_type: &str, config: &Value) -> Diagnostics {
        match self.resource(resource_type) {
            Ok(resource) => resource.schema().validate(config),
            Err(diags) => diags,
        }
    }

    pub async fn create(&self, resource_type: &str, config: Value) -> Result<Value, Diagnostics> {
        let resource = self.resource(resource_type)?;
        self.check_config(resource.as_ref(), &config)?;
        info!("Create {}", resource_type);
        resource
            .create(config)
            .await
            .map_err(|e| report(resource_type, "create", e))
    }

    pub async fn read(&self, resource_type: &str, state: Value) -> Result<Value, Diagnostics> {
        let resource = self.resource(resource_type)?;
        info!("Read {}", resource_type);
        resource
            .read(state)
            .await
            .map_err(|e| report(resource_type, "read", e))
    }

    pub async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        config: Value,
    ) -> Result<Value, Diagnostics> {
        let resource = self.resource(resource_type)?;
        self.check_config(resource.as_ref(), &config)?;
        info!("Update {}", resource_type);
        resource
            .update(prior_state, config)
            .await
            .map_err(|e| report(resource_type, "update", e))
    }

    pub async fn delete(&self, resource_type: &str, state: Value) -> Result<(), Diagnostics> {
        let resource = self.resource(resource_type)?;
        info!("Delete {}", resource_type);
        resource
            .delete(state)
            .await
            .map_err(|e| report(resource_type, "delete", e))
    }

    /// Import an existing attachment by id and refresh it from the API
    pub async fn import(&self, resource_type: &str, id: &str) -> Result<Value, Diagnostics> {
        let resource = self.resource(resource_type)?;
        info!("Import {} with id {}", resource_type, id);
        let seed = resource
            .import_state(id)
            .map_err(|e| report(resource_type, "import", e))?;
        resource
            .read(seed)
            .await
            .map_err(|e| report(resource_type, "import", e))
    }

    fn resource(&self, resource_type: &str) -> Result<&Arc<dyn Resource>, Diagnostics> {
        self.resources.get(resource_type).ok_or_else(|| {
            Diagnostic::from(ResourceError::UnknownResourceType(
                resource_type.to_string(),
            ))
            .into()
        })
    }

    fn check_config(&self, resource: &dyn Resource, config: &Value) -> Result<(), Diagnostics> {
        let diags = resource.schema().validate(config);
        if diags.has_error() {
            error!("Invalid configuration for {}: {}", resource.type_name(), diags);
            return Err(diags);
        }
        Ok(())
    }
}

fn report(resource_type: &str, operation: &str, err: ResourceError) -> Diagnostics {
    error!("Failed to {} {}: {}", operation, resource_type, err);
    Diagnostic::from(err).into()
}
