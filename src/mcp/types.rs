//! Input types for RMCP tools with automatic JSON Schema generation.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Security group attachment configuration or state
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AttachmentInput {
    /// Identifier of the instance
    pub server_id: i64,
    /// Identifier of the network interface of the given instance
    pub network_interface_id: i64,
    /// Security groups to attach; empty means the location's default group
    pub security_group_ids: Vec<i64>,
}

/// Input for update operations
#[derive(Debug, Deserialize, JsonSchema)]
pub struct AttachmentUpdateInput {
    /// State recorded by the previous apply
    pub prior_state: AttachmentInput,
    /// New configuration to apply
    pub config: AttachmentInput,
}

/// Input for import operations
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ImportInput {
    /// Import id in the form "<server_id>/<network_interface_id>"
    pub id: String,
}

/// Input for schema lookup
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ResourceTypeInput {
    /// Resource type name (defaults to flow_compute_security_group_attachment)
    pub resource_type: Option<String>,
}
