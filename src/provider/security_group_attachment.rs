//! `flow_compute_security_group_attachment`: the security groups attached to
//! one network interface of a compute instance.
//!
//! The resource never owns the network interface itself. Dropping the
//! attachment, or configuring an empty group list, puts the interface back on
//! the default security group of the server's location.

use crate::compute::api::ComputeApi;
use crate::compute::client::ComputeError;
use crate::compute::model::{
    Cursor, Location, NetworkInterface, NetworkInterfaceSecurityGroupUpdate, SecurityGroup,
};
use crate::provider::resource::{Resource, ResourceError};
use crate::provider::schema::{Attribute, AttributeType, Schema};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

pub const TYPE_NAME: &str = "flow_compute_security_group_attachment";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SecurityGroupAttachmentData {
    pub server_id: i64,
    pub network_interface_id: i64,
    pub security_group_ids: Vec<i64>,
}

impl SecurityGroupAttachmentData {
    pub fn from_entity(server_id: i64, nic: &NetworkInterface) -> Self {
        Self {
            server_id,
            network_interface_id: nic.id,
            security_group_ids: nic.security_group_ids(),
        }
    }

    fn update_request(&self) -> NetworkInterfaceSecurityGroupUpdate {
        NetworkInterfaceSecurityGroupUpdate {
            security_group_ids: self.security_group_ids.clone(),
        }
    }
}

pub fn attachment_schema() -> Schema {
    Schema::v0()
        .with_description("Attaches security groups to the network interface of a compute instance")
        .with_attribute(
            "server_id",
            Attribute::required(AttributeType::Int64)
                .with_description("identifier of the instance"),
        )
        .with_attribute(
            "network_interface_id",
            Attribute::required(AttributeType::Int64)
                .with_description("identifier of the network interface of the given instance"),
        )
        .with_attribute(
            "security_group_ids",
            Attribute::required(AttributeType::list_of(AttributeType::Int64))
                .with_description("security groups to attach to the instances network interface"),
        )
}

pub struct SecurityGroupAttachment {
    client: Arc<dyn ComputeApi>,
}

impl SecurityGroupAttachment {
    pub fn new(client: Arc<dyn ComputeApi>) -> Self {
        Self { client }
    }

    pub async fn create_attachment(
        &self,
        config: &SecurityGroupAttachmentData,
    ) -> Result<SecurityGroupAttachmentData, ResourceError> {
        info!(
            "Creating security group attachment for interface {} on server {}",
            config.network_interface_id, config.server_id
        );

        if config.security_group_ids.is_empty() {
            remove_security_groups(
                self.client.as_ref(),
                config.server_id,
                config.network_interface_id,
            )
            .await
            .map_err(|e| ResourceError::client("remove security groups", e))?;
        }

        let nic = self
            .client
            .update_network_interface_security_groups(
                config.server_id,
                config.network_interface_id,
                config.update_request(),
            )
            .await
            .map_err(|e| ResourceError::client("update security groups", e))?;

        Ok(SecurityGroupAttachmentData::from_entity(
            config.server_id,
            &nic,
        ))
    }

    pub async fn read_attachment(
        &self,
        state: &SecurityGroupAttachmentData,
    ) -> Result<SecurityGroupAttachmentData, ResourceError> {
        debug!(
            "Reading security groups of interface {} on server {}",
            state.network_interface_id, state.server_id
        );

        let interfaces = self
            .client
            .list_network_interfaces(state.server_id, Cursor::unfiltered())
            .await
            .map_err(|e| ResourceError::client("list network interfaces", e))?;

        interfaces
            .items
            .iter()
            .find(|nic| nic.id == state.network_interface_id)
            .map(|nic| SecurityGroupAttachmentData::from_entity(state.server_id, nic))
            .ok_or_else(|| {
                ResourceError::Config(
                    "specified network interface does not exist on server".to_string(),
                )
            })
    }

    pub async fn update_attachment(
        &self,
        state: &SecurityGroupAttachmentData,
        config: &SecurityGroupAttachmentData,
    ) -> Result<SecurityGroupAttachmentData, ResourceError> {
        info!(
            "Updating security group attachment for interface {} on server {}",
            config.network_interface_id, config.server_id
        );

        // detach from the previous server by falling back to its default group
        if state.server_id != config.server_id {
            info!(
                "Server changed from {} to {}, resetting interface {} on the old server",
                state.server_id, config.server_id, state.network_interface_id
            );
            remove_security_groups(
                self.client.as_ref(),
                state.server_id,
                state.network_interface_id,
            )
            .await
            .map_err(|e| ResourceError::client("remove security groups", e))?;
        }

        if config.security_group_ids.is_empty() {
            remove_security_groups(
                self.client.as_ref(),
                config.server_id,
                config.network_interface_id,
            )
            .await
            .map_err(|e| ResourceError::client("remove security groups", e))?;
        }

        let nic = self
            .client
            .update_network_interface_security_groups(
                config.server_id,
                config.network_interface_id,
                config.update_request(),
            )
            .await
            .map_err(|e| ResourceError::client("update security groups", e))?;

        Ok(SecurityGroupAttachmentData::from_entity(
            config.server_id,
            &nic,
        ))
    }

    pub async fn delete_attachment(
        &self,
        state: &SecurityGroupAttachmentData,
    ) -> Result<(), ResourceError> {
        info!(
            "Deleting security group attachment for interface {} on server {}",
            state.network_interface_id, state.server_id
        );

        remove_security_groups(
            self.client.as_ref(),
            state.server_id,
            state.network_interface_id,
        )
        .await
        .map_err(|e| ResourceError::client("remove security groups", e))
    }
}

/// Put the interface back on the default security group of the server's location
pub async fn remove_security_groups(
    client: &dyn ComputeApi,
    server_id: i64,
    network_interface_id: i64,
) -> Result<(), ComputeError> {
    let server = client.get_server(server_id).await?;
    let group = find_default_security_group(client, &server.location).await?;

    debug!(
        "Resetting interface {} on server {} to default security group {}",
        network_interface_id, server_id, group.id
    );
    client
        .update_network_interface_security_groups(
            server_id,
            network_interface_id,
            NetworkInterfaceSecurityGroupUpdate {
                security_group_ids: vec![group.id],
            },
        )
        .await?;

    Ok(())
}

pub async fn find_default_security_group(
    client: &dyn ComputeApi,
    location: &Location,
) -> Result<SecurityGroup, ComputeError> {
    let groups = client.list_security_groups(Cursor::unfiltered()).await?;

    groups
        .items
        .into_iter()
        .find(|group| group.default && group.location.id == location.id)
        .ok_or_else(|| ComputeError::NotFound {
            resource: "default security group".to_string(),
        })
}

fn decode(value: Value) -> Result<SecurityGroupAttachmentData, ResourceError> {
    Ok(serde_json::from_value(value)?)
}

fn encode(data: &SecurityGroupAttachmentData) -> Result<Value, ResourceError> {
    Ok(serde_json::to_value(data)?)
}

#[async_trait]
impl Resource for SecurityGroupAttachment {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        attachment_schema()
    }

    async fn create(&self, config: Value) -> Result<Value, ResourceError> {
        let config = decode(config)?;
        encode(&self.create_attachment(&config).await?)
    }

    async fn read(&self, state: Value) -> Result<Value, ResourceError> {
        let state = decode(state)?;
        encode(&self.read_attachment(&state).await?)
    }

    async fn update(&self, prior_state: Value, config: Value) -> Result<Value, ResourceError> {
        let state = decode(prior_state)?;
        let config = decode(config)?;
        encode(&self.update_attachment(&state, &config).await?)
    }

    async fn delete(&self, state: Value) -> Result<(), ResourceError> {
        let state = decode(state)?;
        self.delete_attachment(&state).await
    }

    fn import_state(&self, id: &str) -> Result<Value, ResourceError> {
        let invalid = || ResourceError::InvalidImportId(id.to_string());
        let (server, nic) = id.split_once('/').ok_or_else(invalid)?;
        let parse_id = |raw: &str| match raw.trim().parse::<i64>() {
            Ok(id) if id > 0 => Ok(id),
            _ => Err(invalid()),
        };
        let server_id = parse_id(server)?;
        let network_interface_id = parse_id(nic)?;

        encode(&SecurityGroupAttachmentData {
            server_id,
            network_interface_id,
            security_group_ids: Vec::new(),
        })
    }
}
