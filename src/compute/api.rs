use crate::compute::client::ComputeError;
use crate::compute::model::{
    Cursor, List, NetworkInterface, NetworkInterfaceSecurityGroupUpdate, SecurityGroup, Server,
};
use async_trait::async_trait;

/// Compute operations the provider relies on.
///
/// [`FlowClient`](crate::compute::client::FlowClient) implements this against
/// the REST API; tests substitute an in-memory fake.
#[async_trait]
pub trait ComputeApi: Send + Sync {
    async fn get_server(&self, server_id: i64) -> Result<Server, ComputeError>;

    async fn list_network_interfaces(
        &self,
        server_id: i64,
        cursor: Cursor,
    ) -> Result<List<NetworkInterface>, ComputeError>;

    async fn update_network_interface_security_groups(
        &self,
        server_id: i64,
        network_interface_id: i64,
        update: NetworkInterfaceSecurityGroupUpdate,
    ) -> Result<NetworkInterface, ComputeError>;

    async fn list_security_groups(
        &self,
        cursor: Cursor,
    ) -> Result<List<SecurityGroup>, ComputeError>;
}
