#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use tfflow::compute::model::NetworkInterfaceSecurityGroupUpdate;
use tfflow::compute::{
    ComputeApi, ComputeError, Cursor, List, Location, NetworkInterface, SecurityGroup, Server,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    GetServer(i64),
    ListInterfaces(i64),
    UpdateSecurityGroups {
        server_id: i64,
        network_interface_id: i64,
        ids: Vec<i64>,
    },
    ListSecurityGroups,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    GetServer,
    ListInterfaces,
    UpdateSecurityGroups,
    ListSecurityGroups,
}

#[derive(Default)]
struct State {
    servers: HashMap<i64, Server>,
    interfaces: HashMap<i64, Vec<NetworkInterface>>,
    groups: Vec<SecurityGroup>,
    calls: Vec<Call>,
    failures: HashMap<Op, ComputeError>,
    report_empty_membership: bool,
}

/// In-memory compute API recording every call it receives
#[derive(Default)]
pub struct MockCompute {
    state: Mutex<State>,
}

pub fn location(id: i64) -> Location {
    Location {
        id,
        name: format!("LOC{}", id),
        ..Default::default()
    }
}

pub fn group(id: i64, location_id: i64, default: bool) -> SecurityGroup {
    SecurityGroup {
        id,
        name: if default {
            "Default".to_string()
        } else {
            format!("group-{}", id)
        },
        location: location(location_id),
        default,
        ..Default::default()
    }
}

impl MockCompute {
    pub fn new() -> Self {
        Self::default()
    }

    /// Two locations with one server each:
    /// - location 1: default group 10, groups 11 and 12; server 1 with
    ///   interfaces 1 (groups [11]) and 2 (no groups)
    /// - location 2: default group 20, group 21; server 2 with interface 3
    ///   (groups [21])
    pub fn fixture() -> Self {
        let mock = Self::new();
        mock.add_group(group(10, 1, true));
        mock.add_group(group(11, 1, false));
        mock.add_group(group(12, 1, false));
        mock.add_group(group(20, 2, true));
        mock.add_group(group(21, 2, false));

        mock.add_server(1, 1);
        mock.add_server(2, 2);
        mock.add_interface(1, 1, &[11]);
        mock.add_interface(1, 2, &[]);
        mock.add_interface(2, 3, &[21]);
        mock
    }

    pub fn add_server(&self, id: i64, location_id: i64) {
        let mut state = self.state.lock().unwrap();
        state.servers.insert(
            id,
            Server {
                id,
                name: format!("server-{}", id),
                location: location(location_id),
                ..Default::default()
            },
        );
        state.interfaces.entry(id).or_default();
    }

    pub fn add_group(&self, group: SecurityGroup) {
        self.state.lock().unwrap().groups.push(group);
    }

    pub fn add_interface(&self, server_id: i64, id: i64, group_ids: &[i64]) {
        let mut state = self.state.lock().unwrap();
        let groups = resolve(&state.groups, group_ids).unwrap();
        state
            .interfaces
            .entry(server_id)
            .or_default()
            .push(NetworkInterface {
                id,
                security_groups: groups,
                ..Default::default()
            });
    }

    pub fn fail(&self, op: Op, error: ComputeError) {
        self.state.lock().unwrap().failures.insert(op, error);
    }

    /// Make update responses report an empty membership, whatever was applied
    pub fn report_empty_membership(&self) {
        self.state.lock().unwrap().report_empty_membership = true;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn updates(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| matches!(call, Call::UpdateSecurityGroups { .. }))
            .collect()
    }

    /// Current membership of an interface as stored by the fake
    pub fn membership(&self, server_id: i64, network_interface_id: i64) -> Option<Vec<i64>> {
        let state = self.state.lock().unwrap();
        state
            .interfaces
            .get(&server_id)?
            .iter()
            .find(|nic| nic.id == network_interface_id)
            .map(|nic| nic.security_group_ids())
    }

    pub fn interface_count(&self, server_id: i64) -> usize {
        self.state
            .lock()
            .unwrap()
            .interfaces
            .get(&server_id)
            .map(|nics| nics.len())
            .unwrap_or(0)
    }

    fn record(&self, call: Call, op: Op) -> Result<(), ComputeError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        match state.failures.get(&op) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

fn resolve(groups: &[SecurityGroup], ids: &[i64]) -> Result<Vec<SecurityGroup>, ComputeError> {
    ids.iter()
        .map(|id| {
            groups
                .iter()
                .find(|group| group.id == *id)
                .cloned()
                .ok_or_else(|| ComputeError::ApiError {
                    status: 422,
                    message: format!("security group {} does not exist", id),
                })
        })
        .collect()
}

#[async_trait]
impl ComputeApi for MockCompute {
    async fn get_server(&self, server_id: i64) -> Result<Server, ComputeError> {
        self.record(Call::GetServer(server_id), Op::GetServer)?;
        let state = self.state.lock().unwrap();
        state
            .servers
            .get(&server_id)
            .cloned()
            .ok_or_else(|| ComputeError::NotFound {
                resource: format!("Server {}", server_id),
            })
    }

    async fn list_network_interfaces(
        &self,
        server_id: i64,
        cursor: Cursor,
    ) -> Result<List<NetworkInterface>, ComputeError> {
        assert!(cursor.no_filter, "interfaces must be listed unfiltered");
        self.record(Call::ListInterfaces(server_id), Op::ListInterfaces)?;
        let state = self.state.lock().unwrap();
        match state.interfaces.get(&server_id) {
            Some(nics) => Ok(List::new(nics.clone())),
            None => Err(ComputeError::NotFound {
                resource: format!("Network interfaces of server {}", server_id),
            }),
        }
    }

    async fn update_network_interface_security_groups(
        &self,
        server_id: i64,
        network_interface_id: i64,
        update: NetworkInterfaceSecurityGroupUpdate,
    ) -> Result<NetworkInterface, ComputeError> {
        self.record(
            Call::UpdateSecurityGroups {
                server_id,
                network_interface_id,
                ids: update.security_group_ids.clone(),
            },
            Op::UpdateSecurityGroups,
        )?;

        let mut state = self.state.lock().unwrap();
        let groups = resolve(&state.groups, &update.security_group_ids)?;
        let report_empty = state.report_empty_membership;
        let nic = state
            .interfaces
            .get_mut(&server_id)
            .and_then(|nics| nics.iter_mut().find(|nic| nic.id == network_interface_id))
            .ok_or_else(|| ComputeError::NotFound {
                resource: format!(
                    "Network interface {} of server {}",
                    network_interface_id, server_id
                ),
            })?;

        // an empty update leaves the membership unchanged
        if !groups.is_empty() {
            nic.security_groups = groups;
        }

        let mut response = nic.clone();
        if report_empty {
            response.security_groups.clear();
        }
        Ok(response)
    }

    async fn list_security_groups(
        &self,
        cursor: Cursor,
    ) -> Result<List<SecurityGroup>, ComputeError> {
        assert!(cursor.no_filter, "security groups must be listed unfiltered");
        self.record(Call::ListSecurityGroups, Op::ListSecurityGroups)?;
        Ok(List::new(self.state.lock().unwrap().groups.clone()))
    }
}
