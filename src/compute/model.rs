use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Location {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub city: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Server {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub status: Option<Value>,
    // Catch unknown fields to avoid parsing failures
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SecurityGroup {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub default: bool,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NetworkInterface {
    pub id: i64,
    #[serde(default)]
    pub private_ip: String,
    #[serde(default)]
    pub mac_address: String,
    #[serde(default)]
    pub security_groups: Vec<SecurityGroup>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl NetworkInterface {
    /// Identifiers of the attached security groups, in the order the API reports them
    pub fn security_group_ids(&self) -> Vec<i64> {
        self.security_groups.iter().map(|group| group.id).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct NetworkInterfaceSecurityGroupUpdate {
    pub security_group_ids: Vec<i64>,
}

/// Query options for list endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub no_filter: bool,
}

impl Cursor {
    /// Request every entry regardless of the API's default filtering
    pub fn unfiltered() -> Self {
        Self { no_filter: true }
    }

    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if self.no_filter {
            params.push(("no_filter", "1".to_string()));
        }
        params
    }
}

/// A single page returned by a list endpoint
#[derive(Debug, Clone, Default)]
pub struct List<T> {
    pub items: Vec<T>,
}

impl<T> List<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }
}
