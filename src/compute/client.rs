use crate::compute::api::ComputeApi;
use crate::compute::model::{
    Cursor, List, NetworkInterface, NetworkInterfaceSecurityGroupUpdate, SecurityGroup, Server,
};
use crate::config::ApiConfig;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, warn};

const AUTH_HEADER: &str = "X-Auth-Token";

#[derive(Error, Debug, Clone)]
pub enum ComputeError {
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    #[error("JSON parsing failed: {0}")]
    JsonError(String),

    #[error("Authentication failed. Check that the API token is set and still valid.")]
    Unauthorized,

    #[error("{resource} not found")]
    NotFound { resource: String },

    #[error("Rate limit exceeded. Please wait before making additional requests.")]
    RateLimited,

    #[error("API returned {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),
}

impl From<reqwest::Error> for ComputeError {
    fn from(error: reqwest::Error) -> Self {
        ComputeError::HttpError(error.to_string())
    }
}

impl From<serde_json::Error> for ComputeError {
    fn from(error: serde_json::Error) -> Self {
        ComputeError::JsonError(error.to_string())
    }
}

/// Map a non-success status onto a [`ComputeError`], pulling the message out
/// of the error body when the API sent one.
pub fn error_for_status(status: StatusCode, body: &str, resource: &str) -> ComputeError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ComputeError::Unauthorized,
        StatusCode::NOT_FOUND => ComputeError::NotFound {
            resource: resource.to_string(),
        },
        StatusCode::TOO_MANY_REQUESTS => ComputeError::RateLimited,
        _ => ComputeError::ApiError {
            status: status.as_u16(),
            message: extract_error_message(body).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("unexpected response")
                    .to_string()
            }),
        },
    }
}

fn extract_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let error = value.get("error").unwrap_or(&value);
    error
        .get("message")
        .and_then(|m| m.as_str())
        .or_else(|| error.as_str())
        .map(|m| m.to_string())
}

/// REST client for the Flow compute API
#[derive(Clone)]
pub struct FlowClient {
    client: Client,
    base_url: String,
}

impl FlowClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ComputeError> {
        let mut headers = HeaderMap::new();
        if !config.token.is_empty() {
            let mut token = HeaderValue::from_str(&config.token)
                .map_err(|e| ComputeError::InvalidConfig(format!("API token: {}", e)))?;
            token.set_sensitive(true);
            headers.insert(AUTH_HEADER, token);
        }

        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        resource: &str,
    ) -> Result<T, ComputeError> {
        let response = request.send().await?;
        let status = response.status();
        debug!("{} response status: {}", resource, status);

        let response_text = response.text().await?;

        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!("Rate limit exceeded while requesting {}", resource);
        }
        if !status.is_success() {
            error!("HTTP error {} for {} request", status, resource);
            return Err(error_for_status(status, &response_text, resource));
        }

        debug!(
            "{} response (first 1000 chars): {}",
            resource,
            &response_text.chars().take(1000).collect::<String>()
        );

        serde_json::from_str::<T>(&response_text).map_err(|e| {
            error!("Failed to deserialize {} response: {}", resource, e);
            ComputeError::JsonError(format!("Failed to parse {} response: {}", resource, e))
        })
    }
}

#[async_trait]
impl ComputeApi for FlowClient {
    async fn get_server(&self, server_id: i64) -> Result<Server, ComputeError> {
        let url = self.url(&format!("v4/compute/instances/{}", server_id));
        debug!("Fetching server {} at URL: {}", server_id, url);

        self.send(self.client.get(&url), &format!("Server {}", server_id))
            .await
    }

    async fn list_network_interfaces(
        &self,
        server_id: i64,
        cursor: Cursor,
    ) -> Result<List<NetworkInterface>, ComputeError> {
        let url = self.url(&format!(
            "v4/compute/instances/{}/network-interfaces",
            server_id
        ));
        debug!("Listing network interfaces of server {} at URL: {}", server_id, url);

        let items: Vec<NetworkInterface> = self
            .send(
                self.client.get(&url).query(&cursor.query()),
                &format!("Network interfaces of server {}", server_id),
            )
            .await?;
        debug!("Found {} network interfaces", items.len());
        Ok(List::new(items))
    }

    async fn update_network_interface_security_groups(
        &self,
        server_id: i64,
        network_interface_id: i64,
        update: NetworkInterfaceSecurityGroupUpdate,
    ) -> Result<NetworkInterface, ComputeError> {
        let url = self.url(&format!(
            "v4/compute/instances/{}/network-interfaces/{}/security-groups",
            server_id, network_interface_id
        ));
        debug!(
            "Setting security groups {:?} on network interface {} at URL: {}",
            update.security_group_ids, network_interface_id, url
        );

        self.send(
            self.client.patch(&url).json(&update),
            &format!(
                "Network interface {} of server {}",
                network_interface_id, server_id
            ),
        )
        .await
    }

    async fn list_security_groups(
        &self,
        cursor: Cursor,
    ) -> Result<List<SecurityGroup>, ComputeError> {
        let url = self.url("v4/compute/security-groups");
        debug!("Listing security groups at URL: {}", url);

        let items: Vec<SecurityGroup> = self
            .send(
                self.client.get(&url).query(&cursor.query()),
                "Security groups",
            )
            .await?;
        debug!("Found {} security groups", items.len());
        Ok(List::new(items))
    }
}
