mod common;

use common::{Call, MockCompute, Op};
use serde_json::json;
use std::sync::Arc;
use tfflow::compute::ComputeError;
use tfflow::config::Config;
use tfflow::provider::security_group_attachment::TYPE_NAME;
use tfflow::provider::{FlowProvider, Severity};
use tfflow::TfFlow;

fn setup() -> (Arc<MockCompute>, FlowProvider) {
    let mock = Arc::new(MockCompute::fixture());
    let provider = FlowProvider::new(mock.clone());
    (mock, provider)
}

#[test]
fn test_registered_resource_types() {
    let (_mock, provider) = setup();
    assert_eq!(provider.resource_types(), vec![TYPE_NAME]);

    let schema = provider.schema(TYPE_NAME).unwrap();
    let names: Vec<&str> = schema.attributes.keys().map(|k| k.as_str()).collect();
    assert_eq!(
        names,
        vec!["network_interface_id", "security_group_ids", "server_id"]
    );
}

#[test]
fn test_unknown_resource_type() {
    let (_mock, provider) = setup();
    let diags = provider.schema("flow_compute_instance").unwrap_err();
    assert!(diags.has_error());
    assert_eq!(
        diags.to_string(),
        "[error] Config Error: Unknown resource type 'flow_compute_instance'"
    );
}

// Mirrors the basic acceptance fixture: an empty group list against an API
// that reports no membership after the update.
#[tokio::test]
async fn test_create_basic_fixture() {
    let (mock, provider) = setup();
    mock.report_empty_membership();

    let state = provider
        .create(
            TYPE_NAME,
            json!({
                "server_id": 1,
                "network_interface_id": 1,
                "security_group_ids": []
            }),
        )
        .await
        .unwrap();

    assert_eq!(
        state,
        json!({
            "server_id": 1,
            "network_interface_id": 1,
            "security_group_ids": []
        })
    );
}

#[tokio::test]
async fn test_create_invalid_config_makes_no_calls() {
    let (mock, provider) = setup();

    let diags = provider
        .create(
            TYPE_NAME,
            json!({"server_id": "1", "security_group_ids": [1]}),
        )
        .await
        .unwrap_err();

    assert_eq!(diags.len(), 2);
    assert!(diags.iter().all(|d| d.summary == "Config Error"));
    assert!(mock.calls().is_empty());
}

#[tokio::test]
async fn test_create_client_failure_diagnostic() {
    let (mock, provider) = setup();
    mock.fail(Op::UpdateSecurityGroups, ComputeError::Unauthorized);

    let diags = provider
        .create(
            TYPE_NAME,
            json!({"server_id": 1, "network_interface_id": 1, "security_group_ids": [11]}),
        )
        .await
        .unwrap_err();

    let diag = diags.iter().next().unwrap();
    assert_eq!(diag.severity, Severity::Error);
    assert_eq!(diag.summary, "Client Error");
    assert!(diag.detail.starts_with("Unable to update security groups:"));
}

#[tokio::test]
async fn test_read_not_found_keeps_prior_state() {
    let (_mock, provider) = setup();
    let prior = json!({"server_id": 2, "network_interface_id": 1, "security_group_ids": [21]});

    let diags = provider.read(TYPE_NAME, prior.clone()).await.unwrap_err();

    assert_eq!(
        diags.to_string(),
        "[error] Config Error: specified network interface does not exist on server"
    );
    assert_eq!(
        prior,
        json!({"server_id": 2, "network_interface_id": 1, "security_group_ids": [21]})
    );
}

#[tokio::test]
async fn test_read_rejects_malformed_state() {
    let (mock, provider) = setup();

    let diags = provider
        .read(TYPE_NAME, json!({"server_id": 1}))
        .await
        .unwrap_err();

    assert!(diags.to_string().contains("Invalid resource data"));
    assert!(mock.calls().is_empty());
}

#[tokio::test]
async fn test_update_moves_attachment_between_servers() {
    let (mock, provider) = setup();

    let state = provider
        .update(
            TYPE_NAME,
            json!({"server_id": 1, "network_interface_id": 1, "security_group_ids": [11]}),
            json!({"server_id": 2, "network_interface_id": 3, "security_group_ids": []}),
        )
        .await
        .unwrap();

    assert_eq!(
        state,
        json!({"server_id": 2, "network_interface_id": 3, "security_group_ids": [20]})
    );
    assert_eq!(mock.membership(1, 1), Some(vec![10]));
    assert_eq!(mock.calls()[0], Call::GetServer(1));
}

#[tokio::test]
async fn test_delete_then_read_shows_default_group() {
    let (_mock, provider) = setup();
    let state = json!({"server_id": 1, "network_interface_id": 1, "security_group_ids": [11]});

    provider.delete(TYPE_NAME, state.clone()).await.unwrap();
    let refreshed = provider.read(TYPE_NAME, state).await.unwrap();

    assert_eq!(refreshed["security_group_ids"], json!([10]));
}

#[tokio::test]
async fn test_import_reads_live_state() {
    let (mock, provider) = setup();

    let state = provider.import(TYPE_NAME, "2/3").await.unwrap();

    assert_eq!(
        state,
        json!({"server_id": 2, "network_interface_id": 3, "security_group_ids": [21]})
    );
    assert_eq!(mock.calls(), vec![Call::ListInterfaces(2)]);
}

#[tokio::test]
async fn test_import_invalid_id() {
    let (mock, provider) = setup();

    for id in ["3", "a/b", "1/", "/2", "-1/-2", "0/3"] {
        let diags = provider.import(TYPE_NAME, id).await.unwrap_err();
        assert_eq!(
            diags.to_string(),
            format!("[error] Config Error: Invalid import id '{}'", id)
        );
    }
    assert!(mock.calls().is_empty());
}

#[tokio::test]
async fn test_tfflow_with_client() {
    let mock = Arc::new(MockCompute::fixture());
    let tfflow = TfFlow::with_client(Config::default(), mock.clone());

    let state = tfflow
        .provider()
        .create(
            TYPE_NAME,
            json!({"server_id": 1, "network_interface_id": 2, "security_group_ids": [12]}),
        )
        .await
        .unwrap();

    assert_eq!(state["security_group_ids"], json!([12]));
    assert_eq!(tfflow.config().api.base_url, "https://api.flow.swiss/");
}

#[test]
fn test_validate_resource_config() {
    let (_mock, provider) = setup();

    let ok = provider.validate_resource_config(
        TYPE_NAME,
        &json!({"server_id": 1, "network_interface_id": 1, "security_group_ids": []}),
    );
    assert!(ok.is_empty());

    let bad = provider.validate_resource_config(
        TYPE_NAME,
        &json!({"server_id": 1, "network_interface_id": 1, "security_group_ids": null}),
    );
    assert_eq!(
        bad.to_string(),
        "[error] Config Error: missing required attribute \"security_group_ids\""
    );
}
