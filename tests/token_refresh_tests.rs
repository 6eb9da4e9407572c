//! Integration tests for bearer token acquisition through the connector.

use std::sync::Arc;
use std::time::Duration;

use dynamics_connector::{
    ApplicationId, ApplicationSecret, AuthError, BaseUrl, ConnectionSettings, ConnectorConfig,
    ConnectorError, DynamicsConnector, TenantId,
};
use serde_json::{json, Value};
use uuid::Uuid;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_config(server: &MockServer) -> ConnectorConfig {
    ConnectorConfig::builder()
        .base_url(BaseUrl::new(server.uri()).unwrap())
        .tenant_id(TenantId::new("tenant").unwrap())
        .application_id(ApplicationId::new("app").unwrap())
        .application_secret(ApplicationSecret::new("secret").unwrap())
        .authority_host(server.uri())
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_token_is_acquired_once_for_many_requests() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/tenant/oauth2/v2.0/token"))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token_type": "Bearer",
            "expires_in": 3599,
            "access_token": "long-lived"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/data/v9.2/WhoAmI"))
        .and(header("Authorization", "Bearer long-lived"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"UserId": Uuid::nil()})))
        .expect(3)
        .mount(&server)
        .await;

    let connector = DynamicsConnector::new(&create_config(&server)).unwrap();
    for _ in 0..3 {
        let _: Value = connector.get("WhoAmI").await.unwrap();
    }
}

#[tokio::test]
async fn test_concurrent_first_requests_share_one_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/tenant/oauth2/v2.0/token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"expires_in": 3599, "access_token": "shared"}))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/data/v9.2/WhoAmI"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(5)
        .mount(&server)
        .await;

    let connector = Arc::new(DynamicsConnector::new(&create_config(&server)).unwrap());
    let handles: Vec<_> = (0..5)
        .map(|_| {
            let connector = Arc::clone(&connector);
            tokio::spawn(async move { connector.get::<Value>("WhoAmI").await })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }
}

#[tokio::test]
async fn test_short_lived_token_is_refreshed_before_next_request() {
    let server = MockServer::start().await;

    // Expires within the safety margin, so every request needs a new one.
    Mock::given(method("POST"))
        .and(path("/tenant/oauth2/v2.0/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "expires_in": 1,
            "access_token": "short-lived"
        })))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/data/v9.2/WhoAmI"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(2)
        .mount(&server)
        .await;

    let connector = DynamicsConnector::new(&create_config(&server)).unwrap();
    let _: Value = connector.get("WhoAmI").await.unwrap();
    let _: Value = connector.get("WhoAmI").await.unwrap();
}

#[tokio::test]
async fn test_auth_failure_blocks_the_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/tenant/oauth2/v2.0/token"))
        .respond_with(
            ResponseTemplate::new(401).set_body_string(
                r#"{"error":"invalid_client","error_description":"AADSTS7000215"}"#,
            ),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let connector = DynamicsConnector::new(&create_config(&server)).unwrap();
    let result = connector.delete("account", Uuid::new_v4()).await;

    match result {
        Err(ConnectorError::Auth(AuthError::ClientCredentialsFailed { status, message })) => {
            assert_eq!(status, 401);
            assert!(message.contains("invalid_client"));
        }
        other => panic!("Expected Auth error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_connector_from_connection_settings() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/tenant/oauth2/v2.0/token"))
        .and(body_string_contains("client_id=app"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "expires_in": 3599,
            "access_token": "from-settings"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/data/v9.2/people"))
        .and(header("Authorization", "Bearer from-settings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": []})))
        .expect(1)
        .mount(&server)
        .await;

    let settings: ConnectionSettings = serde_json::from_value(json!({
        "CrmUrl": server.uri(),
        "TenantId": "tenant",
        "ApplicationId": "app",
        "ApplicationSecret": "secret",
        "CustomTablePluralMapping": {"person": "people"}
    }))
    .unwrap();

    let config = ConnectorConfig::builder()
        .base_url(BaseUrl::new(&settings.crm_url).unwrap())
        .tenant_id(TenantId::new(&settings.tenant_id).unwrap())
        .application_id(ApplicationId::new(&settings.application_id).unwrap())
        .application_secret(ApplicationSecret::new(&settings.application_secret).unwrap())
        .plural_overrides(settings.custom_table_plural_mapping.clone())
        .authority_host(server.uri())
        .build()
        .unwrap();

    let connector = DynamicsConnector::new(&config).unwrap();
    let people: Vec<Value> = connector.retrieve_all("person", "", 10).await.unwrap();
    assert!(people.is_empty());
}
