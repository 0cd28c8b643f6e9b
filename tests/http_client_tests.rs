//! HTTP client against a mock backend: payload decoding and error
//! classification.

use std::collections::BTreeMap;

use device_auth::api::{AuthorizationApi, DeviceAuthApi, HttpApiClient};
use device_auth::config::ClientConfig;
use device_auth::error::{is_exchange_error_retryable, ClassifiedError, ErrorKind};
use device_auth::permissions::{
    can_edit_organization, can_view_organization, fetch_organization_permissions,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DEVICE_PATH: &str = "/api/v2/users/oauth2/github/device";
const CALLBACK_PATH: &str = "/api/v2/users/oauth2/github/callback";

fn client(server: &MockServer) -> HttpApiClient {
    HttpApiClient::new(ClientConfig::new(server.uri())).expect("client")
}

#[tokio::test]
async fn request_device_code_decodes_authorization() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(DEVICE_PATH))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "device_code": "device-123",
            "user_code": "ABCD-EFGH",
            "verification_uri": "https://github.com/login/device",
            "expires_in": 900,
            "interval": 5
        })))
        .expect(1)
        .mount(&server)
        .await;

    let device = client(&server).request_device_code().await.expect("device code");

    assert_eq!(device.device_code, "device-123");
    assert_eq!(device.user_code, "ABCD-EFGH");
    assert_eq!(device.verification_uri, "https://github.com/login/device");
    assert_eq!(device.interval, Some(5));
    assert_eq!(device.expires_in, 900);
}

#[tokio::test]
async fn session_token_is_sent_when_configured() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(DEVICE_PATH))
        .and(header("coder-session-token", "session-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "device_code": "device-123",
            "user_code": "ABCD-EFGH",
            "verification_uri": "https://github.com/login/device",
            "expires_in": 900
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = HttpApiClient::new(ClientConfig::new(server.uri()).with_session_token("session-abc"))
        .expect("client");
    let device = api.request_device_code().await.expect("device code");

    assert_eq!(device.interval, None);
}

#[tokio::test]
async fn device_code_server_error_is_unclassifiable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(DEVICE_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "message": "Internal error."
        })))
        .mount(&server)
        .await;

    let error = client(&server).request_device_code().await.unwrap_err();

    assert_eq!(error.status(), Some(500));
    assert_eq!(
        error.payload().and_then(|payload| payload.message.as_deref()),
        Some("Internal error.")
    );
    assert_eq!(error.kind(), ErrorKind::Unclassifiable);
}

#[tokio::test]
async fn exchange_sends_device_code_and_state() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CALLBACK_PATH))
        .and(query_param("device_code", "device-123"))
        .and(query_param("state", "state-xyz"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "redirect_url": "/workspaces"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = client(&server)
        .exchange_device_code("device-123", "state-xyz")
        .await
        .expect("exchange");

    assert_eq!(result.redirect_url, "/workspaces");
}

#[tokio::test]
async fn exchange_pending_is_retryable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CALLBACK_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "message": "Failed to authorize device.",
            "detail": "authorization_pending"
        })))
        .mount(&server)
        .await;

    let error = client(&server)
        .exchange_device_code("device-123", "state")
        .await
        .unwrap_err();

    assert_eq!(error.code(), Some("authorization_pending"));
    assert!(is_exchange_error_retryable(&error));
}

#[tokio::test]
async fn exchange_access_denied_is_terminal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CALLBACK_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "message": "Failed to authorize device.",
            "detail": "access_denied"
        })))
        .mount(&server)
        .await;

    let error = client(&server)
        .exchange_device_code("device-123", "state")
        .await
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Terminal);
    assert!(!is_exchange_error_retryable(&error));
}

#[tokio::test]
async fn exchange_client_error_without_json_fails_closed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CALLBACK_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
        .mount(&server)
        .await;

    let error = client(&server)
        .exchange_device_code("device-123", "state")
        .await
        .unwrap_err();

    assert_eq!(error, ClassifiedError::http(400, None));
    assert_eq!(error.kind(), ErrorKind::Unclassifiable);
    assert!(!is_exchange_error_retryable(&error));
}

#[tokio::test]
async fn exchange_html_not_found_fails_closed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CALLBACK_PATH))
        .respond_with(ResponseTemplate::new(404).set_body_string("<html>Not Found</html>"))
        .mount(&server)
        .await;

    let error = client(&server)
        .exchange_device_code("device-123", "state")
        .await
        .unwrap_err();

    assert_eq!(error.status(), Some(404));
    assert!(!is_exchange_error_retryable(&error));
}

#[tokio::test]
async fn exchange_detail_wins_over_generic_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CALLBACK_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": "bad_request",
            "message": "Failed",
            "detail": "expired_token"
        })))
        .mount(&server)
        .await;

    let error = client(&server)
        .exchange_device_code("device-123", "state")
        .await
        .unwrap_err();

    assert_eq!(error.code(), Some("expired_token"));
    assert_eq!(
        error.payload().and_then(|payload| payload.message.as_deref()),
        Some("Failed")
    );
    assert_eq!(error.kind(), ErrorKind::Terminal);
}

#[tokio::test]
async fn unreadable_success_body_is_unknown() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CALLBACK_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .mount(&server)
        .await;

    let error = client(&server)
        .exchange_device_code("device-123", "state")
        .await
        .unwrap_err();

    assert!(matches!(error, ClassifiedError::Unknown(ref message) if message.contains("invalid response body")));
    assert!(!is_exchange_error_retryable(&error));
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
    let api = HttpApiClient::new(ClientConfig::new("http://127.0.0.1:1")).expect("client");

    let error = api
        .exchange_device_code("device-123", "state")
        .await
        .unwrap_err();

    assert!(matches!(error, ClassifiedError::Transport(_)));
    assert!(!is_exchange_error_retryable(&error));
}

#[tokio::test]
async fn custom_paths_are_used() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/custom/device"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "device_code": "d",
            "user_code": "U",
            "verification_uri": "https://example.com",
            "expires_in": 60,
            "interval": 1
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server).with_device_path("/custom/device");
    let device = api.request_device_code().await.expect("device code");

    assert_eq!(device.interval, Some(1));
}

#[tokio::test]
async fn authorization_checks_are_posted_and_answered() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v2/authcheck"))
        .and(body_partial_json(json!({
            "checks": {
                "viewMembers": {
                    "object": {
                        "resource_type": "organization_member",
                        "organization_id": "org-1"
                    },
                    "action": "read"
                },
                "editIdpSyncSettings": {
                    "object": {
                        "resource_type": "idpsync_settings",
                        "organization_id": "org-1"
                    },
                    "action": "update"
                }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "viewMembers": true,
            "editMembers": false,
            "viewGroups": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let permissions = fetch_organization_permissions(&client(&server), "org-1")
        .await
        .expect("permissions");

    assert!(permissions.view_members);
    assert!(permissions.view_groups);
    assert!(!permissions.edit_members);
    assert!(can_view_organization(Some(&permissions)));
    assert!(!can_edit_organization(Some(&permissions)));
}

#[tokio::test]
async fn authorization_check_failure_is_classified() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v2/authcheck"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "message": "You must be logged in."
        })))
        .mount(&server)
        .await;

    let error = client(&server)
        .check_authorization(&BTreeMap::new())
        .await
        .unwrap_err();

    assert_eq!(error.status(), Some(401));
}
