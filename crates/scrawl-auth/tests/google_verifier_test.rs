//! Tests for the Identity Toolkit verifier against a mock provider.

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use scrawl_auth::GoogleIdentityVerifier;
use scrawl_core::{Error, TokenVerifier};

const LOOKUP_PATH: &str = "/v1/accounts:lookup";

fn verifier_for(server: &MockServer) -> GoogleIdentityVerifier {
    GoogleIdentityVerifier::with_base_url(
        server.uri(),
        "test-project".to_string(),
        "test-key".to_string(),
    )
}

fn unauthorized_reason(result: Result<scrawl_core::Identity, Error>) -> String {
    match result {
        Err(Error::Unauthorized(msg)) => msg,
        other => panic!("Expected Unauthorized, got {:?}", other),
    }
}

#[tokio::test]
async fn valid_token_resolves_identity_from_claims() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(LOOKUP_PATH))
        .and(body_partial_json(json!({ "idToken": "good-token" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "users": [{
                "localId": "user-42",
                "email": "alice@example.com",
                "emailVerified": true,
                "displayName": "Alice",
                "photoUrl": "https://example.com/alice.png"
            }]
        })))
        .mount(&server)
        .await;

    let verifier = verifier_for(&server);
    let identity = verifier.verify(Some("good-token")).await.unwrap();

    assert_eq!(identity.user_id, "user-42");
    assert_eq!(identity.email.as_deref(), Some("alice@example.com"));
    assert!(identity.email_verified);
    assert_eq!(identity.name.as_deref(), Some("Alice"));
    assert_eq!(
        identity.picture.as_deref(),
        Some("https://example.com/alice.png")
    );
}

#[tokio::test]
async fn missing_credential_rejects_without_calling_provider() {
    let server = MockServer::start().await;
    // No mock mounted: a request would 404 and fail the test below.
    let verifier = verifier_for(&server);

    let reason = unauthorized_reason(verifier.verify(None).await);
    assert_eq!(reason, "Authorization header is missing");
}

#[tokio::test]
async fn expired_token_reports_expiry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(LOOKUP_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "code": 400, "message": "TOKEN_EXPIRED" }
        })))
        .mount(&server)
        .await;

    let verifier = verifier_for(&server);
    let reason = unauthorized_reason(verifier.verify(Some("stale")).await);
    assert_eq!(reason, "Authentication token has expired");
}

#[tokio::test]
async fn malformed_token_reports_invalid() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(LOOKUP_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "code": 400, "message": "INVALID_ID_TOKEN" }
        })))
        .mount(&server)
        .await;

    let verifier = verifier_for(&server);
    let reason = unauthorized_reason(verifier.verify(Some("garbage")).await);
    assert_eq!(reason, "Invalid authentication token");
}

#[tokio::test]
async fn provider_failure_collapses_to_generic_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(LOOKUP_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let verifier = verifier_for(&server);
    let reason = unauthorized_reason(verifier.verify(Some("any")).await);
    assert_eq!(reason, "Could not validate credentials");
}

#[tokio::test]
async fn empty_user_list_reports_invalid() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(LOOKUP_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "users": [] })))
        .mount(&server)
        .await;

    let verifier = verifier_for(&server);
    let reason = unauthorized_reason(verifier.verify(Some("hollow")).await);
    assert_eq!(reason, "Invalid authentication token");
}
