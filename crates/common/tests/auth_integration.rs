//! Integration tests for auth module
//!
//! Drives a full authorization code + PKCE round trip against a mock token
//! endpoint that checks the verifier against the challenge it was given.

use std::collections::HashMap;

use rda_common::auth::{
    generate_code_challenge, validate_state, OAuthClient, OAuthClientError, OAuthConfig,
    PkceChallenge, DEFAULT_STATE_LENGTH,
};
use rda_common::ErrorClassification;
use url::Url;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> OAuthConfig {
    OAuthConfig {
        authorization_endpoint: Url::parse(&format!("{}/v2/oauth/authorize", server.uri()))
            .expect("authorize url"),
        token_endpoint: Url::parse(&format!("{}/v2/oauth/token", server.uri()))
            .expect("token url"),
        client_id: "client123".to_string(),
        client_secret: "s3cret".to_string(),
        redirect_uri: "http://127.0.0.1:3000/auth/callback".to_string(),
        scopes: vec!["publicData".to_string()],
    }
}

/// Validates the authorization code round trip.
///
/// Assertions:
/// - The authorization URL carries the challenge derived from the verifier.
/// - The state echoed back validates against the stored one.
/// - The token endpoint receives the verifier and returns tokens.
#[tokio::test]
async fn test_authorization_code_round_trip() {
    let server = MockServer::start().await;
    let config = config_for(&server);
    let pkce = PkceChallenge::generate(DEFAULT_STATE_LENGTH).expect("pkce");

    let url = config.authorization_url(&pkce.state, &pkce.code_challenge);
    let params: HashMap<String, String> = url.query_pairs().into_owned().collect();
    assert_eq!(params["code_challenge"], generate_code_challenge(&pkce.code_verifier));
    assert!(validate_state(&pkce.state, &params["state"]));

    Mock::given(method("POST"))
        .and(path("/v2/oauth/token"))
        .and(body_string_contains(format!("code_verifier={}", pkce.code_verifier)))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "A",
            "refresh_token": "R",
            "expires_in": 1200
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = OAuthClient::new(config, reqwest::Client::new());
    let tokens = client.exchange_code("code-1", &pkce.code_verifier).await.expect("exchange");

    assert_eq!(tokens.access_token, "A");
    assert_eq!(tokens.refresh_token.as_deref(), Some("R"));
    assert!(tokens.expires_at() > tokens.obtained_at);
}

/// Validates that a server-side failure is classified as retryable while a
/// rejected grant is not.
#[tokio::test]
async fn test_rejection_classification() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("refresh_token=expired"))
        .respond_with(ResponseTemplate::new(400).set_body_string(r#"{"error":"invalid_grant"}"#))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("refresh_token=flaky"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = OAuthClient::new(config_for(&server), reqwest::Client::new());

    let rejected = client.refresh_access_token("expired").await.expect_err("rejected");
    assert!(matches!(rejected, OAuthClientError::Rejected { status: 400, .. }));
    assert!(!rejected.is_retryable());

    let unavailable = client.refresh_access_token("flaky").await.expect_err("unavailable");
    assert!(matches!(unavailable, OAuthClientError::Rejected { status: 503, .. }));
    assert!(unavailable.is_retryable());
}
