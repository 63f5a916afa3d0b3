//! Shared harness for server tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::header::{COOKIE, LOCATION, SET_COOKIE};
use axum::http::{Request, Response};
use axum::Router;
use axum_extra::extract::cookie::Cookie;
use rda_domain::{
    default_scopes, Config, EsiConfig, NameCacheConfig, ProviderConfig, SecretString,
    ServerConfig, SessionStoreConfig,
};
use rda_server::{build_router, AppContext};
use tower::ServiceExt;
use url::Url;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const CHARACTER_ID: i64 = 2_112_625_428;

pub struct Harness {
    pub sso: MockServer,
    pub esi: MockServer,
    pub app: Router,
}

pub fn config(sso: &MockServer, esi: &MockServer) -> Config {
    Config {
        provider: ProviderConfig {
            client_id: "client123".into(),
            client_secret: SecretString::new("s3cret"),
            callback_url: "http://127.0.0.1:3000/auth/callback".into(),
            sso_base_url: sso.uri(),
            scopes: default_scopes(),
        },
        esi: EsiConfig { base_url: esi.uri() },
        session_store: SessionStoreConfig {
            url: "memory://".into(),
            service_key: SecretString::new("svc-key"),
        },
        server: ServerConfig {
            bind_addr: "127.0.0.1:0".into(),
            public_origin: None,
            secure_cookies: false,
            attempt_signing_key: SecretString::new("0123456789abcdef0123456789abcdef"),
        },
        names: NameCacheConfig::default(),
    }
}

pub async fn harness() -> Harness {
    let sso = MockServer::start().await;
    let esi = MockServer::start().await;
    let context = AppContext::new(config(&sso, &esi)).unwrap();
    Harness { app: build_router(Arc::new(context)), sso, esi }
}

impl Harness {
    pub async fn get(&self, uri: &str, cookies: &[(&str, &str)]) -> Response<Body> {
        let mut request = Request::builder().uri(uri);
        if !cookies.is_empty() {
            let header =
                cookies.iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join("; ");
            request = request.header(COOKIE, header);
        }
        self.app.clone().oneshot(request.body(Body::empty()).unwrap()).await.unwrap()
    }

    /// Run `/auth/login`, returning the provider state and sealed attempt.
    pub async fn begin_login(&self) -> (String, String) {
        let response = self.get("/auth/login", &[]).await;
        let url = Url::parse(&location(&response)).unwrap();
        let state = url.query_pairs().find(|(k, _)| k == "state").unwrap().1.into_owned();
        let attempt = set_cookie(&response, "rda_attempt").unwrap().value().to_string();
        (state, attempt)
    }

    /// Complete a full login and return the session access cookie.
    pub async fn sign_in(&self) -> String {
        let (state, attempt) = self.begin_login().await;
        let response = self
            .get(&format!("/auth/callback?code=the-code&state={state}"), &[("rda_attempt", &attempt)])
            .await;
        assert_eq!(location(&response), "/dashboard");
        set_cookie(&response, "rda_access").unwrap().value().to_string()
    }
}

pub fn location(response: &Response<Body>) -> String {
    response.headers().get(LOCATION).unwrap().to_str().unwrap().to_string()
}

pub fn set_cookie(response: &Response<Body>, name: &str) -> Option<Cookie<'static>> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| Cookie::parse(value.to_string()).ok())
        .find(|cookie| cookie.name() == name)
}

pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Token endpoint for the authorization code grant plus the verify endpoint.
pub async fn mount_login(sso: &MockServer, expected_exchanges: u64) {
    Mock::given(method("POST"))
        .and(path("/v2/oauth/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "eve-access-1",
            "refresh_token": "eve-refresh-1",
            "expires_in": 1199,
            "token_type": "Bearer"
        })))
        .expect(expected_exchanges)
        .mount(sso)
        .await;

    Mock::given(method("GET"))
        .and(path("/oauth/verify"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "CharacterID": CHARACTER_ID,
            "CharacterName": "Test Pilot",
            "ExpiresOn": "2026-10-19T12:00:00",
            "Scopes": "publicData",
            "TokenType": "Character",
            "CharacterOwnerHash": "hash"
        })))
        .mount(sso)
        .await;
}

/// Token endpoint for the refresh grant.
pub async fn mount_refresh(sso: &MockServer, status: u16) {
    let response = if status == 200 {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "eve-access-2",
            "refresh_token": "eve-refresh-2",
            "expires_in": 1199
        }))
    } else {
        ResponseTemplate::new(status).set_body_json(serde_json::json!({
            "error": "invalid_grant",
            "error_description": "refresh token revoked"
        }))
    };

    Mock::given(method("POST"))
        .and(path("/v2/oauth/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .respond_with(response)
        .mount(sso)
        .await;
}
