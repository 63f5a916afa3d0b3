//! HTTP admin API client for the internal session store
//!
//! Admin calls authenticate with the service key (`apikey` header plus
//! bearer). Session lookup and logout carry the service key as `apikey` and
//! the user's access token as bearer.

use async_trait::async_trait;
use rda_core::{SessionDirectory, SessionProvider};
use rda_domain::{
    AccountRef, InternalSessionIdentity, IssuedSession, LoginKey, RdaError, Result,
    SessionMetadata, SessionStoreConfig,
};
use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use tracing::debug;

use crate::http::client::check_status;
use crate::http::HttpClient;

const API_KEY_HEADER: &str = "apikey";

#[derive(Serialize)]
struct UpsertAccountBody<'a> {
    metadata: &'a SessionMetadata,
}

#[derive(Debug, Clone)]
pub struct SessionStoreClient {
    http: HttpClient,
    base_url: String,
    service_key: rda_domain::SecretString,
}

impl SessionStoreClient {
    pub fn new(config: &SessionStoreConfig, http: HttpClient) -> Self {
        Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            service_key: config.service_key.clone(),
        }
    }

    fn admin(&self, method: Method, path: &str) -> RequestBuilder {
        self.user(method, path, self.service_key.expose())
    }

    fn user(&self, method: Method, path: &str, bearer: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .header(API_KEY_HEADER, self.service_key.expose())
            .bearer_auth(bearer)
    }
}

fn bridge_error(operation: &'static str, err: RdaError) -> RdaError {
    match err {
        RdaError::SessionBridge(_) => err,
        other => RdaError::SessionBridge(format!("{operation}: {other}")),
    }
}

#[async_trait]
impl SessionProvider for SessionStoreClient {
    async fn find_account(&self, login_key: &LoginKey) -> Result<Option<AccountRef>> {
        let request = self.admin(Method::GET, &format!("/admin/accounts/{login_key}"));
        match self.http.send_json::<AccountRef>(request, "find_account").await {
            Ok(account) => Ok(Some(account)),
            Err(RdaError::NotFound(_)) => Ok(None),
            Err(e) => Err(bridge_error("find_account", e)),
        }
    }

    async fn upsert_account(
        &self,
        login_key: &LoginKey,
        metadata: &SessionMetadata,
    ) -> Result<AccountRef> {
        let request = self
            .admin(Method::PUT, &format!("/admin/accounts/{login_key}"))
            .json(&UpsertAccountBody { metadata });
        let account: AccountRef = self
            .http
            .send_json(request, "upsert_account")
            .await
            .map_err(|e| bridge_error("upsert_account", e))?;

        if &account.login_key != login_key {
            return Err(RdaError::SessionBridge(format!(
                "store returned account for {} when {login_key} was requested",
                account.login_key
            )));
        }
        Ok(account)
    }

    async fn issue_session(&self, account: &AccountRef) -> Result<IssuedSession> {
        let request = self.admin(Method::POST, &format!("/admin/accounts/{}/sessions", account.id));
        self.http
            .send_json(request, "issue_session")
            .await
            .map_err(|e| bridge_error("issue_session", e))
    }
}

#[async_trait]
impl SessionDirectory for SessionStoreClient {
    async fn identity_for(&self, access_token: &str) -> Result<Option<InternalSessionIdentity>> {
        let request = self.user(Method::GET, "/session", access_token);
        match self.http.send_json(request, "session_lookup").await {
            Ok(identity) => Ok(Some(identity)),
            Err(RdaError::UpstreamAuth(_) | RdaError::NotFound(_)) => {
                debug!("session token not recognised by store");
                Ok(None)
            }
            Err(e) => Err(bridge_error("session_lookup", e)),
        }
    }

    async fn revoke(&self, access_token: &str) -> Result<()> {
        let request = self.user(Method::POST, "/logout", access_token);
        let response =
            self.http.send(request).await.map_err(|e| bridge_error("logout", e))?;
        check_status(response, "logout").await.map_err(|e| bridge_error("logout", e))?;
        Ok(())
    }
}
