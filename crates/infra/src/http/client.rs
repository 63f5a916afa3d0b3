use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use rda_domain::{RdaError, Result};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::errors::InfraError;

/// Default `User-Agent`; ESI asks callers to identify themselves.
pub const DEFAULT_USER_AGENT: &str = concat!("eve-rda/", env!("CARGO_PKG_VERSION"));

/// Upstream error bodies are truncated to this many bytes in logs.
const LOGGED_BODY_LIMIT: usize = 512;

/// Outbound HTTP client shared by every adapter.
///
/// Sends each request exactly once. No timeout is configured here; dropping
/// the future abandons the request.
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: ReqwestClient,
}

impl HttpClient {
    /// Build a client that identifies itself with [`DEFAULT_USER_AGENT`].
    pub fn new() -> Result<Self> {
        let client = ReqwestClient::builder()
            .user_agent(DEFAULT_USER_AGENT)
            .build()
            .map_err(|err| RdaError::from(InfraError::from(err)))?;

        Ok(Self { client })
    }

    /// The underlying reqwest client, for adapters that drive it directly.
    pub fn inner(&self) -> &ReqwestClient {
        &self.client
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Execute the provided request builder once.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let request = builder.build().map_err(|err| RdaError::from(InfraError::from(err)))?;
        let method = request.method().clone();
        let path = request.url().path().to_string();
        debug!(%method, %path, "sending HTTP request");

        match self.client.execute(request).await {
            Ok(response) => {
                debug!(%method, %path, status = %response.status(), "received HTTP response");
                Ok(response)
            }
            Err(err) => {
                debug!(%method, %path, error = %err, "HTTP request failed");
                Err(InfraError::from(err).into())
            }
        }
    }

    /// Send a request and decode a JSON success body.
    ///
    /// Non-success bodies are logged at `warn` under `what` and never
    /// returned; the error carries only the status.
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        what: &'static str,
    ) -> Result<T> {
        let response = self.send(builder).await?;
        let response = check_status(response, what).await?;
        response.json::<T>().await.map_err(|err| {
            warn!(what, error = %err, "upstream response did not match schema");
            RdaError::Internal(format!("{what} response did not match schema"))
        })
    }
}

/// Pass success responses through; log and convert everything else.
pub(crate) async fn check_status(response: Response, what: &'static str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    warn!(what, status = status.as_u16(), body = %truncate(&body), "upstream returned error");

    let message = format!("{what} returned HTTP {}", status.as_u16());
    Err(match status.as_u16() {
        401 | 403 => RdaError::UpstreamAuth(message),
        404 => RdaError::NotFound(message),
        _ => RdaError::Network(message),
    })
}

pub(crate) fn truncate(body: &str) -> &str {
    if body.len() <= LOGGED_BODY_LIMIT {
        return body;
    }
    let mut end = LOGGED_BODY_LIMIT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
