//! Conversions from external infrastructure errors into domain errors.

use rda_common::auth::OAuthClientError;
use rda_common::{ErrorClassification, ErrorSeverity};
use rda_domain::RdaError;
use reqwest::Error as HttpError;
use thiserror::Error;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct InfraError(pub RdaError);

impl From<InfraError> for RdaError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<RdaError> for InfraError {
    fn from(value: RdaError) -> Self {
        InfraError(value)
    }
}

impl ErrorClassification for InfraError {
    fn is_retryable(&self) -> bool {
        matches!(self.0, RdaError::Network(_) | RdaError::UpstreamUnavailable(_))
    }

    fn severity(&self) -> ErrorSeverity {
        match &self.0 {
            RdaError::NotFound(_) | RdaError::Validation(_) => ErrorSeverity::Info,
            RdaError::Network(_)
            | RdaError::TransientFetch(_)
            | RdaError::NameResolution(_)
            | RdaError::UpstreamUnavailable(_) => ErrorSeverity::Warning,
            RdaError::Config(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::Error,
        }
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoRdaError {
    fn into_rda(self) -> RdaError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → RdaError */
/* -------------------------------------------------------------------------- */

impl IntoRdaError for HttpError {
    fn into_rda(self) -> RdaError {
        if self.is_timeout() {
            return RdaError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return RdaError::Network("HTTP connection failure".into());
        }

        if self.is_decode() {
            return RdaError::Internal(format!("HTTP body could not be decoded: {self}"));
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 | 403 => RdaError::UpstreamAuth(message),
                404 => RdaError::NotFound(message),
                _ => RdaError::Network(message),
            };
        }

        RdaError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_rda())
    }
}

/* -------------------------------------------------------------------------- */
/* OAuthClientError → RdaError */
/* -------------------------------------------------------------------------- */

impl IntoRdaError for OAuthClientError {
    fn into_rda(self) -> RdaError {
        match self {
            OAuthClientError::RequestFailed(err) => err.into_rda(),
            OAuthClientError::Rejected { status, error, .. } => RdaError::UpstreamAuth(match error {
                Some(error) => format!("token endpoint returned {status} ({error})"),
                None => format!("token endpoint returned {status}"),
            }),
            OAuthClientError::ParseError(msg) => {
                RdaError::UpstreamAuth(format!("malformed token response: {msg}"))
            }
            OAuthClientError::NoRefreshToken => {
                RdaError::UpstreamAuth("no refresh token available".into())
            }
        }
    }
}

impl From<OAuthClientError> for InfraError {
    fn from(value: OAuthClientError) -> Self {
        InfraError(value.into_rda())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use reqwest::Client;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn http_status_errors_map_by_code() {
        let server = MockServer::start().await;
        Mock::given(method("GET")).respond_with(ResponseTemplate::new(403)).mount(&server).await;

        let err = Client::new()
            .get(server.uri())
            .send()
            .await
            .unwrap()
            .error_for_status()
            .unwrap_err();

        let rda: RdaError = InfraError::from(err).into();
        assert!(matches!(rda, RdaError::UpstreamAuth(ref m) if m.contains("403")));
    }

    #[tokio::test]
    async fn connection_failure_maps_to_network() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener); // release the port so that requests fail with ECONNREFUSED

        let err = Client::new().get(format!("http://{addr}")).send().await.unwrap_err();
        let infra = InfraError::from(err);
        assert!(matches!(infra.0, RdaError::Network(_)));
        assert!(infra.is_retryable());
    }

    #[test]
    fn oauth_rejection_hides_raw_body() {
        let err = OAuthClientError::Rejected {
            status: 400,
            error: Some("invalid_grant".into()),
            body: "{\"error\":\"invalid_grant\",\"trace\":\"secret-internal\"}".into(),
        };
        let rda: RdaError = InfraError::from(err).into();
        let message = rda.to_string();
        assert!(message.contains("invalid_grant"));
        assert!(!message.contains("secret-internal"));
    }
}
