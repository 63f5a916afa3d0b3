//! Callback / token-exchange orchestrator
//!
//! Drives one login callback through
//! `AwaitingCode → Validated → UpstreamExchanged → IdentityVerified →
//! SessionBridged → Done`, with `Failed` reachable from every non-terminal
//! stage. Nothing is retried. The stored attempt is retired on every exit
//! path, including cancellation of the future.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rda_common::auth::validate_state;
use rda_common::{ErrorClassification, ErrorSeverity};
use rda_domain::{
    AccountRef, AuthorizationAttempt, ExternalIdentity, IssuedSession, LoginErrorCode, LoginKey,
    LoginStage, RdaError, SessionMetadata,
};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::ports::{ReplayGuard, SessionProvider, UpstreamAuth};

/// Query parameters of the callback request
#[derive(Debug, Clone, Default)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    /// Provider-reported error, e.g. the user declined consent
    pub error: Option<String>,
}

/// Why a login failed
///
/// Messages are for logs. Browsers only ever see [`LoginError::code`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoginError {
    #[error("callback validation failed: {0}")]
    Validation(String),

    #[error("upstream authentication failed: {0}")]
    UpstreamAuth(String),

    #[error("session bridging failed: {0}")]
    SessionBridge(String),
}

impl LoginError {
    pub fn code(&self) -> LoginErrorCode {
        match self {
            Self::Validation(_) => LoginErrorCode::AuthFailedVerification,
            Self::UpstreamAuth(_) => LoginErrorCode::UpstreamAuthFailed,
            Self::SessionBridge(_) => LoginErrorCode::SessionBridgeFailed,
        }
    }
}

impl ErrorClassification for LoginError {
    fn is_retryable(&self) -> bool {
        // A new login attempt can succeed where a bridge outage did not.
        matches!(self, Self::SessionBridge(_))
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Validation(_) => ErrorSeverity::Info,
            Self::UpstreamAuth(_) => ErrorSeverity::Warning,
            Self::SessionBridge(_) => ErrorSeverity::Error,
        }
    }
}

impl From<LoginError> for RdaError {
    fn from(err: LoginError) -> Self {
        match err {
            LoginError::Validation(msg) => RdaError::Validation(msg),
            LoginError::UpstreamAuth(msg) => RdaError::UpstreamAuth(msg),
            LoginError::SessionBridge(msg) => RdaError::SessionBridge(msg),
        }
    }
}

/// Successful login
#[derive(Debug, Clone)]
pub struct LoginSuccess {
    pub session: IssuedSession,
    pub identity: ExternalIdentity,
    pub account: AccountRef,
    /// `true` when this login created the internal account
    pub created: bool,
}

/// Result of one callback plus the stages it went through
#[derive(Debug)]
pub struct LoginOutcome {
    pub trail: Vec<LoginStage>,
    pub result: Result<LoginSuccess, LoginError>,
}

impl LoginOutcome {
    pub fn final_stage(&self) -> LoginStage {
        self.trail.last().copied().unwrap_or(LoginStage::AwaitingCode)
    }
}

/// Retires the stored attempt when dropped
struct AttemptCleanup<'a> {
    replay: &'a dyn ReplayGuard,
    state: Option<String>,
}

impl Drop for AttemptCleanup<'_> {
    fn drop(&mut self) {
        if let Some(state) = self.state.take() {
            self.replay.retire(&state);
            debug!("authorization_attempt_retired");
        }
    }
}

/// Completes logins
pub struct CallbackOrchestrator {
    upstream: Arc<dyn UpstreamAuth>,
    sessions: Arc<dyn SessionProvider>,
    replay: Arc<dyn ReplayGuard>,
}

impl CallbackOrchestrator {
    pub fn new(
        upstream: Arc<dyn UpstreamAuth>,
        sessions: Arc<dyn SessionProvider>,
        replay: Arc<dyn ReplayGuard>,
    ) -> Self {
        Self { upstream, sessions, replay }
    }

    /// Run one callback to a terminal stage
    ///
    /// `attempt` is the attempt recovered from the browser, `None` when it
    /// was missing, tampered with or unreadable.
    pub async fn complete(
        &self,
        params: CallbackParams,
        attempt: Option<AuthorizationAttempt>,
        now: DateTime<Utc>,
    ) -> LoginOutcome {
        let _cleanup = AttemptCleanup {
            replay: self.replay.as_ref(),
            state: attempt.as_ref().map(|a| a.state.clone()),
        };

        let mut trail = vec![LoginStage::AwaitingCode];
        let result = self.run(&params, attempt.as_ref(), now, &mut trail).await;

        match &result {
            Ok(success) => {
                trail.push(LoginStage::Done);
                info!(
                    character_id = success.identity.external_id,
                    account_id = %success.account.id,
                    created = success.created,
                    "login_completed"
                );
            }
            Err(err) => {
                let failed_at = trail.last().copied().unwrap_or(LoginStage::AwaitingCode);
                trail.push(LoginStage::Failed);
                let stage = failed_at.to_string();
                let code = err.code().to_string();
                let retryable = err.is_retryable();
                match err.severity() {
                    ErrorSeverity::Info => {
                        info!(%stage, %code, retryable, error = %err, "login_failed")
                    }
                    ErrorSeverity::Warning => {
                        warn!(%stage, %code, retryable, error = %err, "login_failed")
                    }
                    _ => error!(%stage, %code, retryable, error = %err, "login_failed"),
                }
            }
        }

        LoginOutcome { trail, result }
    }

    async fn run(
        &self,
        params: &CallbackParams,
        attempt: Option<&AuthorizationAttempt>,
        now: DateTime<Utc>,
        trail: &mut Vec<LoginStage>,
    ) -> Result<LoginSuccess, LoginError> {
        let (code, attempt) = self.validate(params, attempt, now)?;
        trail.push(LoginStage::Validated);

        let tokens = self
            .upstream
            .exchange_code(code, &attempt.verifier)
            .await
            .map_err(|e| LoginError::UpstreamAuth(e.to_string()))?;
        let refresh_token = tokens
            .refresh_token
            .clone()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| LoginError::UpstreamAuth("token response had no refresh token".into()))?;
        trail.push(LoginStage::UpstreamExchanged);

        let identity = self
            .upstream
            .verify_identity(&tokens.access_token)
            .await
            .map_err(|e| LoginError::UpstreamAuth(e.to_string()))?;
        trail.push(LoginStage::IdentityVerified);

        let login_key = LoginKey::for_character(identity.external_id);
        let metadata = SessionMetadata {
            character_id: identity.external_id,
            character_name: identity.display_name.clone(),
            refresh_token,
            last_login_at: now,
        };
        let (account, created) = self.bridge(&login_key, &metadata).await?;
        let session = self
            .sessions
            .issue_session(&account)
            .await
            .map_err(|e| LoginError::SessionBridge(e.to_string()))?;
        trail.push(LoginStage::SessionBridged);

        Ok(LoginSuccess { session, identity, account, created })
    }

    fn validate<'p, 'a>(
        &self,
        params: &'p CallbackParams,
        attempt: Option<&'a AuthorizationAttempt>,
        now: DateTime<Utc>,
    ) -> Result<(&'p str, &'a AuthorizationAttempt), LoginError> {
        if let Some(provider_error) = params.error.as_deref() {
            return Err(LoginError::Validation(format!("provider returned error {provider_error}")));
        }
        let code = non_empty(params.code.as_deref())
            .ok_or_else(|| LoginError::Validation("missing code".into()))?;
        let state = non_empty(params.state.as_deref())
            .ok_or_else(|| LoginError::Validation("missing state".into()))?;
        let attempt =
            attempt.ok_or_else(|| LoginError::Validation("no stored attempt".into()))?;

        if !validate_state(&attempt.state, state) {
            return Err(LoginError::Validation("state mismatch".into()));
        }
        if attempt.verifier.is_empty() {
            return Err(LoginError::Validation("stored attempt has no verifier".into()));
        }
        if attempt.is_expired(now) {
            return Err(LoginError::Validation("attempt expired".into()));
        }
        if !self.replay.claim(state) {
            return Err(LoginError::Validation("state already consumed".into()));
        }

        Ok((code, attempt))
    }

    async fn bridge(
        &self,
        login_key: &LoginKey,
        metadata: &SessionMetadata,
    ) -> Result<(AccountRef, bool), LoginError> {
        let existing = self
            .sessions
            .find_account(login_key)
            .await
            .map_err(|e| LoginError::SessionBridge(e.to_string()))?;
        let account = self
            .sessions
            .upsert_account(login_key, metadata)
            .await
            .map_err(|e| LoginError::SessionBridge(e.to_string()))?;
        Ok((account, existing.is_none()))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
