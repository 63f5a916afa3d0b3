//! Login, callback and logout routes
//!
//! Browsers never see upstream error text: failures end in a redirect to
//! `/login?error=<code>` carrying one of three stable codes.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use chrono::Utc;
use rda_common::{ErrorClassification, ErrorSeverity};
use rda_core::CallbackParams;
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::context::AppContext;
use crate::cookies;
use crate::utils::logging::{error_label, log_route_outcome};

/// Start a login: seal a fresh attempt into a cookie and send the browser to
/// the provider.
pub async fn login(State(ctx): State<Arc<AppContext>>, jar: CookieJar) -> Response {
    let redirect = match ctx.initiator.begin(Utc::now()) {
        Ok(redirect) => redirect,
        Err(e) => {
            error!(error = %e, label = error_label(&e), "login_initiation_failed");
            log_route_outcome("auth_login", 500, "initiation_failed");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let sealed = match ctx.sealer.seal(&redirect.attempt) {
        Ok(sealed) => sealed,
        Err(e) => {
            error!(error = %e, label = error_label(&e), "attempt_seal_failed");
            log_route_outcome("auth_login", 500, "seal_failed");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let jar = jar.add(cookies::attempt_cookie(sealed, ctx.config.server.secure_cookies));
    log_route_outcome("auth_login", 303, "redirected");
    (jar, Redirect::to(&redirect.authorization_url)).into_response()
}

#[derive(Debug, Default, Deserialize)]
pub struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

/// Finish a login
///
/// The attempt cookie is cleared whatever the outcome.
pub async fn callback(
    State(ctx): State<Arc<AppContext>>,
    Query(query): Query<CallbackQuery>,
    jar: CookieJar,
) -> Response {
    let now = Utc::now();

    if let Some(description) = &query.error_description {
        info!(provider_error = ?query.error, description = %description, "provider_returned_error");
    }

    let attempt = jar
        .get(cookies::ATTEMPT_COOKIE)
        .and_then(|cookie| ctx.sealer.unseal(cookie.value(), now));

    let params = CallbackParams { code: query.code, state: query.state, error: query.error };
    let outcome = ctx.orchestrator.complete(params, attempt, now).await;
    let jar = jar.add(cookies::clear_attempt_cookie());

    match outcome.result {
        Ok(success) => {
            let jar =
                cookies::with_session(jar, &success.session, ctx.config.server.secure_cookies);
            log_route_outcome("auth_callback", 303, "signed_in");
            (jar, Redirect::to(&ctx.location("/dashboard"))).into_response()
        }
        Err(err) => {
            let code = err.code();
            match err.severity() {
                ErrorSeverity::Info => info!(code = %code, "callback_rejected"),
                ErrorSeverity::Warning => warn!(code = %code, "callback_rejected"),
                _ => error!(code = %code, "callback_rejected"),
            }
            log_route_outcome("auth_callback", 303, "login_failed");
            let target = ctx.location(&format!("/login?error={code}"));
            (jar, Redirect::to(&target)).into_response()
        }
    }
}

/// Sign out: revoke at the store (best effort) and clear session cookies.
pub async fn logout(State(ctx): State<Arc<AppContext>>, jar: CookieJar) -> Response {
    if let Some(token) = cookies::access_token(&jar) {
        if let Err(e) = ctx.directory.revoke(&token).await {
            warn!(error = %e, label = error_label(&e), "session_revoke_failed");
        }
    }

    log_route_outcome("auth_logout", 303, "signed_out");
    (cookies::without_session(jar), Redirect::to(&ctx.location("/"))).into_response()
}
