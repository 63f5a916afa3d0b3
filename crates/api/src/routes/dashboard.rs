//! Dashboard data route

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use axum_extra::extract::CookieJar;
use tracing::warn;

use crate::context::AppContext;
use crate::cookies;
use crate::utils::logging::{error_label, log_route_outcome};

/// Load the dashboard view for the signed-in character
///
/// `401` without a recognised session; `502` if the session store cannot be
/// reached. Upstream data failures do not fail the request.
pub async fn dashboard(State(ctx): State<Arc<AppContext>>, jar: CookieJar) -> Response {
    let Some(token) = cookies::access_token(&jar) else {
        log_route_outcome("dashboard", 401, "no_session_cookie");
        return unauthorized();
    };

    let identity = match ctx.directory.identity_for(&token).await {
        Ok(Some(identity)) => identity,
        Ok(None) => {
            log_route_outcome("dashboard", 401, "unknown_session");
            return unauthorized();
        }
        Err(e) => {
            warn!(error = %e, label = error_label(&e), "session_lookup_failed");
            log_route_outcome("dashboard", 502, "session_store_unavailable");
            return (
                StatusCode::BAD_GATEWAY,
                Json(serde_json::json!({ "error": "session_store_unavailable" })),
            )
                .into_response();
        }
    };

    let view = ctx.dashboard.load(&identity).await;
    log_route_outcome("dashboard", 200, "loaded");
    Json(view).into_response()
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, Json(serde_json::json!({ "error": "unauthorized" }))).into_response()
}
