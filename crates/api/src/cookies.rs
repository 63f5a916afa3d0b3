//! Cookie construction for the login round trip and the internal session

use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use rda_domain::constants::ATTEMPT_TTL_SECONDS;
use rda_domain::IssuedSession;
use time::Duration;

pub const ATTEMPT_COOKIE: &str = "rda_attempt";
pub const ACCESS_COOKIE: &str = "rda_access";
pub const REFRESH_COOKIE: &str = "rda_refresh";

const AUTH_PATH: &str = "/auth";
const REFRESH_COOKIE_DAYS: i64 = 30;

/// Sealed attempt cookie, scoped to the auth routes.
pub fn attempt_cookie(sealed: String, secure: bool) -> Cookie<'static> {
    Cookie::build((ATTEMPT_COOKIE, sealed))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path(AUTH_PATH)
        .max_age(Duration::seconds(ATTEMPT_TTL_SECONDS))
        .build()
}

/// Removal cookie for the attempt.
pub fn clear_attempt_cookie() -> Cookie<'static> {
    Cookie::build((ATTEMPT_COOKIE, "")).path(AUTH_PATH).max_age(Duration::ZERO).build()
}

/// Set the internal session cookies.
pub fn with_session(jar: CookieJar, session: &IssuedSession, secure: bool) -> CookieJar {
    let access = session_cookie(
        ACCESS_COOKIE,
        session.access_token.clone(),
        Duration::seconds(session.expires_in),
        secure,
    );
    let refresh = session_cookie(
        REFRESH_COOKIE,
        session.refresh_token.clone(),
        Duration::days(REFRESH_COOKIE_DAYS),
        secure,
    );
    jar.add(access).add(refresh)
}

/// Remove the internal session cookies.
pub fn without_session(jar: CookieJar) -> CookieJar {
    jar.add(clear_session_cookie(ACCESS_COOKIE)).add(clear_session_cookie(REFRESH_COOKIE))
}

pub fn access_token(jar: &CookieJar) -> Option<String> {
    jar.get(ACCESS_COOKIE).map(|c| c.value().to_string()).filter(|v| !v.is_empty())
}

fn session_cookie(
    name: &'static str,
    value: String,
    max_age: Duration,
    secure: bool,
) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(max_age)
        .build()
}

fn clear_session_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build((name, "")).path("/").max_age(Duration::ZERO).build()
}
