//! Login gate and admin guard for protecting routes.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use chrono::{DateTime, Utc};

use crate::AppState;

use super::jwt;
use super::types::{AuthConfig, AuthUser, AUTH_COOKIE};

/// Where unauthenticated requests are sent.
pub const LOGIN_PATH: &str = "/login";

/// Outcome of checking a request's session cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    Authenticated(AuthUser),
    Unauthenticated,
}

/// Classify a request by its `auth` cookie. Runs on every protected request;
/// there is no server-side session to consult.
pub fn session_from_headers(headers: &HeaderMap, config: &AuthConfig, now: DateTime<Utc>) -> Session {
    let Some(token) = extract_token_from_cookie(headers, AUTH_COOKIE) else {
        return Session::Unauthenticated;
    };

    match jwt::validate_token(config, &token, now) {
        Ok(email) => Session::Authenticated(AuthUser { email }),
        Err(_) => Session::Unauthenticated,
    }
}

/// Middleware function that requires a valid session cookie.
///
/// Use with `axum::middleware::from_fn_with_state`. On success the
/// [`AuthUser`] is available to handlers as `Extension<AuthUser>`.
pub async fn require_login(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let now = state.clock.now();

    match session_from_headers(request.headers(), &state.auth_config, now) {
        Session::Authenticated(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Session::Unauthenticated => {
            tracing::debug!(path = %request.uri().path(), "Unauthenticated request redirected to login");
            Redirect::to(LOGIN_PATH).into_response()
        }
    }
}

/// Middleware function that requires `Authorization: Bearer <admin token>`.
pub async fn require_admin_token(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let expected = state.auth_config.admin_token.as_bytes();

    match extract_token_from_header(request.headers()) {
        Some(token) if !expected.is_empty() && constant_time_eq(token.as_bytes(), expected) => {
            next.run(request).await
        }
        _ => {
            tracing::warn!(path = %request.uri().path(), "Rejected admin request");
            StatusCode::UNAUTHORIZED.into_response()
        }
    }
}

/// Value of the first cookie named `cookie_name`. An empty value counts as
/// absent; later cookies with the same name are ignored.
fn extract_token_from_cookie(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let cookie = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookie_header| cookie_header.split(';'))
        .filter_map(|cookie_str| cookie::Cookie::parse(cookie_str.trim()).ok())
        .find(|cookie| cookie.name() == cookie_name)?;

    if cookie.value().is_empty() {
        return None;
    }

    Some(cookie.value().to_string())
}

fn extract_token_from_header(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    Some(token.to_string())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
