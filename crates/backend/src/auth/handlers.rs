//! Authentication HTTP handlers.

use axum::{
    extract::{rejection::FormRejection, rejection::QueryRejection, Query, State},
    http::{header, HeaderMap},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use shared_types::LoginRequest;

use crate::pages;
use crate::AppState;

use super::middleware::{session_from_headers, Session};
use super::{jwt, session};

/// Neutral landing page after a login request, whatever happened.
pub const CHECK_YOUR_EMAIL_PATH: &str = "/check-your-email";
/// Landing page once logged in.
pub const HOME_PATH: &str = "/record-event";

/// Login form, or straight to the app when the session is still valid.
pub async fn landing(State(state): State<AppState>, headers: HeaderMap) -> Response {
    match session_from_headers(&headers, &state.auth_config, state.clock.now()) {
        Session::Authenticated(user) => {
            tracing::info!(email = %user.email, "Already logged in, redirecting");
            Redirect::to(HOME_PATH).into_response()
        }
        Session::Unauthenticated => Html(pages::login()).into_response(),
    }
}

/// Request a magic link.
///
/// Every outcome, including malformed input and unknown emails, ends in the
/// same redirect so the response never tells who is on the allow-list.
pub async fn login_request(
    State(state): State<AppState>,
    form: Result<Form<LoginRequest>, FormRejection>,
) -> Redirect {
    let email = match form {
        Ok(Form(request)) => request.email,
        Err(e) => {
            tracing::warn!(error = %e, "Could not parse login form");
            return Redirect::to(CHECK_YOUR_EMAIL_PATH);
        }
    };

    if let Err(e) = state.issuer.request_login(&email).await {
        tracing::warn!(email = %email.trim(), error = ?e, "Login request failed");
    }

    Redirect::to(CHECK_YOUR_EMAIL_PATH)
}

#[derive(Debug, Deserialize)]
pub struct LoginParams {
    pub token: Option<String>,
}

/// Visit of the magic link: trade the token for a session cookie.
pub async fn login_with_token(
    State(state): State<AppState>,
    params: Result<Query<LoginParams>, QueryRejection>,
) -> Response {
    let token = match params {
        Ok(Query(LoginParams { token: Some(token) })) if !token.is_empty() => token,
        _ => return Redirect::to("/").into_response(),
    };

    let now = state.clock.now();
    match jwt::validate_token(&state.auth_config, &token, now) {
        Ok(email) => {
            let cookie = session::logged_in(&state.auth_config, &token, now);
            tracing::info!(email = %email, "User logged in via magic link");

            (
                [(header::SET_COOKIE, cookie.to_string())],
                Redirect::to(HOME_PATH),
            )
                .into_response()
        }
        Err(e) => {
            tracing::info!(error = %e, "Magic link rejected");
            Redirect::to("/").into_response()
        }
    }
}

/// Logout - clear auth cookie.
pub async fn logout(State(state): State<AppState>) -> Response {
    let cookie = session::logged_out(&state.auth_config);
    tracing::info!("User logged out");

    (
        [(header::SET_COOKIE, cookie.to_string())],
        Redirect::to("/"),
    )
        .into_response()
}

pub async fn check_your_email() -> Html<String> {
    Html(pages::check_your_email())
}
