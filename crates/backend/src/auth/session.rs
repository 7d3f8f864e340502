//! Session cookie construction.
//!
//! The session is the cookie: its value is the login token verbatim and the
//! server keeps no session table.

use chrono::{DateTime, Utc};
use cookie::time::{Duration, OffsetDateTime};
use cookie::{Cookie, SameSite};

use super::types::{AuthConfig, AUTH_COOKIE};

/// Cookie carrying `token`, expiring together with the token itself.
pub fn logged_in(config: &AuthConfig, token: &str, now: DateTime<Utc>) -> Cookie<'static> {
    let expires = to_offset_date_time(now + config.token_ttl);

    Cookie::build((AUTH_COOKIE, token.to_owned()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure_cookies)
        .expires(expires)
        .build()
}

/// Cookie that makes the browser drop the session immediately.
pub fn logged_out(config: &AuthConfig) -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure_cookies)
        .expires(OffsetDateTime::UNIX_EPOCH)
        .max_age(Duration::ZERO)
        .build()
}

fn to_offset_date_time(instant: DateTime<Utc>) -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(instant.timestamp()).unwrap_or(OffsetDateTime::UNIX_EPOCH)
}
