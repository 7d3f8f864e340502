//! Auth-related types and configuration.

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Lifetime shared by login tokens and the session cookie that carries them.
pub const TOKEN_TTL_MINUTES: i64 = 15;

/// Name of the session cookie.
pub const AUTH_COOKIE: &str = "auth";

/// JWT Claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Email of the allow-listed user the token was minted for
    pub email: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

/// Validated user from the session cookie
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub email: String,
}

/// Auth configuration, built once at startup and shared read-only.
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl: Duration,
    /// Public origin used to compose magic links, without trailing slash
    pub app_origin: String,
    pub secure_cookies: bool,
    /// Bearer token guarding the admin endpoints
    pub admin_token: String,
}

impl AuthConfig {
    pub fn new(
        jwt_secret: impl Into<String>,
        app_origin: impl Into<String>,
        admin_token: impl Into<String>,
    ) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            token_ttl: Duration::minutes(TOKEN_TTL_MINUTES),
            app_origin: app_origin.into().trim_end_matches('/').to_string(),
            secure_cookies: false,
            admin_token: admin_token.into(),
        }
    }

    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .field("app_origin", &self.app_origin)
            .field("secure_cookies", &self.secure_cookies)
            .field("admin_token", &"<redacted>")
            .finish()
    }
}
