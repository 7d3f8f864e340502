//! Login token creation and validation.
//!
//! Tokens are HS256 JWTs carrying the user's email and an expiry. Nothing is
//! stored server side: a token is valid while its signature verifies under
//! the configured secret and its `exp` lies in the future.

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use super::types::{AuthConfig, Claims};

/// Only the HMAC family is accepted, whatever the token header claims.
const ACCEPTED_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

#[derive(Debug, Error)]
pub enum AuthError {
    /// Bad signature, foreign algorithm, expired, or missing/malformed claims
    #[error("invalid token")]
    InvalidToken,

    #[error("failed to sign token")]
    TokenGeneration(#[source] jsonwebtoken::errors::Error),
}

/// Create a login token for `email` that expires `config.token_ttl` after `now`.
pub fn create_token(
    config: &AuthConfig,
    email: &str,
    now: DateTime<Utc>,
) -> Result<String, AuthError> {
    let exp = now + config.token_ttl;

    let claims = Claims {
        email: email.to_string(),
        iat: now.timestamp(),
        exp: exp.timestamp(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(AuthError::TokenGeneration)
}

/// Validate a login token at instant `now` and return the embedded email.
pub fn validate_token(
    config: &AuthConfig,
    token: &str,
    now: DateTime<Utc>,
) -> Result<String, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.algorithms = ACCEPTED_ALGORITHMS.to_vec();
    validation.set_required_spec_claims(&["exp"]);
    // exp is compared against the caller's clock below
    validation.validate_exp = false;
    validation.leeway = 0;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|e| {
        tracing::debug!(error = %e, "Rejected login token");
        AuthError::InvalidToken
    })?;

    let claims = token_data.claims;
    if now.timestamp() >= claims.exp {
        tracing::debug!(exp = claims.exp, "Rejected expired login token");
        return Err(AuthError::InvalidToken);
    }
    if claims.email.trim().is_empty() {
        return Err(AuthError::InvalidToken);
    }

    Ok(claims.email)
}
