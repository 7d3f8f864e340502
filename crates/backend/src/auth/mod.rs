//! Passwordless authentication with magic links.
//!
//! This module provides:
//! - Login token creation and validation (`jwt`)
//! - Magic link issuance for allow-listed emails (`magic_link`)
//! - Session cookie construction (`session`)
//! - `require_login` middleware for protecting routes
//! - `require_admin_token` middleware for the admin endpoints

mod handlers;
pub mod jwt;
pub mod magic_link;
mod middleware;
pub mod session;
pub mod types;

pub use handlers::{check_your_email, landing, login_request, login_with_token, logout};
pub use magic_link::MagicLinkIssuer;
pub use middleware::{require_admin_token, require_login};
pub use types::{AuthConfig, AuthUser};
