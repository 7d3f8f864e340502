//! Server configuration from flags, environment and `.env`.

use std::path::PathBuf;

use clap::builder::BoolishValueParser;
use clap::Parser;

use crate::auth::AuthConfig;
use crate::mailer::SmtpSettings;

/// Static assets shipped with the crate, used when `ASSETS_DIR` is unset.
pub const DEFAULT_ASSETS_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/assets");

#[derive(Clone, Parser)]
#[command(name = "logbook")]
#[command(about = "Event logbook with passwordless magic-link login")]
pub struct Config {
    /// HMAC secret used to sign login tokens
    #[arg(long, env = "JWT_SECRET", default_value = "", hide_env_values = true)]
    pub jwt_secret: String,

    /// Public origin used in magic links, e.g. https://log.example.com
    #[arg(long, env = "APP_ORIGIN", default_value = "")]
    pub app_origin: String,

    /// Bearer token for the admin endpoints
    #[arg(long, env = "ADMIN_TOKEN", default_value = "", hide_env_values = true)]
    pub admin_token: String,

    #[arg(long, env = "DATABASE_URL", default_value = "", hide_env_values = true)]
    pub database_url: String,

    /// Connect to Postgres over TLS
    #[arg(long, env = "DATABASE_TLS", value_parser = BoolishValueParser::new())]
    pub database_tls: bool,

    /// Comma-separated fixed allow-list. When unset the `users` table is used.
    #[arg(long, env = "ALLOWED_EMAILS", value_delimiter = ',')]
    pub allowed_emails: Option<Vec<String>>,

    /// SMTP relay. When unset magic links are only logged.
    #[arg(long, env = "SMTP_HOST")]
    pub smtp_host: Option<String>,

    #[arg(long, env = "SMTP_PORT", default_value_t = 587)]
    pub smtp_port: u16,

    #[arg(long, env = "SMTP_USER")]
    pub smtp_user: Option<String>,

    #[arg(long, env = "SMTP_PASS", hide_env_values = true)]
    pub smtp_pass: Option<String>,

    #[arg(long, env = "SMTP_FROM", default_value = "no-reply@localhost")]
    pub smtp_from: String,

    /// Plaintext SMTP, for local mail catchers only
    #[arg(long, env = "SMTP_INSECURE", value_parser = BoolishValueParser::new())]
    pub smtp_insecure: bool,

    /// Mark the session cookie `Secure`
    #[arg(long, env = "SECURE_COOKIES", value_parser = BoolishValueParser::new())]
    pub secure_cookies: bool,

    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Directory served under /assets (plot script)
    #[arg(long, env = "ASSETS_DIR", default_value = DEFAULT_ASSETS_DIR)]
    pub assets_dir: PathBuf,
}

impl Config {
    /// Check every setting and report all problems at once.
    pub fn validate(&self) -> anyhow::Result<()> {
        let mut problems = Vec::new();

        if self.jwt_secret.trim().is_empty() {
            problems.push("JWT_SECRET must be set");
        }
        if self.admin_token.trim().is_empty() {
            problems.push("ADMIN_TOKEN must be set");
        }
        if self.database_url.trim().is_empty() {
            problems.push("DATABASE_URL must be set");
        }

        let origin = self.app_origin.trim();
        if origin.is_empty() {
            problems.push("APP_ORIGIN must be set");
        } else if !origin.starts_with("http://") && !origin.starts_with("https://") {
            problems.push("APP_ORIGIN must start with http:// or https://");
        }

        if let Some(emails) = &self.allowed_emails {
            if emails.iter().all(|e| e.trim().is_empty()) {
                problems.push("ALLOWED_EMAILS is set but lists no addresses");
            }
        }

        if self.smtp_settings().is_some() && self.smtp_from.parse::<lettre::Address>().is_err() {
            problems.push("SMTP_FROM must be a valid email address");
        }

        if problems.is_empty() {
            Ok(())
        } else {
            anyhow::bail!("invalid configuration: {}", problems.join("; "))
        }
    }

    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig::new(
            self.jwt_secret.trim(),
            self.app_origin.trim(),
            self.admin_token.trim(),
        )
        .with_secure_cookies(self.secure_cookies)
    }

    /// SMTP settings, or `None` when no relay is configured.
    pub fn smtp_settings(&self) -> Option<SmtpSettings> {
        let host = self.smtp_host.as_deref().map(str::trim).unwrap_or_default();
        if host.is_empty() {
            return None;
        }

        Some(SmtpSettings {
            host: host.to_string(),
            port: self.smtp_port,
            username: self.smtp_user.clone(),
            password: self.smtp_pass.clone(),
            from: self.smtp_from.trim().to_string(),
            insecure: self.smtp_insecure,
        })
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("jwt_secret", &"<redacted>")
            .field("app_origin", &self.app_origin)
            .field("admin_token", &"<redacted>")
            .field("database_url", &"<redacted>")
            .field("database_tls", &self.database_tls)
            .field("allowed_emails", &self.allowed_emails)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_user", &self.smtp_user)
            .field("smtp_pass", &self.smtp_pass.as_ref().map(|_| "<redacted>"))
            .field("smtp_from", &self.smtp_from)
            .field("smtp_insecure", &self.smtp_insecure)
            .field("secure_cookies", &self.secure_cookies)
            .field("port", &self.port)
            .field("assets_dir", &self.assets_dir)
            .finish()
    }
}
