//! Magic link issuance: allow-list check, token minting, mail dispatch.

use std::sync::Arc;

use thiserror::Error;

use crate::clock::Clock;
use crate::directory::{DirectoryError, UserDirectory};
use crate::mailer::{MagicLinkSender, MailError};

use super::jwt::{self, AuthError};
use super::types::AuthConfig;

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("email is required")]
    EmptyEmail,

    #[error("email is not on the allow-list")]
    NotAuthorized,

    #[error("could not check the user directory")]
    DirectoryUnavailable(#[source] DirectoryError),

    #[error("could not generate login token")]
    TokenGeneration(#[source] AuthError),

    #[error("could not send magic link")]
    MailDispatch(#[source] MailError),
}

pub struct MagicLinkIssuer {
    config: Arc<AuthConfig>,
    directory: Arc<dyn UserDirectory>,
    mailer: Arc<dyn MagicLinkSender>,
    clock: Arc<dyn Clock>,
}

impl MagicLinkIssuer {
    pub fn new(
        config: Arc<AuthConfig>,
        directory: Arc<dyn UserDirectory>,
        mailer: Arc<dyn MagicLinkSender>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            directory,
            mailer,
            clock,
        }
    }

    /// Send a login link to `email` if it is on the allow-list.
    ///
    /// The mailer is only reached once every earlier step has succeeded.
    /// Callers must not reveal which error occurred to the requester.
    pub async fn request_login(&self, email: &str) -> Result<(), LoginError> {
        let email = email.trim().to_lowercase();
        if email.is_empty() {
            return Err(LoginError::EmptyEmail);
        }

        let allowed = self
            .directory
            .is_user(&email)
            .await
            .map_err(LoginError::DirectoryUnavailable)?;
        if !allowed {
            return Err(LoginError::NotAuthorized);
        }

        let token = jwt::create_token(&self.config, &email, self.clock.now())
            .map_err(LoginError::TokenGeneration)?;
        let link = self.login_link(&token);

        self.mailer
            .send_magic_link(&email, &link)
            .await
            .map_err(LoginError::MailDispatch)?;

        tracing::info!(email = %email, "Magic login link sent");
        Ok(())
    }

    /// `{origin}/login?token={token}`
    pub fn login_link(&self, token: &str) -> String {
        format!(
            "{}/login?token={}",
            self.config.app_origin,
            urlencoding::encode(token)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::directory::StaticAllowList;
    use crate::test_support::{token_from_link, FlakyDirectory, RecordingMailer};
    use chrono::Utc;

    fn test_config() -> Arc<AuthConfig> {
        Arc::new(AuthConfig::new("issuer-test-secret", "https://log.example.com/", "admin"))
    }

    fn issuer_with(
        directory: Arc<dyn UserDirectory>,
        mailer: Arc<RecordingMailer>,
    ) -> (MagicLinkIssuer, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let issuer = MagicLinkIssuer::new(test_config(), directory, mailer, clock.clone());
        (issuer, clock)
    }

    fn allow_alice() -> Arc<dyn UserDirectory> {
        Arc::new(StaticAllowList::new(["alice@example.com"]))
    }

    #[tokio::test]
    async fn test_allowed_email_receives_valid_link() {
        let mailer = Arc::new(RecordingMailer::new());
        let (issuer, clock) = issuer_with(allow_alice(), mailer.clone());

        issuer.request_login("alice@example.com").await.unwrap();

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "alice@example.com");
        assert!(sent[0].1.starts_with("https://log.example.com/login?token="));

        let token = token_from_link(&sent[0].1);
        let email = jwt::validate_token(&test_config(), &token, clock.now()).unwrap();
        assert_eq!(email, "alice@example.com");
    }

    #[tokio::test]
    async fn test_email_is_normalised() {
        let mailer = Arc::new(RecordingMailer::new());
        let (issuer, _clock) = issuer_with(allow_alice(), mailer.clone());

        issuer.request_login("  Alice@Example.COM ").await.unwrap();

        assert_eq!(mailer.sent()[0].0, "alice@example.com");
    }

    #[tokio::test]
    async fn test_unknown_email_never_reaches_mailer() {
        let mailer = Arc::new(RecordingMailer::new());
        let (issuer, _clock) = issuer_with(allow_alice(), mailer.clone());

        let result = issuer.request_login("unknown@x.com").await;

        assert!(matches!(result, Err(LoginError::NotAuthorized)));
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_empty_email_rejected() {
        let mailer = Arc::new(RecordingMailer::new());
        let (issuer, _clock) = issuer_with(allow_alice(), mailer.clone());

        assert!(matches!(
            issuer.request_login("   ").await,
            Err(LoginError::EmptyEmail)
        ));
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_directory_failure_reported() {
        let mailer = Arc::new(RecordingMailer::new());
        let (issuer, _clock) = issuer_with(Arc::new(FlakyDirectory), mailer.clone());

        assert!(matches!(
            issuer.request_login("alice@example.com").await,
            Err(LoginError::DirectoryUnavailable(_))
        ));
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_mail_failure_reported() {
        let mailer = Arc::new(RecordingMailer::new_failing());
        let (issuer, _clock) = issuer_with(allow_alice(), mailer.clone());

        assert!(matches!(
            issuer.request_login("alice@example.com").await,
            Err(LoginError::MailDispatch(_))
        ));
    }
}
