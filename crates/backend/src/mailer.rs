//! Magic link delivery.

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use thiserror::Error;

pub const MAGIC_LINK_SUBJECT: &str = "Your Magic Login Link";

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid email address {address:?}")]
    InvalidAddress {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },

    #[error("failed to build email message")]
    Build(#[from] lettre::error::Error),

    #[error("failed to send email")]
    Transport(#[from] lettre::transport::smtp::Error),
}

/// Delivers a login link to a user.
#[async_trait]
pub trait MagicLinkSender: Send + Sync {
    async fn send_magic_link(&self, to: &str, link: &str) -> Result<(), MailError>;
}

/// Plain-text body of the magic link email.
pub fn magic_link_body(link: &str) -> String {
    format!(
        "Click the following link to log in:\n\n{}\n\nThe link is valid for 15 minutes. \
         If you did not ask to log in you can ignore this email.\n",
        link
    )
}

#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: String,
    /// Plaintext SMTP without STARTTLS, for local mail catchers
    pub insecure: bool,
}

/// SMTP-based sender
pub struct SmtpMailer {
    from: Mailbox,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(settings: &SmtpSettings) -> Result<Self, MailError> {
        let from = parse_mailbox(&settings.from)?;

        let builder = if settings.insecure {
            tracing::warn!(
                host = %settings.host,
                port = settings.port,
                "Using insecure (unencrypted) SMTP transport - only use for local development!"
            );
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)?
        };
        let builder = builder.port(settings.port);

        // Mail catchers reject AUTH, so only authenticate when a user is configured
        let transport = match (&settings.username, &settings.password) {
            (Some(user), password) if !user.is_empty() => builder
                .credentials(Credentials::new(
                    user.clone(),
                    password.clone().unwrap_or_default(),
                ))
                .build(),
            _ => builder.build(),
        };

        Ok(Self { from, transport })
    }
}

#[async_trait]
impl MagicLinkSender for SmtpMailer {
    async fn send_magic_link(&self, to: &str, link: &str) -> Result<(), MailError> {
        let email = build_message(self.from.clone(), to, link)?;

        self.transport.send(email).await?;

        tracing::info!(to = %to, "Magic link email sent");
        Ok(())
    }
}

/// Sender that only logs the link. Used when no SMTP host is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

#[async_trait]
impl MagicLinkSender for LogMailer {
    async fn send_magic_link(&self, to: &str, link: &str) -> Result<(), MailError> {
        tracing::info!(to = %to, link = %link, "SMTP not configured, magic link logged instead of sent");
        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, MailError> {
    address.parse().map_err(|source| MailError::InvalidAddress {
        address: address.to_string(),
        source,
    })
}

fn build_message(from: Mailbox, to: &str, link: &str) -> Result<Message, MailError> {
    let to = parse_mailbox(to)?;

    let message = Message::builder()
        .from(from)
        .to(to)
        .subject(MAGIC_LINK_SUBJECT)
        .header(ContentType::TEXT_PLAIN)
        .body(magic_link_body(link))?;

    Ok(message)
}
