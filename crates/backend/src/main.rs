use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod auth;
mod clock;
mod config;
mod db;
mod directory;
pub mod error;
mod events;
mod handlers;
mod mailer;
mod models;
mod pages;
mod routes;
mod schema;
#[cfg(test)]
mod test_support;

use auth::{AuthConfig, MagicLinkIssuer};
use clock::{Clock, SystemClock};
use directory::{PgUserDirectory, StaticAllowList, UserDirectory};
use events::{EventStore, PgEventStore};
use mailer::{LogMailer, MagicLinkSender, SmtpMailer};

/// Shared, read-only application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub auth_config: Arc<AuthConfig>,
    pub directory: Arc<dyn UserDirectory>,
    pub events: Arc<dyn EventStore>,
    pub issuer: Arc<MagicLinkIssuer>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(
        auth_config: Arc<AuthConfig>,
        directory: Arc<dyn UserDirectory>,
        events: Arc<dyn EventStore>,
        mailer: Arc<dyn MagicLinkSender>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let issuer = Arc::new(MagicLinkIssuer::new(
            auth_config.clone(),
            directory.clone(),
            mailer,
            clock.clone(),
        ));

        Self {
            auth_config,
            directory,
            events,
            issuer,
            clock,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Both lettre and tokio-postgres-rustls need a process-wide provider
    let _ = rustls::crypto::ring::default_provider().install_default();

    let config = config::Config::parse();
    config.validate()?;
    tracing::debug!(?config, "Loaded configuration");

    let pool = db::establish_connection_pool(&config.database_url, config.database_tls)?;
    db::init_schema(&pool)
        .await
        .context("Failed to initialize database schema")?;

    let directory: Arc<dyn UserDirectory> = match &config.allowed_emails {
        Some(emails) => {
            let list = StaticAllowList::new(emails);
            tracing::info!(count = list.len(), "Using configured email allow-list");
            Arc::new(list)
        }
        None => {
            tracing::info!("Using database user directory");
            Arc::new(PgUserDirectory::new(pool.clone()))
        }
    };

    let mailer: Arc<dyn MagicLinkSender> = match config.smtp_settings() {
        Some(settings) => {
            tracing::info!(host = %settings.host, port = settings.port, "Sending magic links over SMTP");
            Arc::new(SmtpMailer::new(&settings).context("Failed to configure SMTP transport")?)
        }
        None => {
            tracing::warn!("SMTP_HOST not set, magic links will only be logged");
            Arc::new(LogMailer)
        }
    };

    let state = AppState::new(
        Arc::new(config.auth_config()),
        directory,
        Arc::new(PgEventStore::new(pool)),
        mailer,
        Arc::new(SystemClock),
    );

    tracing::info!(assets_dir = %config.assets_dir.display(), "Serving static assets");
    let app = routes::build_router(state, &config.assets_dir);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
