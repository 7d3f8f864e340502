//! Who may log in.
//!
//! Both backings expose the same [`UserDirectory`] capability so the magic
//! link issuer does not care whether the allow-list is a fixed list from the
//! configuration or the `users` table.

use std::collections::HashSet;

use async_trait::async_trait;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

use crate::db::{self, DbPool};

#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Storage could not be reached or the query failed
    #[error("user directory unavailable")]
    Unavailable(#[source] anyhow::Error),

    #[error("user {0} already exists")]
    AlreadyExists(String),

    #[error("the configured allow-list cannot be modified")]
    ReadOnly,
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Case-insensitive membership test. Absence is `Ok(false)`.
    async fn is_user(&self, email: &str) -> Result<bool, DirectoryError>;

    async fn add_user(&self, email: &str, username: &str) -> Result<(), DirectoryError>;
}

/// Fixed allow-list, compared case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct StaticAllowList {
    emails: HashSet<String>,
}

impl StaticAllowList {
    pub fn new<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let emails = emails
            .into_iter()
            .map(|e| e.as_ref().trim().to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();

        Self { emails }
    }

    pub fn len(&self) -> usize {
        self.emails.len()
    }
}

#[async_trait]
impl UserDirectory for StaticAllowList {
    async fn is_user(&self, email: &str) -> Result<bool, DirectoryError> {
        Ok(self.emails.contains(&email.trim().to_lowercase()))
    }

    async fn add_user(&self, _email: &str, _username: &str) -> Result<(), DirectoryError> {
        Err(DirectoryError::ReadOnly)
    }
}

/// Allow-list backed by the `users` table.
#[derive(Clone)]
pub struct PgUserDirectory {
    pool: DbPool,
}

impl PgUserDirectory {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn is_user(&self, email: &str) -> Result<bool, DirectoryError> {
        let mut conn = db::get_conn(&self.pool)
            .await
            .map_err(DirectoryError::Unavailable)?;

        let count = db::users::count_by_email(&mut conn, email.trim())
            .await
            .map_err(DirectoryError::Unavailable)?;

        Ok(count > 0)
    }

    async fn add_user(&self, email: &str, username: &str) -> Result<(), DirectoryError> {
        let mut conn = db::get_conn(&self.pool)
            .await
            .map_err(DirectoryError::Unavailable)?;

        match db::users::create(&mut conn, email.trim(), username).await {
            Ok(user) => {
                tracing::info!(email = %user.email, username = %user.username, "Added user");
                Ok(())
            }
            Err(e) => Err(classify_insert_error(email, e)),
        }
    }
}

fn classify_insert_error(email: &str, err: DieselError) -> DirectoryError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            DirectoryError::AlreadyExists(email.trim().to_lowercase())
        }
        other => DirectoryError::Unavailable(other.into()),
    }
}
