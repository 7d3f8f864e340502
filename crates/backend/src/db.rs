use diesel::prelude::*;
use diesel_async::{
    pooled_connection::{
        deadpool::{Object, Pool},
        AsyncDieselConnectionManager, ManagerConfig,
    },
    AsyncPgConnection, RunQueryDsl, SimpleAsyncConnection,
};
use shared_types::{Event, User};

use crate::models::NewEvent;

pub type DbPool = Pool<AsyncPgConnection>;
pub type DbConn = Object<AsyncPgConnection>;

diesel::define_sql_function!(fn lower(x: diesel::sql_types::Text) -> diesel::sql_types::Text);

/// Tables and indexes, created idempotently at startup.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    email VARCHAR NOT NULL,
    username VARCHAR NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
CREATE UNIQUE INDEX IF NOT EXISTS users_email_lower_key ON users (LOWER(email));

CREATE TABLE IF NOT EXISTS events (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    tag VARCHAR NOT NULL,
    comment TEXT NOT NULL DEFAULT '',
    value VARCHAR NOT NULL DEFAULT '',
    recorded_at TIMESTAMPTZ NOT NULL,
    recorded_by VARCHAR NOT NULL
);
CREATE INDEX IF NOT EXISTS events_recorded_at_idx ON events (recorded_at DESC);
"#;

async fn establish_tls_connection(config: String) -> diesel::ConnectionResult<AsyncPgConnection> {
    let root_store =
        rustls::RootCertStore::from_iter(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    let tls_config = rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();
    let tls = tokio_postgres_rustls::MakeRustlsConnect::new(tls_config);

    let (client, connection) = tokio_postgres::connect(&config, tls)
        .await
        .map_err(|e| diesel::ConnectionError::BadConnection(e.to_string()))?;

    // The connection future drives the socket; it must outlive the client
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!("Connection error: {}", e);
        }
    });

    AsyncPgConnection::try_from(client).await
}

pub fn establish_connection_pool(database_url: &str, tls: bool) -> anyhow::Result<DbPool> {
    let config = if tls {
        let mut manager_config = ManagerConfig::default();
        manager_config.custom_setup =
            Box::new(|url| Box::pin(establish_tls_connection(url.to_string())));

        AsyncDieselConnectionManager::<AsyncPgConnection>::new_with_config(
            database_url,
            manager_config,
        )
    } else {
        AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url)
    };

    let pool = Pool::builder(config).build()?;

    Ok(pool)
}

pub async fn get_conn(pool: &DbPool) -> anyhow::Result<DbConn> {
    Ok(pool.get().await?)
}

pub async fn init_schema(pool: &DbPool) -> anyhow::Result<()> {
    let mut conn = get_conn(pool).await?;
    conn.batch_execute(SCHEMA).await?;

    tracing::info!("Database schema is up to date");
    Ok(())
}

// User directory database operations
pub mod users {
    use super::*;

    pub async fn count_by_email(
        conn: &mut AsyncPgConnection,
        email_val: &str,
    ) -> anyhow::Result<i64> {
        use crate::schema::users::dsl::*;

        let count = users
            .filter(lower(email).eq(email_val.to_lowercase()))
            .count()
            .get_result::<i64>(conn)
            .await?;

        Ok(count)
    }

    pub async fn list_all(conn: &mut AsyncPgConnection) -> anyhow::Result<Vec<User>> {
        use crate::schema::users::dsl::*;

        let items = users.order_by(created_at.asc()).load::<User>(conn).await?;

        Ok(items)
    }

    /// Insert a user. The email is stored lower-cased; a case-insensitive
    /// duplicate violates `users_email_lower_key`.
    pub async fn create(
        conn: &mut AsyncPgConnection,
        email_val: &str,
        username_val: &str,
    ) -> Result<User, diesel::result::Error> {
        use crate::schema::users::dsl::*;

        diesel::insert_into(users)
            .values((
                email.eq(email_val.to_lowercase()),
                username.eq(username_val),
            ))
            .get_result::<User>(conn)
            .await
    }
}

// Event database operations
pub mod events {
    use super::*;

    pub async fn list_all(conn: &mut AsyncPgConnection) -> anyhow::Result<Vec<Event>> {
        use crate::schema::events::dsl::*;

        let items = events
            .order_by(recorded_at.desc())
            .load::<Event>(conn)
            .await?;

        Ok(items)
    }

    pub async fn create(conn: &mut AsyncPgConnection, new_event: &NewEvent) -> anyhow::Result<Event> {
        use crate::schema::events::dsl::*;

        let event = diesel::insert_into(events)
            .values(new_event)
            .get_result::<Event>(conn)
            .await?;

        Ok(event)
    }
}
