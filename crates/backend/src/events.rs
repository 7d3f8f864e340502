//! Event log storage.

use std::collections::HashMap;

use async_trait::async_trait;
use shared_types::Event;

use crate::db::{self, DbPool};
use crate::models::NewEvent;

#[async_trait]
pub trait EventStore: Send + Sync {
    async fn record(&self, event: NewEvent) -> anyhow::Result<Event>;

    /// All events, newest first, attributed to the recorder's username when
    /// the directory knows the email.
    async fn get_all(&self) -> anyhow::Result<Vec<Event>>;
}

#[derive(Clone)]
pub struct PgEventStore {
    pool: DbPool,
}

impl PgEventStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventStore for PgEventStore {
    async fn record(&self, event: NewEvent) -> anyhow::Result<Event> {
        let mut conn = db::get_conn(&self.pool).await?;
        db::events::create(&mut conn, &event).await
    }

    async fn get_all(&self) -> anyhow::Result<Vec<Event>> {
        let mut conn = db::get_conn(&self.pool).await?;

        let events = db::events::list_all(&mut conn).await?;
        let usernames: HashMap<String, String> = db::users::list_all(&mut conn)
            .await?
            .into_iter()
            .map(|user| (user.email, user.username))
            .collect();

        Ok(attribute(events, &usernames))
    }
}

/// Replace recorder emails with usernames where one is known.
pub fn attribute(events: Vec<Event>, usernames: &HashMap<String, String>) -> Vec<Event> {
    events
        .into_iter()
        .map(|mut event| {
            if let Some(name) = usernames.get(&event.recorded_by.to_lowercase()) {
                event.recorded_by = name.clone();
            }
            event
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn event(recorded_by: &str) -> Event {
        Event {
            id: Uuid::new_v4(),
            tag: "coffee".to_string(),
            comment: String::new(),
            value: "1".to_string(),
            recorded_at: Utc::now(),
            recorded_by: recorded_by.to_string(),
        }
    }

    #[test]
    fn test_attribute_uses_known_usernames() {
        let usernames = HashMap::from([("alice@example.com".to_string(), "alice".to_string())]);
        let events = attribute(
            vec![event("alice@example.com"), event("bob@example.com")],
            &usernames,
        );

        assert_eq!(events[0].recorded_by, "alice");
        assert_eq!(events[1].recorded_by, "bob@example.com");
    }
}
