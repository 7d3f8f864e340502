//! In-memory collaborators for handler and router tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use shared_types::Event;
use uuid::Uuid;

use crate::auth::AuthConfig;
use crate::clock::ManualClock;
use crate::directory::{DirectoryError, UserDirectory};
use crate::events::EventStore;
use crate::mailer::{MagicLinkSender, MailError};
use crate::models::NewEvent;
use crate::AppState;

pub const TEST_SECRET: &str = "router-test-secret";
pub const TEST_ORIGIN: &str = "http://localhost:8080";
pub const TEST_ADMIN_TOKEN: &str = "admin-secret";

/// Mailer that keeps every `(to, link)` pair instead of sending it.
pub struct RecordingMailer {
    sent: Mutex<Vec<(String, String)>>,
    fail: bool,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    pub fn new_failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MagicLinkSender for RecordingMailer {
    async fn send_magic_link(&self, to: &str, link: &str) -> Result<(), MailError> {
        if self.fail {
            let source = "not an address".parse::<lettre::Address>().unwrap_err();
            return Err(MailError::InvalidAddress {
                address: to.to_string(),
                source,
            });
        }

        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), link.to_string()));
        Ok(())
    }
}

/// Directory whose storage is always down.
pub struct FlakyDirectory;

#[async_trait]
impl UserDirectory for FlakyDirectory {
    async fn is_user(&self, _email: &str) -> Result<bool, DirectoryError> {
        Err(DirectoryError::Unavailable(anyhow::anyhow!("connection refused")))
    }

    async fn add_user(&self, _email: &str, _username: &str) -> Result<(), DirectoryError> {
        Err(DirectoryError::Unavailable(anyhow::anyhow!("connection refused")))
    }
}

/// Writable directory keyed by lower-cased email.
#[derive(Default)]
pub struct MemoryDirectory {
    users: Mutex<HashMap<String, String>>,
}

impl MemoryDirectory {
    pub fn with_users(users: &[(&str, &str)]) -> Self {
        let users = users
            .iter()
            .map(|(email, username)| (email.to_lowercase(), username.to_string()))
            .collect();

        Self {
            users: Mutex::new(users),
        }
    }
}

#[async_trait]
impl UserDirectory for MemoryDirectory {
    async fn is_user(&self, email: &str) -> Result<bool, DirectoryError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .contains_key(&email.trim().to_lowercase()))
    }

    async fn add_user(&self, email: &str, username: &str) -> Result<(), DirectoryError> {
        let email = email.trim().to_lowercase();
        let mut users = self.users.lock().unwrap();
        if users.contains_key(&email) {
            return Err(DirectoryError::AlreadyExists(email));
        }
        users.insert(email, username.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryEventStore {
    events: Mutex<Vec<Event>>,
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn record(&self, event: NewEvent) -> anyhow::Result<Event> {
        let event = Event {
            id: Uuid::new_v4(),
            tag: event.tag,
            comment: event.comment,
            value: event.value,
            recorded_at: event.recorded_at,
            recorded_by: event.recorded_by,
        };
        self.events.lock().unwrap().push(event.clone());
        Ok(event)
    }

    async fn get_all(&self) -> anyhow::Result<Vec<Event>> {
        let mut events = self.events.lock().unwrap().clone();
        events.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        Ok(events)
    }
}

/// Token query parameter of a magic link.
pub fn token_from_link(link: &str) -> String {
    let (_, token) = link
        .split_once("token=")
        .expect("link should carry a token");
    urlencoding::decode(token)
        .expect("token should be valid UTF-8")
        .into_owned()
}

/// Handles on the collaborators behind a test [`AppState`].
pub struct TestHarness {
    pub state: AppState,
    pub mailer: Arc<RecordingMailer>,
    pub events: Arc<MemoryEventStore>,
    pub clock: Arc<ManualClock>,
}

pub fn test_state(directory: Arc<dyn UserDirectory>) -> TestHarness {
    let mailer = Arc::new(RecordingMailer::new());
    let events = Arc::new(MemoryEventStore::default());
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let auth_config = Arc::new(AuthConfig::new(TEST_SECRET, TEST_ORIGIN, TEST_ADMIN_TOKEN));

    let state = AppState::new(
        auth_config,
        directory,
        events.clone(),
        mailer.clone(),
        clock.clone(),
    );

    TestHarness {
        state,
        mailer,
        events,
        clock,
    }
}
