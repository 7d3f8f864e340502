use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User struct matching database column order exactly
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "diesel", derive(diesel::Queryable))]
pub struct User {
    pub id: Uuid,
    pub email: String, // always stored lower-cased
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// Event struct matching database column order exactly
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "diesel", derive(diesel::Queryable))]
pub struct Event {
    pub id: Uuid,
    pub tag: String,
    pub comment: String,
    pub value: String,
    pub recorded_at: DateTime<Utc>,
    /// Email of the recorder; replaced by the username when listing if known
    pub recorded_by: String,
}

/// Form body for `POST /record-event`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordEventRequest {
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub value: String,
}

/// Form body for `POST /login`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
}

/// JSON body for `POST /add-user`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddUserRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: String,
}

/// Entry of `GET /events.json`. Only events with a numeric value are exported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub tag: String,
    pub comment: String,
    pub value: String,
    pub value_num: f64,
    pub recorded_at: DateTime<Utc>,
    pub recorded_by: String,
}

impl EventResponse {
    /// Convert an event, dropping it when its value is empty or not a number.
    pub fn from_event(event: Event) -> Option<Self> {
        let value_num = event.value.trim().parse::<f64>().ok()?;
        if !value_num.is_finite() {
            return None;
        }

        Some(EventResponse {
            tag: event.tag,
            comment: event.comment,
            value: event.value,
            value_num,
            recorded_at: event.recorded_at,
            recorded_by: event.recorded_by,
        })
    }
}
