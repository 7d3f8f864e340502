// Database models for Diesel
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Insertable struct for new events
#[derive(Debug, Clone, PartialEq, Eq, Insertable)]
#[diesel(table_name = crate::schema::events)]
pub struct NewEvent {
    pub tag: String,
    pub comment: String,
    pub value: String,
    pub recorded_at: DateTime<Utc>,
    pub recorded_by: String,
}
