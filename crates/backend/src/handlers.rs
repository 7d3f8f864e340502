use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Html,
    Extension, Form, Json,
};
use shared_types::{AddUserRequest, EventResponse, RecordEventRequest};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::models::NewEvent;
use crate::pages;
use crate::AppState;

pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

// Event handlers
pub async fn record_event_form() -> Html<String> {
    Html(pages::record_event(false))
}

pub async fn record_event(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Form(payload): Form<RecordEventRequest>,
) -> ApiResult<Html<String>> {
    let tag = payload.tag.trim();
    if tag.is_empty() {
        return Err(ApiError::bad_request("tag is required"));
    }

    let event = state
        .events
        .record(NewEvent {
            tag: tag.to_string(),
            comment: payload.comment,
            value: payload.value.trim().to_string(),
            recorded_at: state.clock.now(),
            recorded_by: user.email,
        })
        .await?;

    tracing::info!(tag = %event.tag, recorded_by = %event.recorded_by, "Event recorded");

    Ok(Html(pages::record_event(true)))
}

pub async fn all_events(State(state): State<AppState>) -> ApiResult<Html<String>> {
    let events = state.events.get_all().await?;

    Ok(Html(pages::all_events(&events)))
}

pub async fn plots(State(state): State<AppState>) -> ApiResult<Html<String>> {
    let events = state.events.get_all().await?;

    Ok(Html(pages::plots(events.len())))
}

pub async fn events_json(State(state): State<AppState>) -> ApiResult<Json<Vec<EventResponse>>> {
    let events = state.events.get_all().await?;

    let responses: Vec<EventResponse> = events
        .into_iter()
        .filter_map(EventResponse::from_event)
        .collect();

    Ok(Json(responses))
}

// Admin handlers
pub async fn add_user(
    State(state): State<AppState>,
    payload: Result<Json<AddUserRequest>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let Json(payload) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let email = payload.email.trim().to_lowercase();
    let username = payload.username.trim();
    if email.is_empty() || username.is_empty() {
        return Err(ApiError::bad_request("email and username are required"));
    }

    state.directory.add_user(&email, username).await?;

    Ok(StatusCode::CREATED)
}
