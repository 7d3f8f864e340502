use std::path::Path;

use axum::{
    http::{header, HeaderValue},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer};

use crate::auth;
use crate::handlers;
use crate::AppState;

// The plots page imports its chart module from jsDelivr
const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; \
     script-src 'self' https://cdn.jsdelivr.net; \
     connect-src 'self'; \
     form-action 'self'; \
     frame-ancestors 'none'; \
     base-uri 'none'";

pub fn build_router(state: AppState, assets_dir: &Path) -> Router {
    // Routes behind the session cookie
    let protected = Router::new()
        .route(
            "/record-event",
            get(handlers::record_event_form).post(handlers::record_event),
        )
        .route("/all-events", get(handlers::all_events))
        .route("/events.json", get(handlers::events_json))
        .route("/plots", get(handlers::plots))
        .route("/logout", get(auth::logout))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_login,
        ));

    let admin = Router::new()
        .route("/add-user", post(handlers::add_user))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_admin_token,
        ));

    Router::new()
        .route("/", get(auth::landing))
        .route(
            "/login",
            get(auth::login_with_token).post(auth::login_request),
        )
        .route("/check-your-email", get(auth::check_your_email))
        .route("/health", get(handlers::health_check))
        .nest_service("/assets", ServeDir::new(assets_dir))
        .merge(protected)
        .merge(admin)
        // Security headers on every response
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static(CONTENT_SECURITY_POLICY),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_XSS_PROTECTION,
            HeaderValue::from_static("1; mode=block"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
