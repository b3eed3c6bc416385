use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, patch, post},
    Router,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::dashboard))
        .route("/logs/pain", get(handlers::pain_log_page))
        .route("/logs/events", get(handlers::events_page))
        .route("/pain", post(handlers::submit_pain_form))
        .route("/pain/:id/delete", post(handlers::delete_pain_form))
        .route("/events", post(handlers::submit_event_form))
        .route("/events/:id/delete", post(handlers::delete_event_form))
        .route("/api/user", get(handlers::get_user))
        .route("/api/pain", get(handlers::list_pain).post(handlers::create_pain))
        .route(
            "/api/pain/:id",
            patch(handlers::update_pain).delete(handlers::delete_pain),
        )
        .route("/api/events", get(handlers::list_events).post(handlers::create_event))
        .route(
            "/api/events/:id",
            patch(handlers::update_event).delete(handlers::delete_event),
        )
        .route("/api/chart", get(handlers::get_chart))
        .with_state(state)
}
