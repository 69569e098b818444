use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/encuesta", post(handlers::submit))
        .route("/dashboard", get(handlers::dashboard))
        .route("/dashboard/reload", post(handlers::reload))
        .route("/api/dashboard", get(handlers::api_dashboard))
        .route("/api/comments", get(handlers::api_comments))
        .with_state(state)
}
