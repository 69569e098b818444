use crate::comments::{build_comments_view, CommentFilter};
use crate::errors::AppError;
use crate::models::{CommentQuery, CommentsView, DashboardView};
use crate::state::AppState;
use crate::ui;
use axum::{
    extract::{Query, State},
    response::{Html, Redirect},
    Form, Json,
};
use std::collections::BTreeMap;
use tracing::warn;

pub async fn index() -> Html<String> {
    Html(ui::render_form(None))
}

/// Flatten the submitted form and forward it to the backend. Binary outcome
/// per attempt: the page comes back with either the thanks banner and the
/// form marked submitted, or the fixed error banner.
pub async fn submit(
    State(state): State<AppState>,
    Form(answers): Form<BTreeMap<String, String>>,
) -> Html<String> {
    let outcome = state.backend.submit_survey(&answers).await;
    if let Err(err) = &outcome {
        warn!("survey submission failed: {err}");
    }
    Html(ui::render_form(Some(outcome.is_ok())))
}

/// Dashboard page. `area`/`q` only drive the in-memory comment filter; the
/// backend is contacted on the first visit and then only via the reload
/// action or the periodic refresh.
pub async fn dashboard(
    State(state): State<AppState>,
    Query(query): Query<CommentQuery>,
) -> Html<String> {
    state.ensure_loaded().await;
    let filter = CommentFilter::new(query.area, query.q);
    let data = state.dashboard.lock().await;
    Html(ui::render_dashboard(&data, &filter))
}

/// Manual reload: re-fetch stats and comments, then back to the page.
pub async fn reload(State(state): State<AppState>) -> Redirect {
    state.refresh_all().await;
    Redirect::to("/dashboard")
}

pub async fn api_dashboard(
    State(state): State<AppState>,
) -> Result<Json<DashboardView>, AppError> {
    state.ensure_loaded().await;
    let data = state.dashboard.lock().await;
    match &data.view {
        Some(view) => Ok(Json(view.clone())),
        None => Err(AppError::upstream("estadísticas no disponibles")),
    }
}

pub async fn api_comments(
    State(state): State<AppState>,
    Query(query): Query<CommentQuery>,
) -> Result<Json<CommentsView>, AppError> {
    state.ensure_loaded().await;
    let data = state.dashboard.lock().await;
    if data.comments_failed {
        return Err(AppError::upstream("comentarios no disponibles"));
    }
    let filter = CommentFilter::new(query.area, query.q);
    Ok(Json(build_comments_view(&data.comments, &filter)))
}
