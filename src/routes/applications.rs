use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use crate::db::models::{Application, NewApplication};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Deserialize)]
struct ReceivedQuery {
    author: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/posts/{id}/apply", post(apply))
        .route("/api/applications", get(received))
}

/// The application form re-sends the post id in its body; the body value is
/// the one that counts, matching what submitting clients have always sent.
async fn apply(
    State(state): State<AppState>,
    Path(_post_id): Path<i64>,
    Json(application): Json<NewApplication>,
) -> AppResult<Json<serde_json::Value>> {
    let (id, timestamp) = state.store.apply(application).await?;
    Ok(Json(json!({ "id": id, "timestamp": timestamp })))
}

async fn received(
    State(state): State<AppState>,
    Query(query): Query<ReceivedQuery>,
) -> AppResult<Json<Vec<Application>>> {
    let author = query
        .author
        .filter(|author| !author.is_empty())
        .ok_or_else(|| AppError::BadRequest("Author query parameter is required".to_string()))?;

    Ok(Json(state.store.applications_for_author(&author).await?))
}
