use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

use crate::db::models::{Comment, NewComment};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/posts/{id}/comment", post(add_comment))
        .route("/api/posts/{id}/comments", get(list_comments))
}

async fn add_comment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(comment): Json<NewComment>,
) -> AppResult<Json<serde_json::Value>> {
    if comment.text.trim().is_empty() {
        return Err(AppError::BadRequest("Comment cannot be empty".into()));
    }

    let (comment_id, timestamp) = state.store.add_comment(id, comment).await?;
    Ok(Json(json!({ "id": comment_id, "timestamp": timestamp })))
}

async fn list_comments(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<Comment>>> {
    Ok(Json(state.store.comments_for_post(id).await?))
}
