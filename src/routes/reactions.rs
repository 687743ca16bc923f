use axum::extract::{Path, State};
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use crate::error::AppResult;
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TogglePayload {
    user_id: i64,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/posts/{id}/toggle-like", post(toggle_like))
        .route("/api/posts/{id}/toggle-report", post(toggle_report))
}

async fn toggle_like(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<TogglePayload>,
) -> AppResult<Json<serde_json::Value>> {
    let likes = state.store.toggle_like(id, payload.user_id).await?;
    Ok(Json(json!({ "likes": likes })))
}

async fn toggle_report(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<TogglePayload>,
) -> AppResult<Json<serde_json::Value>> {
    let reports = state.store.toggle_report(id, payload.user_id).await?;
    Ok(Json(json!({ "reports": reports })))
}
