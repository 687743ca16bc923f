use axum::extract::{Multipart, Path, Query, State};
use axum::routing::{get, put};
use axum::{Json, Router};
use serde_json::json;

use crate::db::models::{is_valid_category, EditPost, NewPost, Post, PostFilter};
use crate::error::{AppError, AppResult};
use crate::sanitize::clean_embed;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/posts", get(list_posts).post(create_post))
        .route("/api/posts/{id}", put(edit_post).delete(delete_post))
}

async fn create_post(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<serde_json::Value>> {
    let mut title = String::new();
    let mut content = String::new();
    let mut author = String::new();
    let mut category = String::new();
    let mut link: Option<String> = None;
    let mut location_raw: Option<String> = None;
    let mut image: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        match name.as_str() {
            "title" => title = field.text().await?,
            "content" => content = field.text().await?,
            "author" => author = field.text().await?,
            "category" => category = field.text().await?,
            "link" => {
                let value = field.text().await?;
                if !value.is_empty() {
                    link = Some(value);
                }
            }
            "location" => location_raw = Some(field.text().await?),
            "image" => {
                let filename = field
                    .file_name()
                    .map(str::to_string)
                    .unwrap_or_else(|| "image".to_string());
                let data = field.bytes().await?;
                if !data.is_empty() {
                    image = Some(state.uploads.save(&filename, &data).await?);
                }
            }
            _ => {}
        }
    }

    for (value, field) in [
        (&title, "title"),
        (&content, "content"),
        (&author, "author"),
        (&category, "category"),
    ] {
        if value.trim().is_empty() {
            return Err(AppError::BadRequest(format!(
                "Missing required field: {field}"
            )));
        }
    }
    if !is_valid_category(&category) {
        return Err(AppError::BadRequest(format!(
            "Unknown category: {category}"
        )));
    }

    let location = match location_raw {
        Some(raw) => clean_embed(&raw)?,
        None => None,
    };

    let id = state
        .store
        .create_post(NewPost {
            title,
            content,
            author,
            category,
            image,
            link,
            location,
        })
        .await?;

    Ok(Json(json!({ "id": id })))
}

async fn list_posts(
    State(state): State<AppState>,
    Query(filter): Query<PostFilter>,
) -> AppResult<Json<Vec<Post>>> {
    Ok(Json(state.store.list_posts(&filter).await?))
}

async fn edit_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(edit): Json<EditPost>,
) -> AppResult<Json<serde_json::Value>> {
    let updated = state.store.edit_post(id, edit).await?;
    if updated == 0 {
        return Err(AppError::NotFound("Post not found".to_string()));
    }
    Ok(Json(json!({ "updated": updated })))
}

async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<serde_json::Value>> {
    let deleted = state.store.delete_post(id).await?;
    Ok(Json(json!({ "deleted": deleted })))
}
