use axum::extract::{Multipart, Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

use crate::db::models::{Credentials, NewUser, ProfileUpdate, User};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/register", post(register))
        .route("/api/login", post(login))
        .route("/api/users/{username}", get(profile).put(update_profile))
}

async fn register(
    State(state): State<AppState>,
    Json(payload): Json<NewUser>,
) -> AppResult<Json<serde_json::Value>> {
    let id = state.store.register(payload).await?;
    Ok(Json(json!({ "id": id })))
}

async fn login(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> AppResult<Json<User>> {
    match state.store.login(&credentials).await? {
        Some(user) => Ok(Json(user)),
        None => Err(AppError::Unauthorized),
    }
}

async fn profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<Json<User>> {
    state
        .store
        .profile(&username)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

/// Multipart form: text fields plus an optional `profilePicture` part. A
/// file part replaces the stored picture with a fresh upload; a text part
/// is taken as the reference the client re-sent. Omitting the part writes
/// NULL, so keeping a picture means re-sending it.
async fn update_profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
    mut multipart: Multipart,
) -> AppResult<Json<serde_json::Value>> {
    let mut update = ProfileUpdate::default();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        match name.as_str() {
            "name" => update.name = field.text().await?,
            "contact" => update.contact = field.text().await?,
            "location" => update.location = field.text().await?,
            "password" => update.password = field.text().await?,
            "profilePicture" => {
                if let Some(filename) = field.file_name().map(str::to_string) {
                    let data = field.bytes().await?;
                    update.profile_picture = Some(state.uploads.save(&filename, &data).await?);
                } else {
                    let reference = field.text().await?;
                    if !reference.is_empty() {
                        update.profile_picture = Some(reference);
                    }
                }
            }
            _ => {}
        }
    }

    let picture = update.profile_picture.clone();
    let updated = state.store.update_profile(&username, update).await?;

    Ok(Json(json!({ "updated": updated, "profilePicture": picture })))
}
