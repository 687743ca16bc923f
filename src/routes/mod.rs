pub mod applications;
pub mod comments;
pub mod posts;
pub mod reactions;
pub mod uploads;
pub mod users;

use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Assemble the full application. CORS is open to any origin; the board's
/// clients are static pages served from elsewhere.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .merge(users::router())
        .merge(posts::router())
        .merge(reactions::router())
        .merge(comments::router())
        .merge(applications::router())
        .merge(uploads::router())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
