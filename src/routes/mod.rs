use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Json, Router};
use serde_json::json;
use sqlx::PgPool;

use crate::Config;

mod auth;
mod health;
mod users;
mod water_usage;

// ---

pub fn router(pool: PgPool, config: Config) -> Router {
    // ---
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(users::router())
        .merge(water_usage::router())
        .fallback(not_found)
        .with_state((pool, config))
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "message": "Route not found",
        })),
    )
}

/// Pagination envelope shared by every listing endpoint.
pub(crate) fn pagination(page: i64, limit: i64, total: i64) -> serde_json::Value {
    // ---
    json!({
        "page": page,
        "limit": limit,
        "total": total,
        "pages": (total + limit - 1) / limit,
    })
}
