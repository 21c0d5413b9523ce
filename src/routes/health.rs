// src/routes/health.rs
//! API health check endpoint for the aquafield backend.
//!
//! Defines the `/health` route used by container orchestrators and CI
//! pipelines to verify that the service is up. Sibling module in the
//! `routes` directory (EMBP): the handler stays internal, the gateway
//! (`mod.rs`) merges the exported subrouter, and `main.rs` never sees
//! individual endpoints.

use axum::{routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// JSON response body for the `/health` endpoint.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: DateTime<Utc>,
}

/// Handle `GET /health`.
///
/// Deliberately lightweight: reports reachability and the server clock
/// without touching the database or any other dependency.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        timestamp: Utc::now(),
    })
}

/// Create a subrouter containing the `/health` route.
///
/// Generic over the application state so it merges cleanly with the
/// gateway router regardless of the state type (e.g., `(PgPool, Config)`).
pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/health", get(health))
}
