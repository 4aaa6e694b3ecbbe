//! Liveness probe.
//!
//! `GET /health` answers `{"status":"healthy"}` with 200 whenever the
//! process can serve requests. It checks no downstream and reads no state.

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
}

pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthStatus { status: "healthy" }))
}
