//! Liveness probe.

use axum::extract::State;
use axum::response::Json;
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub timestamp: String,
    pub service: String,
    pub version: String,
}

/// `GET /api/health`: always 200 while the process is live.
pub async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        timestamp: now_rfc3339(),
        service: state.config.service_name.clone(),
        version: state.config.service_version.clone(),
    })
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default()
}

#[cfg(test)]
#[path = "health_test.rs"]
mod tests;
