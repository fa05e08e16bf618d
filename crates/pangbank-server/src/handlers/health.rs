//! Health check endpoint.

use axum::{Json, extract::State};

use crate::dto::{HealthResponse, ServiceStatus};
use crate::error::ApiError;
use crate::state::AppState;

/// Health check endpoint.
///
/// Returns the server status, version and database reachability. A failing
/// database reports "degraded" rather than an error status.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Server status", body = HealthResponse),
    ),
    tag = "system"
)]
pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, ApiError> {
    let database = match state.catalog.health_check().await {
        Ok(()) => ServiceStatus {
            healthy: true,
            message: None,
        },
        Err(e) => {
            tracing::warn!("Database health check failed: {}", e);
            ServiceStatus {
                healthy: false,
                message: Some(e.to_string()),
            }
        }
    };

    let status = if database.healthy { "healthy" } else { "degraded" };

    Ok(Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database,
    }))
}
