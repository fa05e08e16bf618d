//! Catalog statistics endpoint.

use axum::{Json, extract::State};

use crate::dto::StatsResponse;
use crate::error::{ApiError, ErrorResponse};
use crate::state::AppState;

/// Get catalog statistics.
///
/// Returns row counts of collections, releases, pangenomes, genomes and
/// taxonomy sources.
#[utoipa::path(
    get,
    path = "/stats",
    responses(
        (status = 200, description = "Catalog statistics", body = StatsResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "system"
)]
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, ApiError> {
    let stats = state.catalog.stats().await?;
    Ok(Json(StatsResponse::from(stats)))
}
