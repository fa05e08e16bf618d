//! Genome endpoints.

use axum::{Json, extract::State};

use pangbank_core::GenomeView;

use crate::dto::GenomesQuery;
use crate::error::{ApiError, ErrorResponse};
use crate::extract::{ApiPath, ApiQuery};
use crate::state::AppState;

/// List genomes.
///
/// Each genome carries its source and its taxonomies, one per taxonomy
/// source, taxa ordered by depth.
#[utoipa::path(
    get,
    path = "/genomes/",
    params(GenomesQuery),
    responses(
        (status = 200, description = "Genomes", body = [GenomeView]),
        (status = 400, description = "Invalid filter or pagination", body = ErrorResponse),
    ),
    tag = "genomes"
)]
pub async fn list_genomes(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<GenomesQuery>,
) -> Result<Json<Vec<GenomeView>>, ApiError> {
    let (filter, pagination) = query.into_parts();
    let genomes = state.catalog.list_genomes(&filter, pagination).await?;
    Ok(Json(genomes))
}

/// Get a genome by ID.
#[utoipa::path(
    get,
    path = "/genomes/{id}",
    params(
        ("id" = i64, Path, description = "Genome ID")
    ),
    responses(
        (status = 200, description = "Genome found", body = GenomeView),
        (status = 404, description = "Genome not found", body = ErrorResponse),
    ),
    tag = "genomes"
)]
pub async fn get_genome(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<GenomeView>, ApiError> {
    let genome = state
        .catalog
        .get_genome(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Genome with id={} not found", id)))?;

    Ok(Json(genome))
}
