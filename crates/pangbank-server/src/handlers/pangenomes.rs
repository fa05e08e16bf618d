//! Pangenome endpoints.

use axum::{
    Json,
    body::Body,
    extract::State,
    http::Response,
};

use pangbank_core::config::layout::DOWNLOAD_NAME;
use pangbank_core::{GenomeInPangenomeView, GenomePangenomeLink, PangenomeView};

use crate::dto::{GenomesInPangenomeQuery, PangenomesQuery};
use crate::error::{ApiError, ErrorResponse};
use crate::extract::{ApiPath, ApiQuery};
use crate::handlers::download::stream_file;
use crate::state::AppState;

/// List pangenomes.
///
/// Each pangenome carries its metrics, its collection release and its
/// taxonomy.
#[utoipa::path(
    get,
    path = "/pangenomes/",
    params(PangenomesQuery),
    responses(
        (status = 200, description = "Pangenomes", body = [PangenomeView]),
        (status = 400, description = "Invalid filter or pagination", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "pangenomes"
)]
pub async fn list_pangenomes(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PangenomesQuery>,
) -> Result<Json<Vec<PangenomeView>>, ApiError> {
    let (filter, pagination) = query.into_parts();
    let pangenomes = state.catalog.list_pangenomes(&filter, pagination).await?;
    Ok(Json(pangenomes))
}

/// Count pangenomes matching the filters.
#[utoipa::path(
    get,
    path = "/pangenomes/count/",
    params(PangenomesQuery),
    responses(
        (status = 200, description = "Number of matching pangenomes", body = i64),
        (status = 400, description = "Invalid filter", body = ErrorResponse),
    ),
    tag = "pangenomes"
)]
pub async fn count_pangenomes(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PangenomesQuery>,
) -> Result<Json<i64>, ApiError> {
    let (filter, _) = query.into_parts();
    let count = state.catalog.count_pangenomes(&filter).await?;
    Ok(Json(count))
}

/// Get a pangenome by ID.
#[utoipa::path(
    get,
    path = "/pangenomes/{id}",
    params(
        ("id" = i64, Path, description = "Pangenome ID")
    ),
    responses(
        (status = 200, description = "Pangenome found", body = PangenomeView),
        (status = 404, description = "Pangenome not found", body = ErrorResponse),
    ),
    tag = "pangenomes"
)]
pub async fn get_pangenome(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<PangenomeView>, ApiError> {
    let pangenome = state
        .catalog
        .get_pangenome(id)
        .await?
        .ok_or_else(|| pangenome_not_found(id))?;

    Ok(Json(pangenome))
}

/// Download the HDF5 file of a pangenome.
#[utoipa::path(
    get,
    path = "/pangenomes/{id}/file",
    params(
        ("id" = i64, Path, description = "Pangenome ID")
    ),
    responses(
        (status = 200, description = "Pangenome file", content_type = "application/octet-stream"),
        (status = 404, description = "Pangenome or file not found", body = ErrorResponse),
    ),
    tag = "pangenomes"
)]
pub async fn get_pangenome_file(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Response<Body>, ApiError> {
    let path = state
        .catalog
        .pangenome_file(id)
        .await?
        .ok_or_else(|| pangenome_not_found(id))?;

    stream_file(&path, DOWNLOAD_NAME).await
}

/// List the genomes of a pangenome.
///
/// Each entry carries the genome's statistics within the pangenome and the
/// checksum and name of its sequence file.
#[utoipa::path(
    get,
    path = "/pangenomes/{id}/genomes",
    params(
        ("id" = i64, Path, description = "Pangenome ID"),
        GenomesInPangenomeQuery
    ),
    responses(
        (status = 200, description = "Genomes of the pangenome", body = [GenomePangenomeLink]),
        (status = 404, description = "Pangenome not found", body = ErrorResponse),
    ),
    tag = "pangenomes"
)]
pub async fn list_genomes_in_pangenome(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiQuery(query): ApiQuery<GenomesInPangenomeQuery>,
) -> Result<Json<Vec<GenomePangenomeLink>>, ApiError> {
    let (filter, pagination) = query.into_parts();
    let links = state
        .catalog
        .list_genomes_in_pangenome(id, &filter, pagination)
        .await?
        .ok_or_else(|| pangenome_not_found(id))?;

    Ok(Json(links))
}

/// Get one genome of a pangenome with its metadata.
#[utoipa::path(
    get,
    path = "/pangenomes/{id}/genomes/{genome_id}",
    params(
        ("id" = i64, Path, description = "Pangenome ID"),
        ("genome_id" = i64, Path, description = "Genome ID")
    ),
    responses(
        (status = 200, description = "Genome in pangenome", body = GenomeInPangenomeView),
        (status = 404, description = "Genome not found in pangenome", body = ErrorResponse),
    ),
    tag = "pangenomes"
)]
pub async fn get_genome_in_pangenome(
    State(state): State<AppState>,
    ApiPath((id, genome_id)): ApiPath<(i64, i64)>,
) -> Result<Json<GenomeInPangenomeView>, ApiError> {
    let view = state
        .catalog
        .get_genome_in_pangenome(id, genome_id)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!(
                "Genome with id={} not found in pangenome with id={}",
                genome_id, id
            ))
        })?;

    Ok(Json(view))
}

fn pangenome_not_found(id: i64) -> ApiError {
    ApiError::NotFound(format!("Pangenome with id={} not found", id))
}
