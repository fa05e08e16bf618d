//! Collection endpoints.

use axum::{
    Json,
    body::Body,
    extract::State,
    http::Response,
};

use pangbank_core::{CollectionFilter, CollectionView};

use crate::dto::CollectionsQuery;
use crate::error::{ApiError, ErrorResponse};
use crate::extract::{ApiPath, ApiQuery};
use crate::handlers::download::stream_file;
use crate::state::AppState;

/// List collections.
///
/// Each collection carries its releases, highest version first, with their
/// pangenome counts.
#[utoipa::path(
    get,
    path = "/collections/",
    params(CollectionsQuery),
    responses(
        (status = 200, description = "Collections", body = [CollectionView]),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "collections"
)]
pub async fn list_collections(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<CollectionsQuery>,
) -> Result<Json<Vec<CollectionView>>, ApiError> {
    let filter = CollectionFilter::from(query);
    let collections = state.catalog.list_collections(&filter).await?;
    Ok(Json(collections))
}

/// Get a collection by ID.
#[utoipa::path(
    get,
    path = "/collections/{id}",
    params(
        ("id" = i64, Path, description = "Collection ID")
    ),
    responses(
        (status = 200, description = "Collection found", body = CollectionView),
        (status = 404, description = "Collection not found", body = ErrorResponse),
    ),
    tag = "collections"
)]
pub async fn get_collection(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<CollectionView>, ApiError> {
    let collection = state
        .catalog
        .get_collection(id)
        .await?
        .ok_or_else(|| collection_not_found(id))?;

    Ok(Json(collection))
}

/// Download the mash sketch of a collection.
///
/// Serves the sketch of the collection's highest release.
#[utoipa::path(
    get,
    path = "/collections/{id}/mash_sketch",
    params(
        ("id" = i64, Path, description = "Collection ID")
    ),
    responses(
        (status = 200, description = "Mash sketch file", content_type = "application/octet-stream"),
        (status = 404, description = "Collection or sketch not found", body = ErrorResponse),
    ),
    tag = "collections"
)]
pub async fn get_mash_sketch(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Response<Body>, ApiError> {
    let path = state
        .catalog
        .mash_sketch_file(id)
        .await?
        .ok_or_else(|| collection_not_found(id))?;

    let download_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "mash_sketch.msh".to_string());

    stream_file(&path, &download_name).await
}

fn collection_not_found(id: i64) -> ApiError {
    ApiError::NotFound(format!("Collection with id={} not found", id))
}
