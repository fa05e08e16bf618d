//! Response DTOs for API endpoints.

use serde::Serialize;
use utoipa::ToSchema;

use pangbank_core::CatalogStats;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// "healthy" or "degraded"
    #[schema(example = "healthy")]
    pub status: String,
    #[schema(example = "0.3.0")]
    pub version: String,
    pub database: ServiceStatus,
}

/// Status of a backing service.
#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceStatus {
    pub healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Catalog statistics response.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    pub collections: i64,
    pub releases: i64,
    pub pangenomes: i64,
    pub genomes: i64,
    pub taxonomy_sources: i64,
}

impl From<CatalogStats> for StatsResponse {
    fn from(stats: CatalogStats) -> Self {
        Self {
            collections: stats.collections,
            releases: stats.releases,
            pangenomes: stats.pangenomes,
            genomes: stats.genomes,
            taxonomy_sources: stats.taxonomy_sources,
        }
    }
}
