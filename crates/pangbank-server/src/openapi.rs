//! OpenAPI documentation configuration.

use utoipa::OpenApi;

use pangbank_core::{
    Collection, CollectionRelease, CollectionView, Genome, GenomeInPangenomeMetrics,
    GenomeInPangenomeView, GenomePangenomeLink, GenomeSource, GenomeView, MetadataEntry,
    Pangenome, PangenomeMetrics, PangenomeView, ReleaseView, ReleaseWithCountView, Taxon,
    Taxonomy, TaxonomySource,
};

use crate::dto::{HealthResponse, ServiceStatus, StatsResponse};
use crate::error::ErrorResponse;
use crate::handlers::{collections, genomes, health, pangenomes, stats};

/// OpenAPI documentation for the PanGBank API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "PanGBank API",
        version = "0.3.0",
        description = "Catalog of pangenome collections.

PanGBank serves collections of pangenomes built with PPanGGOLiN, organised in
versioned releases, together with the genomes they contain and their taxonomy.

## Quick Start

1. Check server health: `GET /health`
2. Browse collections: `GET /collections/`
3. Find pangenomes of a taxon: `GET /pangenomes/?taxon_name=g__Escherichia`
4. Download a pangenome: `GET /pangenomes/{id}/file`
",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0"
        )
    ),
    servers(
        (url = "http://localhost:8000", description = "Local development server")
    ),
    paths(
        health::health_check,
        stats::get_stats,
        collections::list_collections,
        collections::get_collection,
        collections::get_mash_sketch,
        genomes::list_genomes,
        genomes::get_genome,
        pangenomes::list_pangenomes,
        pangenomes::count_pangenomes,
        pangenomes::get_pangenome,
        pangenomes::get_pangenome_file,
        pangenomes::list_genomes_in_pangenome,
        pangenomes::get_genome_in_pangenome,
    ),
    components(
        schemas(
            // Catalog views
            CollectionView,
            ReleaseWithCountView,
            ReleaseView,
            GenomeView,
            PangenomeView,
            GenomeInPangenomeView,
            Taxonomy,
            // Domain models
            Collection,
            CollectionRelease,
            TaxonomySource,
            Taxon,
            GenomeSource,
            Genome,
            Pangenome,
            PangenomeMetrics,
            GenomePangenomeLink,
            GenomeInPangenomeMetrics,
            MetadataEntry,
            // Response types
            HealthResponse,
            ServiceStatus,
            StatsResponse,
            ErrorResponse,
        )
    ),
    tags(
        (name = "system", description = "System health and statistics"),
        (name = "collections", description = "Collections, releases and mash sketches"),
        (name = "genomes", description = "Genomes and their taxonomy"),
        (name = "pangenomes", description = "Pangenomes, their files and genomes"),
    )
)]
pub struct ApiDoc;
