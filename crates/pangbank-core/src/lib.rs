//! PanGBank Core - Domain types, input parsers and catalog services.
//!
//! This crate provides the core functionality for PanGBank, including:
//!
//! - **Domain models**: [`Collection`], [`CollectionRelease`], [`Pangenome`], [`Genome`], etc.
//! - **Release descriptors**: [`ReleaseDescriptor`] loading and validation
//! - **Input parsers**: taxonomy files, genome tables, `info.yaml`, metadata tables
//! - **Services**: [`CatalogService`] assembling the views served by the REST API
//! - **Traits**: [`CatalogStore`] for dependency injection
//!
//! # Architecture
//!
//! This crate is shared by the CLI (`pangbank`) and the REST server. It
//! holds no connection itself: `pangbank-db` implements [`CatalogStore`] on
//! SQLite and performs the writes driven by the types defined here.
//!
//! # Example
//!
//! ```ignore
//! use pangbank_core::{CatalogService, CollectionFilter};
//!
//! let catalog = CatalogService::new(repository, "data/");
//! let collections = catalog.list_collections(&CollectionFilter::default()).await?;
//! ```

pub mod catalog;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod files;
pub mod filters;
pub mod ingest;
pub mod models;
pub mod parsers;
pub mod taxonomy;
pub mod traits;
pub mod version;

// Configuration
pub use config::{DEFAULT_DATA_DIR, DEFAULT_DATABASE_PATH, DbConfig, resolve_data_path};

// Error handling
pub use error::AppError;

// Domain models
pub use models::{
    CatalogStats, Collection, CollectionRelease, Genome, GenomeInPangenomeMetrics,
    GenomeMetadataSource, GenomePangenomeLink, GenomeSource, MetadataEntry, Pangenome,
    PangenomeMetrics, Taxon, TaxonomySource,
};

// Release descriptors and ingestion helpers
pub use descriptor::{
    CollectionInput, GenomeSourceInput, LoadedRelease, MetadataSourceInput, ReleaseDescriptor,
    ReleaseInput, TaxonomyInput,
};
pub use ingest::{IngestSummary, RowOutcome};

// Query filters
pub use filters::{
    CollectionFilter, GenomeFilter, GenomeInPangenomeFilter, Pagination, PangenomeFilter,
};

// Taxonomy
pub use taxonomy::Taxonomy;

// Traits for dependency injection
pub use traits::{CatalogStore, ReleaseWithCount};

// Services (generic over trait implementations)
pub use catalog::{
    CatalogService, CollectionView, GenomeInPangenomeView, GenomeView, PangenomeView,
    ReleaseView, ReleaseWithCountView,
};

// Version ordering
pub use version::compare_versions;
