//! Trait definitions for the catalog storage.
//!
//! [`CatalogStore`] abstracts the read side of the catalog so that
//! [`crate::CatalogService`] can be tested against an in-memory store and
//! run against SQLite (`pangbank_db::CatalogRepository`) in production.
//!
//! # Example
//!
//! ```
//! use pangbank_core::traits::CatalogStore;
//! use pangbank_core::{AppError, CollectionFilter};
//!
//! async fn collection_names<S: CatalogStore>(store: &S) -> Result<Vec<String>, AppError> {
//!     let collections = store.list_collections(&CollectionFilter::default()).await?;
//!     Ok(collections.into_iter().map(|c| c.name).collect())
//! }
//! ```

use std::future::Future;

use crate::filters::{
    CollectionFilter, GenomeFilter, GenomeInPangenomeFilter, Pagination, PangenomeFilter,
};
use crate::models::{
    CatalogStats, Collection, CollectionRelease, Genome, GenomePangenomeLink, GenomeSource,
    MetadataEntry, Pangenome, Taxon, TaxonomySource,
};
use crate::AppError;

/// A release together with the number of pangenomes it holds.
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseWithCount {
    pub release: CollectionRelease,
    pub pangenome_count: i64,
}

/// Read access to the catalog.
///
/// Lookups by id return `Ok(None)` when the row does not exist; errors are
/// reserved for storage failures.
pub trait CatalogStore: Send + Sync + Clone {
    /// Checks that the store answers queries.
    fn health_check(&self) -> impl Future<Output = Result<(), AppError>> + Send;

    fn stats(&self) -> impl Future<Output = Result<CatalogStats, AppError>> + Send;

    /// Collections matching `filter.collection_id` and `filter.collection_name`.
    ///
    /// `only_latest_release` is applied to releases, not here.
    fn list_collections(
        &self,
        filter: &CollectionFilter,
    ) -> impl Future<Output = Result<Vec<Collection>, AppError>> + Send;

    fn get_collection(
        &self,
        id: i64,
    ) -> impl Future<Output = Result<Option<Collection>, AppError>> + Send;

    /// Releases of a collection with their pangenome counts, in no particular order.
    fn list_releases(
        &self,
        collection_id: i64,
        only_latest: bool,
    ) -> impl Future<Output = Result<Vec<ReleaseWithCount>, AppError>> + Send;

    fn get_release(
        &self,
        id: i64,
    ) -> impl Future<Output = Result<Option<CollectionRelease>, AppError>> + Send;

    fn list_taxonomy_sources(
        &self,
    ) -> impl Future<Output = Result<Vec<TaxonomySource>, AppError>> + Send;

    fn get_genome_source(
        &self,
        id: i64,
    ) -> impl Future<Output = Result<Option<GenomeSource>, AppError>> + Send;

    /// Genomes matching the filter, ordered by id.
    fn list_genomes(
        &self,
        filter: &GenomeFilter,
        pagination: Pagination,
    ) -> impl Future<Output = Result<Vec<Genome>, AppError>> + Send;

    fn get_genome(&self, id: i64)
    -> impl Future<Output = Result<Option<Genome>, AppError>> + Send;

    /// Taxa linked to a genome, across every taxonomy source.
    fn genome_taxa(
        &self,
        genome_id: i64,
    ) -> impl Future<Output = Result<Vec<Taxon>, AppError>> + Send;

    /// Pangenomes matching the filter, ordered by id.
    fn list_pangenomes(
        &self,
        filter: &PangenomeFilter,
        pagination: Pagination,
    ) -> impl Future<Output = Result<Vec<Pangenome>, AppError>> + Send;

    fn count_pangenomes(
        &self,
        filter: &PangenomeFilter,
    ) -> impl Future<Output = Result<i64, AppError>> + Send;

    fn get_pangenome(
        &self,
        id: i64,
    ) -> impl Future<Output = Result<Option<Pangenome>, AppError>> + Send;

    fn pangenome_taxa(
        &self,
        pangenome_id: i64,
    ) -> impl Future<Output = Result<Vec<Taxon>, AppError>> + Send;

    /// Genome links of a pangenome, ordered by id.
    fn list_genome_links(
        &self,
        pangenome_id: i64,
        filter: &GenomeInPangenomeFilter,
        pagination: Pagination,
    ) -> impl Future<Output = Result<Vec<GenomePangenomeLink>, AppError>> + Send;

    fn get_genome_link(
        &self,
        pangenome_id: i64,
        genome_id: i64,
    ) -> impl Future<Output = Result<Option<GenomePangenomeLink>, AppError>> + Send;

    /// Metadata attached to a genome link, in insertion order.
    fn genome_link_metadata(
        &self,
        link_id: i64,
    ) -> impl Future<Output = Result<Vec<MetadataEntry>, AppError>> + Send;
}
