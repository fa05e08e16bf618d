//! Catalog service - assembles the public views served by the REST API.
//!
//! The store returns flat rows; this service joins them into the nested
//! shapes clients consume (collections with releases, pangenomes with their
//! release and taxonomy, genomes with their taxonomies) and resolves stored
//! file paths against the data directory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::warn;

use crate::config::resolve_data_path;
use crate::error::AppError;
use crate::filters::{
    CollectionFilter, GenomeFilter, GenomeInPangenomeFilter, Pagination, PangenomeFilter,
};
use crate::models::{
    CatalogStats, Collection, CollectionRelease, Genome, GenomePangenomeLink, GenomeSource,
    MetadataEntry, Pangenome, TaxonomySource,
};
use crate::taxonomy::{Taxonomy, group_taxa_into_taxonomies};
use crate::traits::{CatalogStore, ReleaseWithCount};
use crate::version::compare_versions;

// =============================================================================
// Views
// =============================================================================

/// A release with its collection and taxonomy source.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ReleaseView {
    #[serde(flatten)]
    pub release: CollectionRelease,
    pub collection_name: String,
    pub collection: Collection,
    pub taxonomy_source: TaxonomySource,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ReleaseWithCountView {
    #[serde(flatten)]
    pub release: ReleaseView,
    pub pangenome_count: i64,
}

/// A collection and its releases, highest version first.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CollectionView {
    #[serde(flatten)]
    pub collection: Collection,
    pub releases: Vec<ReleaseWithCountView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct GenomeView {
    #[serde(flatten)]
    pub genome: Genome,
    pub genome_source: Option<GenomeSource>,
    pub taxonomies: Vec<Taxonomy>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PangenomeView {
    #[serde(flatten)]
    pub pangenome: Pangenome,
    pub collection_release: ReleaseView,
    pub taxonomy: Taxonomy,
}

/// A genome link with its genome-in-pangenome metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct GenomeInPangenomeView {
    #[serde(flatten)]
    pub link: GenomePangenomeLink,
    pub genome_metadata: Vec<MetadataEntry>,
}

// =============================================================================
// Service
// =============================================================================

/// Read-only catalog service, generic over its store.
///
/// # Type Parameters
///
/// * `S` - Catalog store implementation (e.g., `CatalogRepository`)
pub struct CatalogService<S>
where
    S: CatalogStore,
{
    store: S,
    data_dir: PathBuf,
}

impl<S> Clone for CatalogService<S>
where
    S: CatalogStore,
{
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            data_dir: self.data_dir.clone(),
        }
    }
}

/// Lookup caches for one request.
#[derive(Default)]
struct ReleaseCache {
    releases: HashMap<i64, ReleaseView>,
    sources: Option<Vec<TaxonomySource>>,
}

impl<S> CatalogService<S>
where
    S: CatalogStore,
{
    /// Creates a service; stored relative paths are resolved against `data_dir`.
    pub fn new(store: S, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            data_dir: data_dir.into(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub async fn health_check(&self) -> Result<(), AppError> {
        self.store.health_check().await
    }

    pub async fn stats(&self) -> Result<CatalogStats, AppError> {
        self.store.stats().await
    }

    // -------------------------------------------------------------------------
    // Collections
    // -------------------------------------------------------------------------

    pub async fn list_collections(
        &self,
        filter: &CollectionFilter,
    ) -> Result<Vec<CollectionView>, AppError> {
        let collections = self.store.list_collections(filter).await?;
        let sources = self.store.list_taxonomy_sources().await?;

        let mut views = Vec::with_capacity(collections.len());
        for collection in collections {
            views.push(
                self.collection_view(collection, filter.only_latest_release, &sources)
                    .await?,
            );
        }
        Ok(views)
    }

    pub async fn get_collection(&self, id: i64) -> Result<Option<CollectionView>, AppError> {
        let Some(collection) = self.store.get_collection(id).await? else {
            return Ok(None);
        };
        let sources = self.store.list_taxonomy_sources().await?;
        Ok(Some(self.collection_view(collection, false, &sources).await?))
    }

    /// Path of the mash sketch of the collection's highest release.
    ///
    /// `None` when the collection does not exist or has no release.
    pub async fn mash_sketch_file(&self, collection_id: i64) -> Result<Option<PathBuf>, AppError> {
        let releases = self.store.list_releases(collection_id, false).await?;
        let highest = releases
            .into_iter()
            .map(|r| r.release)
            .max_by(|a, b| compare_versions(&a.version, &b.version));

        Ok(highest.map(|release| resolve_data_path(&self.data_dir, &release.mash_sketch)))
    }

    async fn collection_view(
        &self,
        collection: Collection,
        only_latest: bool,
        sources: &[TaxonomySource],
    ) -> Result<CollectionView, AppError> {
        let mut releases = self.store.list_releases(collection.id, only_latest).await?;
        releases.sort_by(|a, b| compare_versions(&b.release.version, &a.release.version));

        let mut views = Vec::with_capacity(releases.len());
        for ReleaseWithCount {
            release,
            pangenome_count,
        } in releases
        {
            let taxonomy_source = find_source(sources, release.taxonomy_source_id)?;
            views.push(ReleaseWithCountView {
                release: ReleaseView {
                    release,
                    collection_name: collection.name.clone(),
                    collection: collection.clone(),
                    taxonomy_source,
                },
                pangenome_count,
            });
        }

        Ok(CollectionView {
            collection,
            releases: views,
        })
    }

    // -------------------------------------------------------------------------
    // Genomes
    // -------------------------------------------------------------------------

    pub async fn list_genomes(
        &self,
        filter: &GenomeFilter,
        pagination: Pagination,
    ) -> Result<Vec<GenomeView>, AppError> {
        filter.validate()?;
        pagination.validate()?;

        let genomes = self.store.list_genomes(filter, pagination).await?;
        let sources = self.store.list_taxonomy_sources().await?;
        let mut genome_sources: HashMap<i64, Option<GenomeSource>> = HashMap::new();

        let mut views = Vec::with_capacity(genomes.len());
        for genome in genomes {
            views.push(
                self.genome_view(genome, &sources, &mut genome_sources)
                    .await?,
            );
        }
        Ok(views)
    }

    pub async fn get_genome(&self, id: i64) -> Result<Option<GenomeView>, AppError> {
        let Some(genome) = self.store.get_genome(id).await? else {
            return Ok(None);
        };
        let sources = self.store.list_taxonomy_sources().await?;
        let view = self
            .genome_view(genome, &sources, &mut HashMap::new())
            .await?;
        Ok(Some(view))
    }

    async fn genome_view(
        &self,
        genome: Genome,
        sources: &[TaxonomySource],
        genome_sources: &mut HashMap<i64, Option<GenomeSource>>,
    ) -> Result<GenomeView, AppError> {
        let genome_source = match genome.genome_source_id {
            Some(id) => match genome_sources.get(&id) {
                Some(cached) => cached.clone(),
                None => {
                    let fetched = self.store.get_genome_source(id).await?;
                    genome_sources.insert(id, fetched.clone());
                    fetched
                }
            },
            None => None,
        };
        let taxa = self.store.genome_taxa(genome.id).await?;

        Ok(GenomeView {
            genome,
            genome_source,
            taxonomies: group_taxa_into_taxonomies(taxa, sources),
        })
    }

    // -------------------------------------------------------------------------
    // Pangenomes
    // -------------------------------------------------------------------------

    pub async fn list_pangenomes(
        &self,
        filter: &PangenomeFilter,
        pagination: Pagination,
    ) -> Result<Vec<PangenomeView>, AppError> {
        filter.validate()?;
        pagination.validate()?;

        let pangenomes = self.store.list_pangenomes(filter, pagination).await?;
        let mut cache = ReleaseCache::default();

        let mut views = Vec::with_capacity(pangenomes.len());
        for pangenome in pangenomes {
            views.push(self.pangenome_view(pangenome, &mut cache).await?);
        }
        Ok(views)
    }

    pub async fn count_pangenomes(&self, filter: &PangenomeFilter) -> Result<i64, AppError> {
        filter.validate()?;
        self.store.count_pangenomes(filter).await
    }

    pub async fn get_pangenome(&self, id: i64) -> Result<Option<PangenomeView>, AppError> {
        let Some(pangenome) = self.store.get_pangenome(id).await? else {
            return Ok(None);
        };
        let view = self
            .pangenome_view(pangenome, &mut ReleaseCache::default())
            .await?;
        Ok(Some(view))
    }

    /// Location of a pangenome's HDF5 file under the data directory.
    ///
    /// The file itself is not checked.
    pub async fn pangenome_file(&self, id: i64) -> Result<Option<PathBuf>, AppError> {
        let Some(pangenome) = self.store.get_pangenome(id).await? else {
            return Ok(None);
        };
        let release = self
            .store
            .get_release(pangenome.collection_release_id)
            .await?
            .ok_or_else(|| {
                AppError::DataIntegrity(format!(
                    "pangenome {} references missing release {}",
                    pangenome.id, pangenome.collection_release_id
                ))
            })?;

        let directory = resolve_data_path(&self.data_dir, &release.pangenomes_directory);
        Ok(Some(directory.join(&pangenome.file_name)))
    }

    /// Genome links of a pangenome; `None` when the pangenome does not exist.
    pub async fn list_genomes_in_pangenome(
        &self,
        pangenome_id: i64,
        filter: &GenomeInPangenomeFilter,
        pagination: Pagination,
    ) -> Result<Option<Vec<GenomePangenomeLink>>, AppError> {
        pagination.validate()?;
        if self.store.get_pangenome(pangenome_id).await?.is_none() {
            return Ok(None);
        }
        let links = self
            .store
            .list_genome_links(pangenome_id, filter, pagination)
            .await?;
        Ok(Some(links))
    }

    pub async fn get_genome_in_pangenome(
        &self,
        pangenome_id: i64,
        genome_id: i64,
    ) -> Result<Option<GenomeInPangenomeView>, AppError> {
        let Some(link) = self.store.get_genome_link(pangenome_id, genome_id).await? else {
            return Ok(None);
        };
        let genome_metadata = self.store.genome_link_metadata(link.id).await?;
        Ok(Some(GenomeInPangenomeView {
            link,
            genome_metadata,
        }))
    }

    async fn pangenome_view(
        &self,
        pangenome: Pangenome,
        cache: &mut ReleaseCache,
    ) -> Result<PangenomeView, AppError> {
        if cache.sources.is_none() {
            cache.sources = Some(self.store.list_taxonomy_sources().await?);
        }
        let sources = cache.sources.clone().unwrap_or_default();

        let collection_release = match cache.releases.get(&pangenome.collection_release_id) {
            Some(view) => view.clone(),
            None => {
                let view = self
                    .release_view(pangenome.collection_release_id, &sources)
                    .await?;
                cache
                    .releases
                    .insert(pangenome.collection_release_id, view.clone());
                view
            }
        };

        let taxa = self.store.pangenome_taxa(pangenome.id).await?;
        let mut taxonomies = group_taxa_into_taxonomies(taxa, &sources);

        let taxonomy = match taxonomies.len() {
            1 => taxonomies.remove(0),
            0 => {
                warn!(
                    pangenome_id = pangenome.id,
                    "Pangenome has no taxa, using the release taxonomy source"
                );
                Taxonomy {
                    taxonomy_source: collection_release.taxonomy_source.clone(),
                    taxa: Vec::new(),
                }
            }
            n => {
                return Err(AppError::DataIntegrity(format!(
                    "pangenome {} ({}) is linked to taxa of {} taxonomy sources, expected one",
                    pangenome.id, pangenome.file_name, n
                )));
            }
        };

        Ok(PangenomeView {
            pangenome,
            collection_release,
            taxonomy,
        })
    }

    async fn release_view(
        &self,
        release_id: i64,
        sources: &[TaxonomySource],
    ) -> Result<ReleaseView, AppError> {
        let release = self.store.get_release(release_id).await?.ok_or_else(|| {
            AppError::DataIntegrity(format!("release {} does not exist", release_id))
        })?;
        let collection = self
            .store
            .get_collection(release.collection_id)
            .await?
            .ok_or_else(|| {
                AppError::DataIntegrity(format!(
                    "release {} references missing collection {}",
                    release.id, release.collection_id
                ))
            })?;
        let taxonomy_source = find_source(sources, release.taxonomy_source_id)?;

        Ok(ReleaseView {
            release,
            collection_name: collection.name.clone(),
            collection,
            taxonomy_source,
        })
    }
}

fn find_source(sources: &[TaxonomySource], id: i64) -> Result<TaxonomySource, AppError> {
    sources
        .iter()
        .find(|s| s.id == id)
        .cloned()
        .ok_or_else(|| AppError::DataIntegrity(format!("taxonomy source {} does not exist", id)))
}
