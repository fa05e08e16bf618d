//! Read-side repository backing the REST API.

use pangbank_core::error::AppError;
use pangbank_core::filters::like_pattern;
use pangbank_core::traits::{CatalogStore, ReleaseWithCount};
use pangbank_core::{
    CatalogStats, Collection, CollectionFilter, CollectionRelease, Genome, GenomeFilter,
    GenomeInPangenomeFilter, GenomePangenomeLink, GenomeSource, MetadataEntry, Pagination,
    Pangenome, PangenomeFilter, Taxon, TaxonomySource,
};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::columns::{
    COLLECTION_COLUMNS, GENOME_COLUMNS, GENOME_LINK_COLUMNS, GENOME_SOURCE_COLUMNS,
    PANGENOME_COLUMNS, RELEASE_COLUMNS, TAXON_COLUMNS, TAXONOMY_SOURCE_COLUMNS,
};

/// Repository for catalog lookups.
///
/// # Examples
///
/// ```no_run
/// use pangbank_core::DbConfig;
/// use pangbank_db::{CatalogRepository, connect};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = connect(&DbConfig::new("database/database.db")).await?;
/// let repo = CatalogRepository::new(pool);
/// let stats = repo.get_stats().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Checks database connectivity by executing a simple query.
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(AppError::DatabaseError)?;
        Ok(())
    }

    /// Returns row counts of the main tables.
    pub async fn get_stats(&self) -> Result<CatalogStats, AppError> {
        let row: StatsRow = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM collection) AS collections,
                (SELECT COUNT(*) FROM collectionrelease) AS releases,
                (SELECT COUNT(*) FROM pangenome) AS pangenomes,
                (SELECT COUNT(*) FROM genome) AS genomes,
                (SELECT COUNT(*) FROM taxonomysource) AS taxonomy_sources
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::DatabaseError)?;

        Ok(CatalogStats {
            collections: row.collections,
            releases: row.releases,
            pangenomes: row.pangenomes,
            genomes: row.genomes,
            taxonomy_sources: row.taxonomy_sources,
        })
    }

    // =========================================================================
    // Collections and releases
    // =========================================================================

    pub async fn list_collections(
        &self,
        filter: &CollectionFilter,
    ) -> Result<Vec<Collection>, AppError> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {} FROM collection c WHERE 1 = 1",
            COLLECTION_COLUMNS
        ));
        if let Some(id) = filter.collection_id {
            qb.push(" AND c.id = ").push_bind(id);
        }
        if let Some(name) = &filter.collection_name {
            qb.push(" AND c.name = ").push_bind(name.clone());
        }
        qb.push(" ORDER BY c.id");

        qb.build_query_as::<Collection>()
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::DatabaseError)
    }

    pub async fn get_collection(&self, id: i64) -> Result<Option<Collection>, AppError> {
        let query = format!("SELECT {} FROM collection c WHERE c.id = ?", COLLECTION_COLUMNS);
        sqlx::query_as::<_, Collection>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::DatabaseError)
    }

    pub async fn list_releases(
        &self,
        collection_id: i64,
        only_latest: bool,
    ) -> Result<Vec<ReleaseWithCount>, AppError> {
        let mut query = format!(
            "SELECT {}, \
             (SELECT COUNT(*) FROM pangenome p WHERE p.collection_release_id = r.id) AS pangenome_count \
             FROM collectionrelease r WHERE r.collection_id = ?",
            RELEASE_COLUMNS
        );
        if only_latest {
            query.push_str(" AND r.latest = 1");
        }

        let rows = sqlx::query_as::<_, ReleaseCountRow>(&query)
            .bind(collection_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::DatabaseError)?;

        Ok(rows
            .into_iter()
            .map(|row| ReleaseWithCount {
                release: row.release,
                pangenome_count: row.pangenome_count,
            })
            .collect())
    }

    pub async fn get_release(&self, id: i64) -> Result<Option<CollectionRelease>, AppError> {
        let query = format!(
            "SELECT {} FROM collectionrelease r WHERE r.id = ?",
            RELEASE_COLUMNS
        );
        sqlx::query_as::<_, CollectionRelease>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::DatabaseError)
    }

    pub async fn list_taxonomy_sources(&self) -> Result<Vec<TaxonomySource>, AppError> {
        let query = format!(
            "SELECT {} FROM taxonomysource ts ORDER BY ts.id",
            TAXONOMY_SOURCE_COLUMNS
        );
        sqlx::query_as::<_, TaxonomySource>(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::DatabaseError)
    }

    // =========================================================================
    // Genomes
    // =========================================================================

    pub async fn get_genome_source(&self, id: i64) -> Result<Option<GenomeSource>, AppError> {
        let query = format!(
            "SELECT {} FROM genomesource gs WHERE gs.id = ?",
            GENOME_SOURCE_COLUMNS
        );
        sqlx::query_as::<_, GenomeSource>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::DatabaseError)
    }

    pub async fn list_genomes(
        &self,
        filter: &GenomeFilter,
        pagination: Pagination,
    ) -> Result<Vec<Genome>, AppError> {
        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {} FROM genome g WHERE 1 = 1", GENOME_COLUMNS));

        if let Some(name) = &filter.genome_name {
            qb.push(" AND g.name = ").push_bind(name.clone());
        }
        if let Some(taxon_name) = &filter.taxon_name {
            qb.push(
                " AND EXISTS (SELECT 1 FROM genometaxonlink gt JOIN taxon t ON t.id = gt.taxon_id \
                 WHERE gt.genome_id = g.id AND ",
            );
            push_taxon_condition(&mut qb, taxon_name, filter.substring_match);
            qb.push(")");
        }
        qb.push(" ORDER BY g.id");
        push_pagination(&mut qb, pagination);

        qb.build_query_as::<Genome>()
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::DatabaseError)
    }

    pub async fn get_genome(&self, id: i64) -> Result<Option<Genome>, AppError> {
        let query = format!("SELECT {} FROM genome g WHERE g.id = ?", GENOME_COLUMNS);
        sqlx::query_as::<_, Genome>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::DatabaseError)
    }

    pub async fn genome_taxa(&self, genome_id: i64) -> Result<Vec<Taxon>, AppError> {
        let query = format!(
            "SELECT {} FROM taxon t JOIN genometaxonlink gt ON gt.taxon_id = t.id \
             WHERE gt.genome_id = ? ORDER BY t.taxonomy_source_id, t.depth",
            TAXON_COLUMNS
        );
        sqlx::query_as::<_, Taxon>(&query)
            .bind(genome_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::DatabaseError)
    }

    // =========================================================================
    // Pangenomes
    // =========================================================================

    pub async fn list_pangenomes(
        &self,
        filter: &PangenomeFilter,
        pagination: Pagination,
    ) -> Result<Vec<Pangenome>, AppError> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {} FROM pangenome p \
             JOIN collectionrelease r ON r.id = p.collection_release_id \
             JOIN collection c ON c.id = r.collection_id WHERE 1 = 1",
            PANGENOME_COLUMNS
        ));
        push_pangenome_filter(&mut qb, filter);
        qb.push(" ORDER BY p.id");
        push_pagination(&mut qb, pagination);

        qb.build_query_as::<Pangenome>()
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::DatabaseError)
    }

    pub async fn count_pangenomes(&self, filter: &PangenomeFilter) -> Result<i64, AppError> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT COUNT(*) FROM pangenome p \
             JOIN collectionrelease r ON r.id = p.collection_release_id \
             JOIN collection c ON c.id = r.collection_id WHERE 1 = 1",
        );
        push_pangenome_filter(&mut qb, filter);

        let (count,): (i64,) = qb
            .build_query_as()
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::DatabaseError)?;
        Ok(count)
    }

    pub async fn get_pangenome(&self, id: i64) -> Result<Option<Pangenome>, AppError> {
        let query = format!("SELECT {} FROM pangenome p WHERE p.id = ?", PANGENOME_COLUMNS);
        sqlx::query_as::<_, Pangenome>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::DatabaseError)
    }

    pub async fn pangenome_taxa(&self, pangenome_id: i64) -> Result<Vec<Taxon>, AppError> {
        let query = format!(
            "SELECT {} FROM taxon t JOIN pangenometaxonlink pt ON pt.taxon_id = t.id \
             WHERE pt.pangenome_id = ? ORDER BY t.taxonomy_source_id, t.depth",
            TAXON_COLUMNS
        );
        sqlx::query_as::<_, Taxon>(&query)
            .bind(pangenome_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::DatabaseError)
    }

    pub async fn list_genome_links(
        &self,
        pangenome_id: i64,
        filter: &GenomeInPangenomeFilter,
        pagination: Pagination,
    ) -> Result<Vec<GenomePangenomeLink>, AppError> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {} FROM genomepangenomelink l JOIN genome g ON g.id = l.genome_id \
             WHERE l.pangenome_id = ",
            GENOME_LINK_COLUMNS
        ));
        qb.push_bind(pangenome_id);

        if let Some(name) = &filter.genome_name {
            qb.push(" AND g.name = ").push_bind(name.clone());
        }
        if filter.metadata_key.is_some() || filter.metadata_value.is_some() {
            qb.push(
                " AND EXISTS (SELECT 1 FROM genomeinpangenomemetadata m \
                 WHERE m.genome_pangenome_link_id = l.id",
            );
            if let Some(key) = &filter.metadata_key {
                qb.push(" AND m.key = ").push_bind(key.clone());
            }
            if let Some(value) = &filter.metadata_value {
                qb.push(" AND m.value = ").push_bind(value.clone());
            }
            qb.push(")");
        }
        qb.push(" ORDER BY l.id");
        push_pagination(&mut qb, pagination);

        qb.build_query_as::<GenomePangenomeLink>()
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::DatabaseError)
    }

    pub async fn get_genome_link(
        &self,
        pangenome_id: i64,
        genome_id: i64,
    ) -> Result<Option<GenomePangenomeLink>, AppError> {
        let query = format!(
            "SELECT {} FROM genomepangenomelink l WHERE l.pangenome_id = ? AND l.genome_id = ?",
            GENOME_LINK_COLUMNS
        );
        sqlx::query_as::<_, GenomePangenomeLink>(&query)
            .bind(pangenome_id)
            .bind(genome_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::DatabaseError)
    }

    pub async fn genome_link_metadata(&self, link_id: i64) -> Result<Vec<MetadataEntry>, AppError> {
        sqlx::query_as::<_, MetadataEntry>(
            r#"
            SELECT key, value
            FROM genomeinpangenomemetadata
            WHERE genome_pangenome_link_id = ?
            ORDER BY id
            "#,
        )
        .bind(link_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::DatabaseError)
    }
}

fn push_taxon_condition(qb: &mut QueryBuilder<'_, Sqlite>, taxon_name: &str, substring: bool) {
    if substring {
        qb.push("lower(t.name) LIKE lower(")
            .push_bind(like_pattern(taxon_name))
            .push(") ESCAPE '\\'");
    } else {
        qb.push("t.name = ").push_bind(taxon_name.to_string());
    }
}

fn push_pangenome_filter(qb: &mut QueryBuilder<'_, Sqlite>, filter: &PangenomeFilter) {
    if let Some(id) = filter.collection_id {
        qb.push(" AND c.id = ").push_bind(id);
    }
    if let Some(name) = &filter.collection_name {
        qb.push(" AND c.name = ").push_bind(name.clone());
    }
    if filter.only_latest_release {
        qb.push(" AND r.latest = 1");
    }
    if let Some(genome_name) = &filter.genome_name {
        qb.push(
            " AND EXISTS (SELECT 1 FROM genomepangenomelink l JOIN genome g ON g.id = l.genome_id \
             WHERE l.pangenome_id = p.id AND g.name = ",
        )
        .push_bind(genome_name.clone())
        .push(")");
    }
    if let Some(taxon_name) = &filter.taxon_name {
        qb.push(
            " AND EXISTS (SELECT 1 FROM pangenometaxonlink pt JOIN taxon t ON t.id = pt.taxon_id \
             WHERE pt.pangenome_id = p.id AND ",
        );
        push_taxon_condition(qb, taxon_name, filter.substring_match);
        qb.push(")");
    }
}

fn push_pagination(qb: &mut QueryBuilder<'_, Sqlite>, pagination: Pagination) {
    qb.push(" LIMIT ")
        .push_bind(pagination.limit)
        .push(" OFFSET ")
        .push_bind(pagination.offset);
}

/// Helper struct for deserializing stats query results
#[derive(sqlx::FromRow)]
struct StatsRow {
    collections: i64,
    releases: i64,
    pangenomes: i64,
    genomes: i64,
    taxonomy_sources: i64,
}

/// Helper struct for deserializing releases with their pangenome count
#[derive(sqlx::FromRow)]
pub(crate) struct ReleaseCountRow {
    #[sqlx(flatten)]
    pub(crate) release: CollectionRelease,
    pub(crate) pangenome_count: i64,
}

// =============================================================================
// Trait Implementation: CatalogStore
// =============================================================================

impl CatalogStore for CatalogRepository {
    async fn health_check(&self) -> Result<(), AppError> {
        CatalogRepository::health_check(self).await
    }

    async fn stats(&self) -> Result<CatalogStats, AppError> {
        CatalogRepository::get_stats(self).await
    }

    async fn list_collections(
        &self,
        filter: &CollectionFilter,
    ) -> Result<Vec<Collection>, AppError> {
        CatalogRepository::list_collections(self, filter).await
    }

    async fn get_collection(&self, id: i64) -> Result<Option<Collection>, AppError> {
        CatalogRepository::get_collection(self, id).await
    }

    async fn list_releases(
        &self,
        collection_id: i64,
        only_latest: bool,
    ) -> Result<Vec<ReleaseWithCount>, AppError> {
        CatalogRepository::list_releases(self, collection_id, only_latest).await
    }

    async fn get_release(&self, id: i64) -> Result<Option<CollectionRelease>, AppError> {
        CatalogRepository::get_release(self, id).await
    }

    async fn list_taxonomy_sources(&self) -> Result<Vec<TaxonomySource>, AppError> {
        CatalogRepository::list_taxonomy_sources(self).await
    }

    async fn get_genome_source(&self, id: i64) -> Result<Option<GenomeSource>, AppError> {
        CatalogRepository::get_genome_source(self, id).await
    }

    async fn list_genomes(
        &self,
        filter: &GenomeFilter,
        pagination: Pagination,
    ) -> Result<Vec<Genome>, AppError> {
        CatalogRepository::list_genomes(self, filter, pagination).await
    }

    async fn get_genome(&self, id: i64) -> Result<Option<Genome>, AppError> {
        CatalogRepository::get_genome(self, id).await
    }

    async fn genome_taxa(&self, genome_id: i64) -> Result<Vec<Taxon>, AppError> {
        CatalogRepository::genome_taxa(self, genome_id).await
    }

    async fn list_pangenomes(
        &self,
        filter: &PangenomeFilter,
        pagination: Pagination,
    ) -> Result<Vec<Pangenome>, AppError> {
        CatalogRepository::list_pangenomes(self, filter, pagination).await
    }

    async fn count_pangenomes(&self, filter: &PangenomeFilter) -> Result<i64, AppError> {
        CatalogRepository::count_pangenomes(self, filter).await
    }

    async fn get_pangenome(&self, id: i64) -> Result<Option<Pangenome>, AppError> {
        CatalogRepository::get_pangenome(self, id).await
    }

    async fn pangenome_taxa(&self, pangenome_id: i64) -> Result<Vec<Taxon>, AppError> {
        CatalogRepository::pangenome_taxa(self, pangenome_id).await
    }

    async fn list_genome_links(
        &self,
        pangenome_id: i64,
        filter: &GenomeInPangenomeFilter,
        pagination: Pagination,
    ) -> Result<Vec<GenomePangenomeLink>, AppError> {
        CatalogRepository::list_genome_links(self, pangenome_id, filter, pagination).await
    }

    async fn get_genome_link(
        &self,
        pangenome_id: i64,
        genome_id: i64,
    ) -> Result<Option<GenomePangenomeLink>, AppError> {
        CatalogRepository::get_genome_link(self, pangenome_id, genome_id).await
    }

    async fn genome_link_metadata(&self, link_id: i64) -> Result<Vec<MetadataEntry>, AppError> {
        CatalogRepository::genome_link_metadata(self, link_id).await
    }
}
