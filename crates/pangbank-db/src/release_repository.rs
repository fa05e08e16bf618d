//! Write-side repository: collection release ingestion, listing and deletion.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use pangbank_core::config::layout;
use pangbank_core::descriptor::{GenomeSourceInput, LoadedRelease, TaxonomyInput};
use pangbank_core::error::AppError;
use pangbank_core::ingest::{
    check_ranks, check_release_versions, genomes_md5sum_path, pangenome_file_name,
    pangenome_metadata_files, pangenome_subdirs, taxa_per_depth,
};
use pangbank_core::files::md5_file;
use pangbank_core::parsers::{
    metadata_source_from_filename, parse_genome_list, parse_genome_statistics,
    parse_genomes_md5sum, parse_info_yaml, parse_metadata_table, parse_taxonomy_file,
};
use pangbank_core::taxonomy::{common_taxa, parse_ranks};
use pangbank_core::traits::ReleaseWithCount;
use pangbank_core::version::compare_versions;
use pangbank_core::{
    Collection, CollectionRelease, GenomeInPangenomeMetrics, IngestSummary, PangenomeMetrics,
    RowOutcome,
};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use crate::catalog_repository::ReleaseCountRow;
use crate::columns::{COLLECTION_COLUMNS, RELEASE_COLUMNS};

/// Rows per multi-row INSERT. Keeps statements under SQLite's bind limit.
const LINK_BATCH_SIZE: usize = 500;
const METADATA_BATCH_SIZE: usize = 2000;

/// A collection with its releases, highest version first.
#[derive(Debug, Clone)]
pub struct CollectionSummary {
    pub collection: Collection,
    pub releases: Vec<ReleaseWithCount>,
}

/// Repository for the data management commands of the CLI.
#[derive(Clone)]
pub struct ReleaseRepository {
    pool: SqlitePool,
}

impl ReleaseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Ingests a collection release in a single transaction.
    ///
    /// Any error rolls back every row inserted by this call.
    pub async fn ingest(&self, loaded: &LoadedRelease) -> Result<IngestSummary, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::DatabaseError)?;
        let summary = ingest_release(&mut tx, loaded).await?;
        tx.commit().await.map_err(AppError::DatabaseError)?;
        Ok(summary)
    }

    /// Lists every collection with its releases and their pangenome counts.
    pub async fn list_collections(&self) -> Result<Vec<CollectionSummary>, AppError> {
        let query = format!("SELECT {} FROM collection c ORDER BY c.id", COLLECTION_COLUMNS);
        let collections = sqlx::query_as::<_, Collection>(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::DatabaseError)?;

        let release_query = format!(
            "SELECT {}, \
             (SELECT COUNT(*) FROM pangenome p WHERE p.collection_release_id = r.id) AS pangenome_count \
             FROM collectionrelease r WHERE r.collection_id = ?",
            RELEASE_COLUMNS
        );

        let mut summaries = Vec::with_capacity(collections.len());
        for collection in collections {
            let rows = sqlx::query_as::<_, ReleaseCountRow>(&release_query)
                .bind(collection.id)
                .fetch_all(&self.pool)
                .await
                .map_err(AppError::DatabaseError)?;

            let mut releases: Vec<ReleaseWithCount> = rows
                .into_iter()
                .map(|row| ReleaseWithCount {
                    release: row.release,
                    pangenome_count: row.pangenome_count,
                })
                .collect();
            releases.sort_by(|a, b| compare_versions(&b.release.version, &a.release.version));

            summaries.push(CollectionSummary {
                collection,
                releases,
            });
        }

        Ok(summaries)
    }

    /// Deletes a collection with all its releases and pangenomes.
    ///
    /// Genomes, taxa and taxonomy sources are kept.
    pub async fn delete_collection(&self, name: &str) -> Result<(), AppError> {
        let collection_id: Option<i64> =
            sqlx::query_scalar("SELECT id FROM collection WHERE name = ?")
                .bind(name)
                .fetch_optional(&self.pool)
                .await
                .map_err(AppError::DatabaseError)?;

        let Some(collection_id) = collection_id else {
            return Err(AppError::CollectionNotFound(name.to_string()));
        };

        info!("Deleting collection '{}' from the database", name);
        sqlx::query("DELETE FROM collection WHERE id = ?")
            .bind(collection_id)
            .execute(&self.pool)
            .await
            .map_err(AppError::DatabaseError)?;

        Ok(())
    }

    /// Deletes one release of a collection, then moves the `latest` flag to
    /// the highest remaining version.
    pub async fn delete_release(&self, name: &str, version: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::DatabaseError)?;

        let release: Option<(i64, i64)> = sqlx::query_as(
            r#"
            SELECT r.id, r.collection_id
            FROM collectionrelease r
            JOIN collection c ON c.id = r.collection_id
            WHERE c.name = ? AND r.version = ?
            "#,
        )
        .bind(name)
        .bind(version)
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::DatabaseError)?;

        let Some((release_id, collection_id)) = release else {
            return Err(AppError::ReleaseNotFound {
                collection: name.to_string(),
                version: version.to_string(),
            });
        };

        info!(
            "Deleting collection release '{}' (version: {}) from the database",
            name, version
        );
        sqlx::query("DELETE FROM collectionrelease WHERE id = ?")
            .bind(release_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::DatabaseError)?;

        recompute_latest(&mut tx, collection_id).await?;
        tx.commit().await.map_err(AppError::DatabaseError)?;
        Ok(())
    }
}

// =============================================================================
// Ingestion steps
// =============================================================================

async fn ingest_release(
    conn: &mut SqliteConnection,
    loaded: &LoadedRelease,
) -> Result<IngestSummary, AppError> {
    let descriptor = &loaded.descriptor;
    let mut summary = IngestSummary::new();

    info!("Parsing taxonomy file {}", descriptor.taxonomy.file.display());
    let lineages = parse_taxonomy_file(&descriptor.taxonomy.file)?;

    let mut genome_ids: BTreeMap<String, i64> = BTreeMap::new();
    for genome_source in &descriptor.genome_sources {
        let source_id = get_or_create_genome_source(conn, genome_source).await?;
        summary.genome_sources += 1;

        let names = parse_genome_list(&genome_source.file)?;
        info!(
            "Adding {} genomes from genome source '{}'",
            names.len(),
            genome_source.name
        );
        for name in names {
            let (genome_id, outcome) = get_or_create_genome(conn, &name, source_id).await?;
            summary.record_genome(outcome);
            genome_ids.insert(name, genome_id);
        }
    }

    let taxonomy_source_id = get_or_create_taxonomy_source(conn, &descriptor.taxonomy).await?;

    let ranks = parse_ranks(&descriptor.taxonomy.ranks);
    let taxon_ids = add_taxa(
        conn,
        taxonomy_source_id,
        &lineages,
        &ranks,
        &descriptor.taxonomy.file,
        &mut summary,
    )
    .await?;

    link_genomes_to_taxa(conn, &genome_ids, &lineages, &taxon_ids, &mut summary).await?;

    let collection_id = get_or_create_collection(
        conn,
        &descriptor.collection.name,
        descriptor.collection.description.as_deref(),
    )
    .await?;
    let release_id = get_or_create_release(conn, loaded, collection_id, taxonomy_source_id).await?;

    let subdirs = pangenome_subdirs(&loaded.pangenomes_dir)?;
    info!(
        "Adding {} pangenomes of collection '{}' release {}",
        subdirs.len(),
        descriptor.collection.name,
        descriptor.release.version
    );
    for (index, pangenome_dir) in subdirs.iter().enumerate() {
        let outcome = add_pangenome(
            conn,
            pangenome_dir,
            release_id,
            &genome_ids,
            &lineages,
            &taxon_ids,
            &mut summary,
        )
        .await?;
        summary.record_pangenome(outcome);
        debug!(
            "Pangenome {}/{} processed: {}",
            index + 1,
            subdirs.len(),
            pangenome_dir.display()
        );
    }

    recompute_latest(conn, collection_id).await?;

    info!("Ingestion complete: {}", summary);
    Ok(summary)
}

async fn get_or_create_genome_source(
    conn: &mut SqliteConnection,
    input: &GenomeSourceInput,
) -> Result<i64, AppError> {
    let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM genomesource WHERE name = ?")
        .bind(&input.name)
        .fetch_optional(&mut *conn)
        .await
        .map_err(AppError::DatabaseError)?;
    if let Some(id) = existing {
        debug!("Genome source '{}' already exists", input.name);
        return Ok(id);
    }

    sqlx::query_scalar(
        r#"
        INSERT INTO genomesource (name, version, description, source, url)
        VALUES (?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(&input.name)
    .bind(&input.version)
    .bind(&input.description)
    .bind(&input.source)
    .bind(&input.url)
    .fetch_one(&mut *conn)
    .await
    .map_err(AppError::DatabaseError)
}

async fn get_or_create_genome(
    conn: &mut SqliteConnection,
    name: &str,
    genome_source_id: i64,
) -> Result<(i64, RowOutcome), AppError> {
    if let Some(id) = find_genome(conn, name).await? {
        return Ok((id, RowOutcome::Reused));
    }

    let id = sqlx::query_scalar(
        "INSERT INTO genome (name, genome_source_id) VALUES (?, ?) RETURNING id",
    )
    .bind(name)
    .bind(genome_source_id)
    .fetch_one(&mut *conn)
    .await
    .map_err(AppError::DatabaseError)?;
    Ok((id, RowOutcome::Created))
}

async fn find_genome(conn: &mut SqliteConnection, name: &str) -> Result<Option<i64>, AppError> {
    sqlx::query_scalar("SELECT id FROM genome WHERE name = ?")
        .bind(name)
        .fetch_optional(&mut *conn)
        .await
        .map_err(AppError::DatabaseError)
}

async fn get_or_create_taxonomy_source(
    conn: &mut SqliteConnection,
    input: &TaxonomyInput,
) -> Result<i64, AppError> {
    // `IS` matches NULL versions too.
    let existing: Option<(i64, String)> =
        sqlx::query_as("SELECT id, ranks FROM taxonomysource WHERE name = ? AND version IS ?")
            .bind(&input.name)
            .bind(&input.version)
            .fetch_optional(&mut *conn)
            .await
            .map_err(AppError::DatabaseError)?;

    if let Some((id, ranks)) = existing {
        check_ranks(&input.name, input.version.as_deref(), &ranks, &input.ranks)?;
        debug!("Taxonomy source '{}' already exists", input.name);
        return Ok(id);
    }

    info!("Adding taxonomy source '{}'", input.name);
    sqlx::query_scalar(
        r#"
        INSERT INTO taxonomysource (name, ranks, version, description, source, url)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(&input.name)
    .bind(&input.ranks)
    .bind(&input.version)
    .bind(&input.description)
    .bind(&input.source)
    .bind(&input.url)
    .fetch_one(&mut *conn)
    .await
    .map_err(AppError::DatabaseError)
}

/// Creates the taxa missing for the source; returns ids keyed by `(depth, name)`.
async fn add_taxa(
    conn: &mut SqliteConnection,
    taxonomy_source_id: i64,
    lineages: &HashMap<String, Vec<String>>,
    ranks: &[String],
    taxonomy_file: &Path,
    summary: &mut IngestSummary,
) -> Result<HashMap<(usize, String), i64>, AppError> {
    let per_depth = taxa_per_depth(lineages, ranks, taxonomy_file)?;
    let mut taxon_ids = HashMap::new();

    for (depth, names) in per_depth.into_iter().enumerate() {
        let known: HashMap<String, i64> = sqlx::query_as::<_, (String, i64)>(
            "SELECT name, id FROM taxon WHERE taxonomy_source_id = ? AND depth = ?",
        )
        .bind(taxonomy_source_id)
        .bind(depth as i64)
        .fetch_all(&mut *conn)
        .await
        .map_err(AppError::DatabaseError)?
        .into_iter()
        .collect();

        for name in names {
            let id = match known.get(&name) {
                Some(id) => {
                    summary.record_taxon(RowOutcome::Reused);
                    *id
                }
                None => {
                    let id: i64 = sqlx::query_scalar(
                        r#"
                        INSERT INTO taxon (name, rank, depth, taxonomy_source_id)
                        VALUES (?, ?, ?, ?)
                        RETURNING id
                        "#,
                    )
                    .bind(&name)
                    .bind(&ranks[depth])
                    .bind(depth as i64)
                    .bind(taxonomy_source_id)
                    .fetch_one(&mut *conn)
                    .await
                    .map_err(AppError::DatabaseError)?;
                    summary.record_taxon(RowOutcome::Created);
                    id
                }
            };
            taxon_ids.insert((depth, name), id);
        }
    }

    info!(
        "Taxa: {} created, {} already present",
        summary.taxa_created, summary.taxa_reused
    );
    Ok(taxon_ids)
}

async fn link_genomes_to_taxa(
    conn: &mut SqliteConnection,
    genome_ids: &BTreeMap<String, i64>,
    lineages: &HashMap<String, Vec<String>>,
    taxon_ids: &HashMap<(usize, String), i64>,
    summary: &mut IngestSummary,
) -> Result<(), AppError> {
    let mut without_lineage = 0usize;

    for (genome_name, genome_id) in genome_ids {
        let Some(lineage) = lineages.get(genome_name) else {
            debug!("Genome {} has no lineage in the taxonomy file", genome_name);
            without_lineage += 1;
            continue;
        };
        let Some(root) = lineage.first() else {
            continue;
        };
        let Some(&root_id) = taxon_ids.get(&(0, root.clone())) else {
            continue;
        };

        let already_linked: Option<i64> = sqlx::query_scalar(
            "SELECT 1 FROM genometaxonlink WHERE genome_id = ? AND taxon_id = ?",
        )
        .bind(genome_id)
        .bind(root_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(AppError::DatabaseError)?;
        if already_linked.is_some() {
            continue;
        }

        for (depth, name) in lineage.iter().enumerate() {
            if let Some(taxon_id) = taxon_ids.get(&(depth, name.clone())) {
                sqlx::query(
                    "INSERT OR IGNORE INTO genometaxonlink (genome_id, taxon_id) VALUES (?, ?)",
                )
                .bind(genome_id)
                .bind(taxon_id)
                .execute(&mut *conn)
                .await
                .map_err(AppError::DatabaseError)?;
                summary.genome_taxon_links += 1;
            }
        }
    }

    if without_lineage > 0 {
        warn!(
            "{} genome(s) have no lineage in the taxonomy file and were not linked to taxa",
            without_lineage
        );
    }
    Ok(())
}

async fn get_or_create_collection(
    conn: &mut SqliteConnection,
    name: &str,
    description: Option<&str>,
) -> Result<i64, AppError> {
    let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM collection WHERE name = ?")
        .bind(name)
        .fetch_optional(&mut *conn)
        .await
        .map_err(AppError::DatabaseError)?;
    if let Some(id) = existing {
        debug!("Collection '{}' already exists", name);
        return Ok(id);
    }

    info!("Adding collection '{}'", name);
    sqlx::query_scalar("INSERT INTO collection (name, description) VALUES (?, ?) RETURNING id")
        .bind(name)
        .bind(description)
        .fetch_one(&mut *conn)
        .await
        .map_err(AppError::DatabaseError)
}

async fn get_or_create_release(
    conn: &mut SqliteConnection,
    loaded: &LoadedRelease,
    collection_id: i64,
    taxonomy_source_id: i64,
) -> Result<i64, AppError> {
    let collection_name = &loaded.descriptor.collection.name;
    let input = &loaded.descriptor.release;

    let query = format!(
        "SELECT {} FROM collectionrelease r WHERE r.collection_id = ? AND r.version = ?",
        RELEASE_COLUMNS
    );
    let existing = sqlx::query_as::<_, CollectionRelease>(&query)
        .bind(collection_id)
        .bind(&input.version)
        .fetch_optional(&mut *conn)
        .await
        .map_err(AppError::DatabaseError)?;

    if let Some(release) = existing {
        check_release_versions(collection_name, &release, input)?;
        info!(
            "Release {} of collection '{}' already exists; adding missing pangenomes only",
            input.version, collection_name
        );
        return Ok(release.id);
    }

    info!("Adding release {} of collection '{}'", input.version, collection_name);
    sqlx::query_scalar(
        r#"
        INSERT INTO collectionrelease (
            version, ppanggolin_version, pangbank_wf_version, release_note, mash_version,
            latest, date, mash_sketch, mash_sketch_md5sum, pangenomes_directory,
            collection_id, taxonomy_source_id
        )
        VALUES (?, ?, ?, ?, ?, 0, ?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(&input.version)
    .bind(&input.ppanggolin_version)
    .bind(&input.pangbank_wf_version)
    .bind(&input.release_note)
    .bind(&input.mash_version)
    .bind(input.date)
    .bind(&input.mash_sketch)
    .bind(&loaded.mash_sketch_md5sum)
    .bind(&input.pangenomes_directory)
    .bind(collection_id)
    .bind(taxonomy_source_id)
    .fetch_one(&mut *conn)
    .await
    .map_err(AppError::DatabaseError)
}

async fn add_pangenome(
    conn: &mut SqliteConnection,
    pangenome_dir: &Path,
    release_id: i64,
    genome_ids: &BTreeMap<String, i64>,
    lineages: &HashMap<String, Vec<String>>,
    taxon_ids: &HashMap<(usize, String), i64>,
    summary: &mut IngestSummary,
) -> Result<RowOutcome, AppError> {
    let file_name = pangenome_file_name(pangenome_dir);

    let existing: Option<i64> = sqlx::query_scalar(
        "SELECT id FROM pangenome WHERE collection_release_id = ? AND file_name = ?",
    )
    .bind(release_id)
    .bind(&file_name)
    .fetch_optional(&mut *conn)
    .await
    .map_err(AppError::DatabaseError)?;
    if existing.is_some() {
        debug!("Pangenome {} already in the release, skipping", file_name);
        return Ok(RowOutcome::Reused);
    }

    let name = pangenome_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let metrics = parse_info_yaml(&pangenome_dir.join(layout::INFO_FILE))?;
    let file_md5sum = md5_file(&pangenome_dir.join(layout::PANGENOME_FILE))?;

    let pangenome_id =
        insert_pangenome(conn, &name, &file_name, &file_md5sum, release_id, &metrics).await?;

    let md5_path = genomes_md5sum_path(pangenome_dir);
    let genome_files = parse_genomes_md5sum(&md5_path)?;
    let statistics_path = pangenome_dir.join(layout::GENOMES_STATISTICS_FILE);
    let statistics = parse_genome_statistics(&statistics_path)?;

    let mut links = Vec::with_capacity(statistics.len());
    for metrics in statistics {
        let genome_id = match genome_ids.get(&metrics.genome_name) {
            Some(id) => *id,
            None => find_genome(conn, &metrics.genome_name).await?.ok_or_else(|| {
                AppError::invalid_input(
                    &statistics_path,
                    format!(
                        "genome {} of pangenome {} is not in the database",
                        metrics.genome_name, name
                    ),
                )
            })?,
        };
        let file_info = genome_files.get(&metrics.genome_name).ok_or_else(|| {
            AppError::invalid_input(
                &md5_path,
                format!("no checksum entry for genome {}", metrics.genome_name),
            )
        })?;
        links.push(NewGenomeLink {
            genome_id,
            md5sum: file_info.md5_sum.clone(),
            file_name: file_info.file_name.clone(),
            metrics,
        });
    }

    for chunk in links.chunks(LINK_BATCH_SIZE) {
        insert_genome_links(conn, pangenome_id, chunk).await?;
    }
    summary.genome_links += links.len();

    let common = common_taxa(
        links
            .iter()
            .filter_map(|link| lineages.get(&link.metrics.genome_name))
            .map(|lineage| lineage.as_slice()),
    );
    for key in &common {
        if let Some(taxon_id) = taxon_ids.get(key) {
            sqlx::query(
                "INSERT OR IGNORE INTO pangenometaxonlink (pangenome_id, taxon_id) VALUES (?, ?)",
            )
            .bind(pangenome_id)
            .bind(taxon_id)
            .execute(&mut *conn)
            .await
            .map_err(AppError::DatabaseError)?;
        }
    }

    for metadata_file in pangenome_metadata_files(pangenome_dir)? {
        summary.metadata_entries +=
            add_genome_in_pangenome_metadata(conn, pangenome_id, &metadata_file).await?;
    }

    Ok(RowOutcome::Created)
}

async fn insert_pangenome(
    conn: &mut SqliteConnection,
    name: &str,
    file_name: &str,
    file_md5sum: &str,
    release_id: i64,
    m: &PangenomeMetrics,
) -> Result<i64, AppError> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
        "INSERT INTO pangenome (name, file_name, file_md5sum, collection_release_id, \
         gene_count, genome_count, family_count, edge_count, \
         persistent_family_count, persistent_family_min_genome_frequency, \
         persistent_family_max_genome_frequency, persistent_family_std_genome_frequency, \
         persistent_family_mean_genome_frequency, \
         shell_family_count, shell_family_min_genome_frequency, \
         shell_family_max_genome_frequency, shell_family_std_genome_frequency, \
         shell_family_mean_genome_frequency, \
         cloud_family_count, cloud_family_min_genome_frequency, \
         cloud_family_max_genome_frequency, cloud_family_std_genome_frequency, \
         cloud_family_mean_genome_frequency, \
         partition_count, rgp_count, spot_count, module_count, family_in_module_count) ",
    );
    qb.push_values(std::iter::once(m), |mut b, m| {
        b.push_bind(name.to_string())
            .push_bind(file_name.to_string())
            .push_bind(file_md5sum.to_string())
            .push_bind(release_id)
            .push_bind(m.gene_count)
            .push_bind(m.genome_count)
            .push_bind(m.family_count)
            .push_bind(m.edge_count)
            .push_bind(m.persistent_family_count)
            .push_bind(m.persistent_family_min_genome_frequency)
            .push_bind(m.persistent_family_max_genome_frequency)
            .push_bind(m.persistent_family_std_genome_frequency)
            .push_bind(m.persistent_family_mean_genome_frequency)
            .push_bind(m.shell_family_count)
            .push_bind(m.shell_family_min_genome_frequency)
            .push_bind(m.shell_family_max_genome_frequency)
            .push_bind(m.shell_family_std_genome_frequency)
            .push_bind(m.shell_family_mean_genome_frequency)
            .push_bind(m.cloud_family_count)
            .push_bind(m.cloud_family_min_genome_frequency)
            .push_bind(m.cloud_family_max_genome_frequency)
            .push_bind(m.cloud_family_std_genome_frequency)
            .push_bind(m.cloud_family_mean_genome_frequency)
            .push_bind(m.partition_count)
            .push_bind(m.rgp_count)
            .push_bind(m.spot_count)
            .push_bind(m.module_count)
            .push_bind(m.family_in_module_count);
    });
    qb.push(" RETURNING id");

    let (id,): (i64,) = qb
        .build_query_as()
        .fetch_one(&mut *conn)
        .await
        .map_err(AppError::DatabaseError)?;
    Ok(id)
}

struct NewGenomeLink {
    genome_id: i64,
    md5sum: String,
    file_name: String,
    metrics: GenomeInPangenomeMetrics,
}

async fn insert_genome_links(
    conn: &mut SqliteConnection,
    pangenome_id: i64,
    links: &[NewGenomeLink],
) -> Result<(), AppError> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
        "INSERT INTO genomepangenomelink (genome_id, pangenome_id, genome_file_md5sum, \
         genome_file_name, genome_name, contigs, genes, fragmented_genes, families, \
         families_with_fragments, families_in_multicopy, soft_core_families, soft_core_genes, \
         exact_core_families, exact_core_genes, persistent_genes, persistent_fragmented_genes, \
         persistent_families, persistent_families_with_fragments, persistent_families_in_multicopy, \
         shell_genes, shell_fragmented_genes, shell_families, shell_families_with_fragments, \
         shell_families_in_multicopy, cloud_genes, cloud_fragmented_genes, cloud_families, \
         cloud_families_with_fragments, cloud_families_in_multicopy, completeness, contamination, \
         fragmentation, rgps, spots, modules) ",
    );
    qb.push_values(links, |mut b, link| {
        let m = &link.metrics;
        b.push_bind(link.genome_id)
            .push_bind(pangenome_id)
            .push_bind(link.md5sum.clone())
            .push_bind(link.file_name.clone())
            .push_bind(m.genome_name.clone())
            .push_bind(m.contigs)
            .push_bind(m.genes)
            .push_bind(m.fragmented_genes)
            .push_bind(m.families)
            .push_bind(m.families_with_fragments)
            .push_bind(m.families_in_multicopy)
            .push_bind(m.soft_core_families)
            .push_bind(m.soft_core_genes)
            .push_bind(m.exact_core_families)
            .push_bind(m.exact_core_genes)
            .push_bind(m.persistent_genes)
            .push_bind(m.persistent_fragmented_genes)
            .push_bind(m.persistent_families)
            .push_bind(m.persistent_families_with_fragments)
            .push_bind(m.persistent_families_in_multicopy)
            .push_bind(m.shell_genes)
            .push_bind(m.shell_fragmented_genes)
            .push_bind(m.shell_families)
            .push_bind(m.shell_families_with_fragments)
            .push_bind(m.shell_families_in_multicopy)
            .push_bind(m.cloud_genes)
            .push_bind(m.cloud_fragmented_genes)
            .push_bind(m.cloud_families)
            .push_bind(m.cloud_families_with_fragments)
            .push_bind(m.cloud_families_in_multicopy)
            .push_bind(m.completeness)
            .push_bind(m.contamination)
            .push_bind(m.fragmentation)
            .push_bind(m.rgps)
            .push_bind(m.spots)
            .push_bind(m.modules);
    });

    qb.build()
        .execute(&mut *conn)
        .await
        .map_err(AppError::DatabaseError)?;
    Ok(())
}

/// Loads one `genomes_metadata_from_<source>.tsv` file of a pangenome.
///
/// Rows of genomes that are not part of the pangenome are ignored.
async fn add_genome_in_pangenome_metadata(
    conn: &mut SqliteConnection,
    pangenome_id: i64,
    metadata_file: &Path,
) -> Result<usize, AppError> {
    let source_name = metadata_source_from_filename(metadata_file)?;
    let rows = parse_metadata_table(metadata_file)?;

    let source_id = match sqlx::query_scalar::<_, i64>(
        "SELECT id FROM genomeinpangenomemetadatasource WHERE name = ?",
    )
    .bind(&source_name)
    .fetch_optional(&mut *conn)
    .await
    .map_err(AppError::DatabaseError)?
    {
        Some(id) => id,
        None => sqlx::query_scalar(
            "INSERT INTO genomeinpangenomemetadatasource (name) VALUES (?) RETURNING id",
        )
        .bind(&source_name)
        .fetch_one(&mut *conn)
        .await
        .map_err(AppError::DatabaseError)?,
    };

    let link_ids: HashMap<String, i64> = sqlx::query_as::<_, (String, i64)>(
        r#"
        SELECT g.name, l.id
        FROM genomepangenomelink l
        JOIN genome g ON g.id = l.genome_id
        WHERE l.pangenome_id = ?
        "#,
    )
    .bind(pangenome_id)
    .fetch_all(&mut *conn)
    .await
    .map_err(AppError::DatabaseError)?
    .into_iter()
    .collect();

    let mut entries: Vec<(i64, String, String)> = Vec::new();
    let mut ignored = 0usize;
    for (genome, genome_entries) in rows {
        match link_ids.get(&genome) {
            Some(link_id) => entries.extend(
                genome_entries
                    .into_iter()
                    .map(|entry| (*link_id, entry.key, entry.value)),
            ),
            None => ignored += 1,
        }
    }
    if ignored > 0 {
        debug!(
            "{} row(s) of {} describe genomes outside the pangenome",
            ignored,
            metadata_file.display()
        );
    }

    for chunk in entries.chunks(METADATA_BATCH_SIZE) {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            "INSERT INTO genomeinpangenomemetadata (genome_pangenome_link_id, key, value, source_id) ",
        );
        qb.push_values(chunk, |mut b, (link_id, key, value)| {
            b.push_bind(*link_id)
                .push_bind(key.clone())
                .push_bind(value.clone())
                .push_bind(source_id);
        });
        qb.build()
            .execute(&mut *conn)
            .await
            .map_err(AppError::DatabaseError)?;
    }

    Ok(entries.len())
}

/// Flags the highest version of the collection as `latest`, clearing the others.
pub(crate) async fn recompute_latest(
    conn: &mut SqliteConnection,
    collection_id: i64,
) -> Result<(), AppError> {
    let releases: Vec<(i64, String)> =
        sqlx::query_as("SELECT id, version FROM collectionrelease WHERE collection_id = ?")
            .bind(collection_id)
            .fetch_all(&mut *conn)
            .await
            .map_err(AppError::DatabaseError)?;

    let latest_id = releases
        .iter()
        .max_by(|a, b| compare_versions(&a.1, &b.1))
        .map(|(id, _)| *id);

    sqlx::query("UPDATE collectionrelease SET latest = (id IS ?) WHERE collection_id = ?")
        .bind(latest_id)
        .bind(collection_id)
        .execute(&mut *conn)
        .await
        .map_err(AppError::DatabaseError)?;

    if let Some(id) = latest_id {
        debug!("Release {} is now the latest of collection {}", id, collection_id);
    }
    Ok(())
}
