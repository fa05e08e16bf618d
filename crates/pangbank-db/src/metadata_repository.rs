//! Genome metadata sources (`genome-metadata add|delete`).

use std::collections::HashMap;
use std::path::Path;

use pangbank_core::descriptor::MetadataSourceInput;
use pangbank_core::error::AppError;
use pangbank_core::models::GenomeMetadataSource;
use pangbank_core::parsers::parse_metadata_table;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::info;

use crate::columns::METADATA_SOURCE_COLUMNS;

/// Genomes committed per INSERT batch.
const GENOME_BATCH_SIZE: usize = 5000;

/// Outcome of loading a metadata table.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MetadataLoadSummary {
    pub source_id: i64,
    pub genomes_described: usize,
    pub unknown_genomes: usize,
    pub entries: usize,
}

#[derive(Clone)]
pub struct MetadataRepository {
    pool: SqlitePool,
}

impl MetadataRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Registers a metadata source and attaches the table rows to known genomes.
    ///
    /// Only genomes that belong to at least one pangenome receive metadata;
    /// the others are counted as unknown. The whole load is one transaction.
    pub async fn add(
        &self,
        source: &MetadataSourceInput,
        table: &Path,
    ) -> Result<MetadataLoadSummary, AppError> {
        if !table.is_file() {
            return Err(AppError::MissingFiles(vec![table.to_path_buf()]));
        }

        let mut tx = self.pool.begin().await.map_err(AppError::DatabaseError)?;

        let existing: Option<i64> = sqlx::query_scalar(
            "SELECT id FROM genomemetadatasource WHERE name = ? AND version IS ?",
        )
        .bind(&source.name)
        .bind(&source.version)
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::DatabaseError)?;
        if existing.is_some() {
            return Err(AppError::MetadataSourceExists {
                name: source.name.clone(),
                version: source.version.clone().unwrap_or_default(),
            });
        }

        let source_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO genomemetadatasource (name, version, description, url)
            VALUES (?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&source.name)
        .bind(&source.version)
        .bind(&source.description)
        .bind(&source.url)
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::DatabaseError)?;

        let genome_ids: HashMap<String, i64> = sqlx::query_as::<_, (String, i64)>(
            r#"
            SELECT DISTINCT g.name, g.id
            FROM genome g
            JOIN genomepangenomelink l ON l.genome_id = g.id
            "#,
        )
        .fetch_all(&mut *tx)
        .await
        .map_err(AppError::DatabaseError)?
        .into_iter()
        .collect();
        info!("Retrieved {} genomes from the database", genome_ids.len());

        info!("Parsing genome metadata from {}", table.display());
        let rows = parse_metadata_table(table)?;
        info!("Metadata for {} genomes have been collected", rows.len());

        let mut summary = MetadataLoadSummary {
            source_id,
            ..Default::default()
        };

        let known: Vec<(i64, Vec<_>)> = rows
            .into_iter()
            .filter_map(|(genome, entries)| match genome_ids.get(&genome) {
                Some(id) => Some((*id, entries)),
                None => {
                    summary.unknown_genomes += 1;
                    None
                }
            })
            .collect();

        for batch in known.chunks(GENOME_BATCH_SIZE) {
            let entries: Vec<(i64, &str, &str)> = batch
                .iter()
                .flat_map(|(genome_id, entries)| {
                    entries
                        .iter()
                        .map(move |e| (*genome_id, e.key.as_str(), e.value.as_str()))
                })
                .collect();
            info!(
                "Adding {} metadata describing {} genomes",
                entries.len(),
                batch.len()
            );

            // Keeps each statement under SQLite's bind parameter limit.
            for chunk in entries.chunks(2000) {
                let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
                    "INSERT INTO genomemetadata (genome_id, key, value, source_id) ",
                );
                qb.push_values(chunk, |mut b, (genome_id, key, value)| {
                    b.push_bind(*genome_id)
                        .push_bind(key.to_string())
                        .push_bind(value.to_string())
                        .push_bind(source_id);
                });
                qb.build()
                    .execute(&mut *tx)
                    .await
                    .map_err(AppError::DatabaseError)?;
            }

            summary.genomes_described += batch.len();
            summary.entries += entries.len();
        }

        if summary.unknown_genomes > 0 {
            info!(
                "{} genomes in the metadata file are not in the database",
                summary.unknown_genomes
            );
        }

        tx.commit().await.map_err(AppError::DatabaseError)?;
        Ok(summary)
    }

    /// Deletes the sources matching `name` (and `version` when given), with
    /// their metadata. Returns the number of deleted sources.
    ///
    /// When nothing matches, the available sources are logged and `0` is returned.
    pub async fn delete(&self, name: &str, version: Option<&str>) -> Result<usize, AppError> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {} FROM genomemetadatasource ms WHERE ms.name = ",
            METADATA_SOURCE_COLUMNS
        ));
        qb.push_bind(name.to_string());
        if let Some(version) = version {
            qb.push(" AND ms.version = ").push_bind(version.to_string());
        }

        let sources = qb
            .build_query_as::<GenomeMetadataSource>()
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::DatabaseError)?;

        if sources.is_empty() {
            let source_info = match version {
                Some(version) => format!("{} version: {}", name, version),
                None => name.to_string(),
            };
            info!(
                "Genome metadata source '{}' not found in the database. Deletion aborted.",
                source_info
            );
            let available: Vec<String> = self
                .list_sources()
                .await?
                .iter()
                .map(|s| {
                    format!(
                        "name='{}' version='{}'",
                        s.name,
                        s.version.as_deref().unwrap_or("")
                    )
                })
                .collect();
            info!(
                "Available genome metadata sources in the database: [{}]",
                available.join(", ")
            );
            return Ok(0);
        }

        for source in &sources {
            info!(
                "Deleting genome metadata source '{}' version={} from the database",
                source.name,
                source.version.as_deref().unwrap_or("")
            );
            sqlx::query("DELETE FROM genomemetadatasource WHERE id = ?")
                .bind(source.id)
                .execute(&self.pool)
                .await
                .map_err(AppError::DatabaseError)?;
        }

        Ok(sources.len())
    }

    pub async fn list_sources(&self) -> Result<Vec<GenomeMetadataSource>, AppError> {
        let query = format!(
            "SELECT {} FROM genomemetadatasource ms ORDER BY ms.id",
            METADATA_SOURCE_COLUMNS
        );
        sqlx::query_as::<_, GenomeMetadataSource>(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::DatabaseError)
    }

}
