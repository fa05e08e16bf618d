//! Test utilities for API integration tests.
//!
//! Seeds a small catalog through plain SQL and lays out the matching data
//! directory on disk.

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use chrono::NaiveDate;
use clap::Parser;
use pangbank_core::DbConfig;
use pangbank_server::{AppState, ServerConfig, create_router};
use serde_json::Value;
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::ServiceExt;

const PANGENOME_METRICS: &[&str] = &[
    "gene_count",
    "family_count",
    "edge_count",
    "persistent_family_count",
    "persistent_family_min_genome_frequency",
    "persistent_family_max_genome_frequency",
    "persistent_family_std_genome_frequency",
    "persistent_family_mean_genome_frequency",
    "shell_family_count",
    "shell_family_min_genome_frequency",
    "shell_family_max_genome_frequency",
    "shell_family_std_genome_frequency",
    "shell_family_mean_genome_frequency",
    "cloud_family_count",
    "cloud_family_min_genome_frequency",
    "cloud_family_max_genome_frequency",
    "cloud_family_std_genome_frequency",
    "cloud_family_mean_genome_frequency",
    "partition_count",
    "rgp_count",
    "spot_count",
    "module_count",
    "family_in_module_count",
];

const GENOME_METRICS: &[&str] = &[
    "contigs",
    "genes",
    "fragmented_genes",
    "families",
    "families_with_fragments",
    "families_in_multicopy",
    "soft_core_families",
    "soft_core_genes",
    "exact_core_families",
    "exact_core_genes",
    "persistent_genes",
    "persistent_fragmented_genes",
    "persistent_families",
    "persistent_families_with_fragments",
    "persistent_families_in_multicopy",
    "shell_genes",
    "shell_fragmented_genes",
    "shell_families",
    "shell_families_with_fragments",
    "shell_families_in_multicopy",
    "cloud_genes",
    "cloud_fragmented_genes",
    "cloud_families",
    "cloud_families_with_fragments",
    "cloud_families_in_multicopy",
    "completeness",
    "contamination",
    "fragmentation",
    "rgps",
    "spots",
    "modules",
];

/// A router over a seeded database and data directory.
///
/// Keep the struct alive for the test duration: it owns the temp dirs.
pub struct TestApp {
    pub router: Router,
    pub pool: SqlitePool,
    pub data_dir: TempDir,
    _db_dir: TempDir,
}

impl TestApp {
    /// Catalog layout:
    /// - collection 1 `GTDB_refseq`, release 1.0.0 (latest) with sketch `mash/sketch.msh`
    /// - pangenome 1 `s__Escherichia_coli` with GCF_1 and GCF_2 (file on disk)
    /// - pangenome 2 `s__Bacillus_subtilis` with GCF_3 (file missing on disk)
    /// - GCF_2 carries the genome-in-pangenome metadata `country=Chile`
    pub async fn new() -> Self {
        let db_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let pool = pangbank_db::connect(&DbConfig::new(db_dir.path().join("database.db")))
            .await
            .expect("Failed to open database");

        let data_dir = tempfile::tempdir().expect("Failed to create temp dir");
        write_data_file(&data_dir, "mash/sketch.msh", "sketch");
        write_data_file(
            &data_dir,
            "pangenomes/s__Escherichia_coli/pangenome.h5",
            "ecoli pangenome",
        );

        seed_catalog(&pool).await;

        let config = ServerConfig::try_parse_from(["pangbank-server"]).expect("default config");
        let router = create_router(AppState::new(pool.clone(), data_dir.path()), &config);

        Self {
            router,
            pool,
            data_dir,
            _db_dir: db_dir,
        }
    }

    /// Sends a GET request and returns the status with the raw body.
    pub async fn get_raw(&self, uri: &str) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        let response = self
            .router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, body.to_vec())
    }

    /// Sends a GET request and parses the JSON body.
    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let (status, _, body) = self.get_raw(uri).await;
        let json = serde_json::from_slice(&body)
            .unwrap_or_else(|e| panic!("{} returned invalid JSON: {}", uri, e));
        (status, json)
    }
}

fn write_data_file(dir: &TempDir, relative: &str, content: &str) {
    let path = dir.path().join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

async fn execute(pool: &SqlitePool, sql: &str) {
    sqlx::query(sql)
        .execute(pool)
        .await
        .unwrap_or_else(|e| panic!("seed statement failed: {}\n{}", e, sql));
}

async fn seed_catalog(pool: &SqlitePool) {
    execute(
        pool,
        "INSERT INTO collection (id, name, description) VALUES (1, 'GTDB_refseq', 'Species pangenomes of GTDB')",
    )
    .await;
    execute(
        pool,
        "INSERT INTO taxonomysource (id, name, ranks, version) VALUES (1, 'GTDB', 'Domain;Phylum;Species', '24.1')",
    )
    .await;
    execute(pool, "INSERT INTO genomesource (id, name) VALUES (1, 'RefSeq')").await;

    let date = NaiveDate::from_ymd_opt(2025, 1, 29)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    sqlx::query(
        "INSERT INTO collectionrelease (id, version, ppanggolin_version, pangbank_wf_version, release_note,
            mash_version, latest, date, mash_sketch, mash_sketch_md5sum, pangenomes_directory,
            collection_id, taxonomy_source_id)
         VALUES (1, '1.0.0', '2.2.0', '0.0.3', 'First release', '2.3', 1, ?, 'mash/sketch.msh',
            '834feae744c43369c32b2cdbf2ada1e6', 'pangenomes', 1, 1)",
    )
    .bind(date)
    .execute(pool)
    .await
    .unwrap();

    execute(
        pool,
        "INSERT INTO taxon (id, name, rank, depth, taxonomy_source_id) VALUES
            (1, 'd__Bacteria', 'Domain', 0, 1),
            (2, 'p__Pseudomonadota', 'Phylum', 1, 1),
            (3, 's__Escherichia coli', 'Species', 2, 1),
            (4, 'p__Bacillota', 'Phylum', 1, 1),
            (5, 's__Bacillus subtilis', 'Species', 2, 1)",
    )
    .await;
    execute(
        pool,
        "INSERT INTO genome (id, name, genome_source_id) VALUES (1, 'GCF_1', 1), (2, 'GCF_2', 1), (3, 'GCF_3', 1)",
    )
    .await;
    execute(
        pool,
        "INSERT INTO genometaxonlink (genome_id, taxon_id) VALUES
            (1, 1), (1, 2), (1, 3), (2, 1), (2, 2), (2, 3), (3, 1), (3, 4), (3, 5)",
    )
    .await;

    insert_pangenome(pool, 1, "s__Escherichia_coli", 2).await;
    insert_pangenome(pool, 2, "s__Bacillus_subtilis", 1).await;
    execute(
        pool,
        "INSERT INTO pangenometaxonlink (pangenome_id, taxon_id) VALUES
            (1, 1), (1, 2), (1, 3), (2, 1), (2, 4), (2, 5)",
    )
    .await;

    insert_genome_link(pool, 1, 1, 1, "GCF_1").await;
    insert_genome_link(pool, 2, 2, 1, "GCF_2").await;
    insert_genome_link(pool, 3, 3, 2, "GCF_3").await;

    execute(
        pool,
        "INSERT INTO genomeinpangenomemetadatasource (id, name) VALUES (1, 'BioSample')",
    )
    .await;
    execute(
        pool,
        "INSERT INTO genomeinpangenomemetadata (key, value, source_id, genome_pangenome_link_id)
         VALUES ('country', 'Chile', 1, 2)",
    )
    .await;
}

async fn insert_pangenome(pool: &SqlitePool, id: i64, name: &str, genome_count: i64) {
    let sql = format!(
        "INSERT INTO pangenome (id, name, file_name, file_md5sum, collection_release_id, genome_count, {})
         VALUES ({}, '{}', '{}/pangenome.h5', 'md5_{}', 1, {}, {})",
        PANGENOME_METRICS.join(", "),
        id,
        name,
        name,
        id,
        genome_count,
        vec!["1"; PANGENOME_METRICS.len()].join(", ")
    );
    execute(pool, &sql).await;
}

async fn insert_genome_link(
    pool: &SqlitePool,
    id: i64,
    genome_id: i64,
    pangenome_id: i64,
    name: &str,
) {
    let sql = format!(
        "INSERT INTO genomepangenomelink (id, genome_id, pangenome_id, genome_file_md5sum,
            genome_file_name, genome_name, {})
         VALUES ({}, {}, {}, 'md5_{}', '{}.fna.gz', '{}', {})",
        GENOME_METRICS.join(", "),
        id,
        genome_id,
        pangenome_id,
        name,
        name,
        name,
        vec!["1"; GENOME_METRICS.len()].join(", ")
    );
    execute(pool, &sql).await;
}
