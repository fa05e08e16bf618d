//! Integration tests for ReleaseRepository.

use pangbank_core::AppError;
use pangbank_db::ReleaseRepository;

use crate::integration::common::{
    FixtureOptions, ReleaseFixture, count_rows, ingest_default_release, setup_test_db,
};

/// Test 1: A first ingestion creates every row and reports it.
#[tokio::test]
async fn test_ingest_new_release() {
    // Arrange
    let (pool, _db_dir) = setup_test_db().await;
    let repo = ReleaseRepository::new(pool.clone());
    let fixture = ReleaseFixture::new(&FixtureOptions::default());

    // Act
    let summary = repo.ingest(&fixture.load()).await.expect("ingest should succeed");

    // Assert
    assert_eq!(summary.genome_sources, 1);
    assert_eq!(summary.genomes_created, 4);
    assert_eq!(summary.taxa_created, 5);
    assert_eq!(summary.genome_taxon_links, 9, "GCF_4 has no lineage");
    assert_eq!(summary.pangenomes_created, 2);
    assert_eq!(summary.genome_links, 3);
    assert_eq!(summary.metadata_entries, 2, "GCF_3 is not in the E. coli pangenome");

    assert_eq!(count_rows(&pool, "collection").await, 1);
    assert_eq!(count_rows(&pool, "collectionrelease").await, 1);
    assert_eq!(count_rows(&pool, "pangenometaxonlink").await, 6);
    assert_eq!(count_rows(&pool, "genomeinpangenomemetadatasource").await, 1);
}

/// Test 2: Release rows keep paths relative and hash the sketch and pangenome files.
#[tokio::test]
async fn test_ingest_stores_relative_paths_and_checksums() {
    let (pool, _db_dir) = setup_test_db().await;
    ingest_default_release(&pool).await;

    let (pangenomes_directory, mash_sketch, md5, latest): (String, String, String, bool) =
        sqlx::query_as(
            "SELECT pangenomes_directory, mash_sketch, mash_sketch_md5sum, latest FROM collectionrelease",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(pangenomes_directory, "pangenomes");
    assert_eq!(mash_sketch, "mash_sketch/families_persistent_all.msh");
    // md5("sketch")
    assert_eq!(md5, "834feae744c43369c32b2cdbf2ada1e6");
    assert!(latest);

    let (name, file_name): (String, String) = sqlx::query_as(
        "SELECT name, file_name FROM pangenome ORDER BY name LIMIT 1",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(name, "s__Bacillus_subtilis");
    assert_eq!(file_name, "s__Bacillus_subtilis/pangenome.h5");
}

/// Test 3: Re-ingesting the same release reuses rows and skips known pangenomes.
#[tokio::test]
async fn test_ingest_is_idempotent() {
    // Arrange
    let (pool, _db_dir) = setup_test_db().await;
    let fixture = ingest_default_release(&pool).await;
    let repo = ReleaseRepository::new(pool.clone());

    // Act
    let summary = repo.ingest(&fixture.load()).await.expect("second ingest should succeed");

    // Assert
    assert_eq!(summary.genomes_created, 0);
    assert_eq!(summary.genomes_reused, 4);
    assert_eq!(summary.taxa_created, 0);
    assert_eq!(summary.taxa_reused, 5);
    assert_eq!(summary.genome_taxon_links, 0);
    assert_eq!(summary.pangenomes_created, 0);
    assert_eq!(summary.pangenomes_skipped, 2);
    assert_eq!(count_rows(&pool, "pangenome").await, 2);
    assert_eq!(count_rows(&pool, "genomepangenomelink").await, 3);
}

/// Test 4: An existing release built with another tool version is rejected.
#[tokio::test]
async fn test_ingest_version_conflict() {
    let (pool, _db_dir) = setup_test_db().await;
    ingest_default_release(&pool).await;

    let fixture = ReleaseFixture::new(&FixtureOptions {
        ppanggolin_version: "2.3.0".to_string(),
        ..Default::default()
    });
    let err = ReleaseRepository::new(pool.clone())
        .ingest(&fixture.load())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::VersionConflict(_)));
}

/// Test 5: Known taxonomy source with other ranks is a rank mismatch.
#[tokio::test]
async fn test_ingest_rank_mismatch() {
    let (pool, _db_dir) = setup_test_db().await;
    ingest_default_release(&pool).await;

    let fixture = ReleaseFixture::new(&FixtureOptions {
        version: "2.0.0".to_string(),
        ranks: "Domain; Class; Species".to_string(),
        ..Default::default()
    });
    let err = ReleaseRepository::new(pool.clone())
        .ingest(&fixture.load())
        .await
        .unwrap_err();

    match err {
        AppError::RankMismatch { name, .. } => assert_eq!(name, "GTDB"),
        other => panic!("unexpected error: {other}"),
    }
}

/// Test 6: A failure in the middle of an ingestion rolls back every row.
#[tokio::test]
async fn test_ingest_failure_rolls_back() {
    // Arrange
    let (pool, _db_dir) = setup_test_db().await;
    let fixture = ReleaseFixture::new(&FixtureOptions {
        unknown_genome_in_statistics: true,
        ..Default::default()
    });

    // Act
    let err = ReleaseRepository::new(pool.clone())
        .ingest(&fixture.load())
        .await
        .unwrap_err();

    // Assert
    assert!(matches!(err, AppError::InvalidInput { .. }));
    assert!(err.to_string().contains("GCF_X"));
    assert_eq!(count_rows(&pool, "collection").await, 0);
    assert_eq!(count_rows(&pool, "genome").await, 0);
    assert_eq!(count_rows(&pool, "taxon").await, 0);
}

/// Test 7: The latest flag follows the highest version, numerically.
#[tokio::test]
async fn test_latest_follows_highest_version() {
    let (pool, _db_dir) = setup_test_db().await;
    let repo = ReleaseRepository::new(pool.clone());

    for version in ["1.10.0", "1.9.0"] {
        let fixture = ReleaseFixture::new(&FixtureOptions {
            version: version.to_string(),
            ..Default::default()
        });
        repo.ingest(&fixture.load()).await.unwrap();
    }

    let latest: Vec<String> =
        sqlx::query_scalar("SELECT version FROM collectionrelease WHERE latest = 1")
            .fetch_all(&pool)
            .await
            .unwrap();
    assert_eq!(latest, vec!["1.10.0"]);

    repo.delete_release("GTDB_refseq", "1.10.0").await.unwrap();

    let latest: Vec<String> =
        sqlx::query_scalar("SELECT version FROM collectionrelease WHERE latest = 1")
            .fetch_all(&pool)
            .await
            .unwrap();
    assert_eq!(latest, vec!["1.9.0"]);
}

/// Test 8: Listing returns releases highest first with pangenome counts.
#[tokio::test]
async fn test_list_collections() {
    let (pool, _db_dir) = setup_test_db().await;
    let repo = ReleaseRepository::new(pool.clone());
    assert!(repo.list_collections().await.unwrap().is_empty());

    for version in ["0.9.0", "1.0.0"] {
        let fixture = ReleaseFixture::new(&FixtureOptions {
            version: version.to_string(),
            ..Default::default()
        });
        repo.ingest(&fixture.load()).await.unwrap();
    }

    let collections = repo.list_collections().await.unwrap();
    assert_eq!(collections.len(), 1);
    assert_eq!(collections[0].collection.name, "GTDB_refseq");
    assert_eq!(
        collections[0].collection.description.as_deref(),
        Some("Species pangenomes of GTDB")
    );
    let versions: Vec<&str> = collections[0]
        .releases
        .iter()
        .map(|r| r.release.version.as_str())
        .collect();
    assert_eq!(versions, vec!["1.0.0", "0.9.0"]);
    assert!(collections[0].releases.iter().all(|r| r.pangenome_count == 2));
}

/// Test 9: Deleting a collection cascades to releases but keeps genomes and taxa.
#[tokio::test]
async fn test_delete_collection_cascades() {
    let (pool, _db_dir) = setup_test_db().await;
    ingest_default_release(&pool).await;
    let repo = ReleaseRepository::new(pool.clone());

    repo.delete_collection("GTDB_refseq").await.unwrap();

    assert_eq!(count_rows(&pool, "collection").await, 0);
    assert_eq!(count_rows(&pool, "collectionrelease").await, 0);
    assert_eq!(count_rows(&pool, "pangenome").await, 0);
    assert_eq!(count_rows(&pool, "genomepangenomelink").await, 0);
    assert_eq!(count_rows(&pool, "pangenometaxonlink").await, 0);
    assert_eq!(count_rows(&pool, "genomeinpangenomemetadata").await, 0);
    assert_eq!(count_rows(&pool, "genome").await, 4);
    assert_eq!(count_rows(&pool, "taxon").await, 5);
    assert_eq!(count_rows(&pool, "taxonomysource").await, 1);
}

/// Test 10: Deleting unknown collections or releases fails with not-found errors.
#[tokio::test]
async fn test_delete_missing() {
    let (pool, _db_dir) = setup_test_db().await;
    ingest_default_release(&pool).await;
    let repo = ReleaseRepository::new(pool.clone());

    let err = repo.delete_collection("Unknown").await.unwrap_err();
    assert!(matches!(err, AppError::CollectionNotFound(_)));

    let err = repo.delete_release("GTDB_refseq", "9.9.9").await.unwrap_err();
    assert!(matches!(err, AppError::ReleaseNotFound { .. }));
    assert!(err.is_not_found());
    assert_eq!(count_rows(&pool, "collectionrelease").await, 1);
}

/// Test 11: A taxonomy source used by a release cannot be deleted.
#[tokio::test]
async fn test_taxonomy_source_in_use_is_protected() {
    let (pool, _db_dir) = setup_test_db().await;
    ingest_default_release(&pool).await;

    let result = sqlx::query("DELETE FROM taxonomysource").execute(&pool).await;

    assert!(result.is_err(), "foreign keys must be enforced");
}
