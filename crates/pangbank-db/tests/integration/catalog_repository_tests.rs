//! Integration tests for CatalogRepository.
//!
//! Queries run against a database filled through a real ingestion.

use pangbank_core::traits::CatalogStore;
use pangbank_core::{
    CatalogService, CollectionFilter, GenomeFilter, GenomeInPangenomeFilter, Pagination,
    PangenomeFilter,
};
use pangbank_db::{CatalogRepository, connect_in_memory};

use crate::integration::common::{ingest_default_release, setup_test_db};

async fn genome_id(repo: &CatalogRepository, name: &str) -> i64 {
    let filter = GenomeFilter {
        genome_name: Some(name.to_string()),
        ..Default::default()
    };
    repo.list_genomes(&filter, Pagination::default()).await.unwrap()[0].id
}

async fn pangenome_id(repo: &CatalogRepository, name: &str) -> i64 {
    repo.list_pangenomes(&PangenomeFilter::default(), Pagination::default())
        .await
        .unwrap()
        .into_iter()
        .find(|p| p.name == name)
        .map(|p| p.id)
        .unwrap()
}

/// Test 1: Health and stats on an empty in-memory database.
#[tokio::test]
async fn test_health_and_stats_on_empty_database() {
    let pool = connect_in_memory().await.unwrap();
    let repo = CatalogRepository::new(pool);

    assert!(repo.health_check().await.is_ok());
    let stats = repo.get_stats().await.unwrap();
    assert_eq!(stats.collections, 0);
    assert_eq!(stats.pangenomes, 0);
}

/// Test 2: Stats count the ingested rows.
#[tokio::test]
async fn test_stats_after_ingestion() {
    let (pool, _db_dir) = setup_test_db().await;
    ingest_default_release(&pool).await;
    let repo = CatalogRepository::new(pool);

    let stats = repo.get_stats().await.unwrap();

    assert_eq!(stats.collections, 1);
    assert_eq!(stats.releases, 1);
    assert_eq!(stats.pangenomes, 2);
    assert_eq!(stats.genomes, 4);
    assert_eq!(stats.taxonomy_sources, 1);
}

/// Test 3: Collections filter by id and name; releases carry pangenome counts.
#[tokio::test]
async fn test_collections_and_releases() {
    let (pool, _db_dir) = setup_test_db().await;
    ingest_default_release(&pool).await;
    let repo = CatalogRepository::new(pool);

    let all = repo.list_collections(&CollectionFilter::default()).await.unwrap();
    assert_eq!(all.len(), 1);

    let by_name = CollectionFilter {
        collection_name: Some("Unknown".to_string()),
        ..Default::default()
    };
    assert!(repo.list_collections(&by_name).await.unwrap().is_empty());

    let releases = repo.list_releases(all[0].id, true).await.unwrap();
    assert_eq!(releases.len(), 1);
    assert_eq!(releases[0].pangenome_count, 2);
    assert!(releases[0].release.latest);
}

/// Test 4: Genome search by taxon, exact and by substring.
#[tokio::test]
async fn test_list_genomes_by_taxon() {
    let (pool, _db_dir) = setup_test_db().await;
    ingest_default_release(&pool).await;
    let repo = CatalogRepository::new(pool);

    let exact = GenomeFilter {
        taxon_name: Some("s__Escherichia coli".to_string()),
        ..Default::default()
    };
    let genomes = repo.list_genomes(&exact, Pagination::default()).await.unwrap();
    assert_eq!(genomes.len(), 2);

    let substring = GenomeFilter {
        taxon_name: Some("BACILLOTA".to_string()),
        substring_match: true,
        ..Default::default()
    };
    let genomes = repo.list_genomes(&substring, Pagination::default()).await.unwrap();
    assert_eq!(genomes.len(), 1);
    assert_eq!(genomes[0].name, "GCF_3");
}

/// Test 5: LIKE wildcards in the needle are matched literally.
#[tokio::test]
async fn test_substring_match_escapes_wildcards() {
    let (pool, _db_dir) = setup_test_db().await;
    ingest_default_release(&pool).await;
    let repo = CatalogRepository::new(pool);

    let filter = GenomeFilter {
        taxon_name: Some("s_%".to_string()),
        substring_match: true,
        ..Default::default()
    };
    let genomes = repo.list_genomes(&filter, Pagination::default()).await.unwrap();

    assert!(genomes.is_empty());
}

/// Test 6: Genome taxa come ordered by depth.
#[tokio::test]
async fn test_genome_taxa() {
    let (pool, _db_dir) = setup_test_db().await;
    ingest_default_release(&pool).await;
    let repo = CatalogRepository::new(pool);
    let id = genome_id(&repo, "GCF_1").await;

    let taxa = repo.genome_taxa(id).await.unwrap();

    let names: Vec<&str> = taxa.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["d__Bacteria", "p__Pseudomonadota", "s__Escherichia coli"]);
    assert_eq!(taxa[2].rank, "Species");
    assert!(repo.genome_taxa(genome_id(&repo, "GCF_4").await).await.unwrap().is_empty());
}

/// Test 7: Pangenome filters combine; pagination applies to the list only.
#[tokio::test]
async fn test_pangenome_filters_and_count() {
    let (pool, _db_dir) = setup_test_db().await;
    ingest_default_release(&pool).await;
    let repo = CatalogRepository::new(pool);

    let by_genome = PangenomeFilter {
        genome_name: Some("GCF_2".to_string()),
        ..Default::default()
    };
    let pangenomes = repo.list_pangenomes(&by_genome, Pagination::default()).await.unwrap();
    assert_eq!(pangenomes.len(), 1);
    assert_eq!(pangenomes[0].name, "s__Escherichia_coli");
    assert_eq!(pangenomes[0].metrics.gene_count, 300);

    let by_taxon = PangenomeFilter {
        taxon_name: Some("d__Bacteria".to_string()),
        collection_name: Some("GTDB_refseq".to_string()),
        only_latest_release: true,
        ..Default::default()
    };
    let page = repo
        .list_pangenomes(&by_taxon, Pagination { offset: 1, limit: 1 })
        .await
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(repo.count_pangenomes(&by_taxon).await.unwrap(), 2);

    let other_collection = PangenomeFilter {
        collection_id: Some(42),
        ..Default::default()
    };
    assert_eq!(repo.count_pangenomes(&other_collection).await.unwrap(), 0);
}

/// Test 8: Genome links filter by name and by genome-in-pangenome metadata.
#[tokio::test]
async fn test_genome_links_and_metadata() {
    let (pool, _db_dir) = setup_test_db().await;
    ingest_default_release(&pool).await;
    let repo = CatalogRepository::new(pool);
    let ecoli = pangenome_id(&repo, "s__Escherichia_coli").await;

    let links = repo
        .list_genome_links(ecoli, &GenomeInPangenomeFilter::default(), Pagination::default())
        .await
        .unwrap();
    assert_eq!(links.len(), 2);
    assert_eq!(links[0].genome_file_md5sum, "md5_1");
    assert_eq!(links[0].metrics.completeness, 98.5);

    let chile = GenomeInPangenomeFilter {
        metadata_key: Some("country".to_string()),
        metadata_value: Some("Chile".to_string()),
        ..Default::default()
    };
    let links = repo
        .list_genome_links(ecoli, &chile, Pagination::default())
        .await
        .unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].metrics.genome_name, "GCF_2");

    let link = repo
        .get_genome_link(ecoli, links[0].genome_id)
        .await
        .unwrap()
        .unwrap();
    let metadata = repo.genome_link_metadata(link.id).await.unwrap();
    assert_eq!(metadata.len(), 1);
    assert_eq!(metadata[0].key, "country");
    assert_eq!(metadata[0].value, "Chile");
}

/// Test 9: The service assembles pangenome views from the SQLite store.
#[tokio::test]
async fn test_catalog_service_over_sqlite() {
    let (pool, _db_dir) = setup_test_db().await;
    let fixture = ingest_default_release(&pool).await;
    let repo = CatalogRepository::new(pool);
    let ecoli = pangenome_id(&repo, "s__Escherichia_coli").await;
    let catalog = CatalogService::new(repo, fixture.dir.path());

    let view = catalog.get_pangenome(ecoli).await.unwrap().unwrap();
    assert_eq!(view.taxonomy.taxonomy_source.name, "GTDB");
    assert_eq!(view.taxonomy.taxa.len(), 3);
    assert_eq!(view.collection_release.collection.name, "GTDB_refseq");

    let file = catalog.pangenome_file(ecoli).await.unwrap().unwrap();
    assert_eq!(std::fs::read_to_string(file).unwrap(), "ecoli pangenome");

    let collections = catalog
        .list_collections(&CollectionFilter::default())
        .await
        .unwrap();
    let sketch = catalog
        .mash_sketch_file(collections[0].collection.id)
        .await
        .unwrap()
        .unwrap();
    assert!(sketch.is_file());

    // The trait methods dispatch to the same queries.
    assert!(CatalogStore::health_check(catalog.store()).await.is_ok());
}
