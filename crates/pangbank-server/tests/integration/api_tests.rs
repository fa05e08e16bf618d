//! Endpoint tests through the full router.

use axum::http::{StatusCode, header};

use crate::integration::common::TestApp;

/// Test 1: Health reports the database and the crate version.
#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["database"]["healthy"], true);
}

/// Test 2: Health degrades instead of failing once the pool is closed.
#[tokio::test]
async fn test_health_check_degraded() {
    let app = TestApp::new().await;
    app.pool.close().await;

    let (status, body) = app.get("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["database"]["healthy"], false);
    assert!(body["database"]["message"].is_string());
}

/// Test 3: Stats count the seeded rows.
#[tokio::test]
async fn test_stats() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/stats").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["collections"], 1);
    assert_eq!(body["releases"], 1);
    assert_eq!(body["pangenomes"], 2);
    assert_eq!(body["genomes"], 3);
    assert_eq!(body["taxonomy_sources"], 1);
}

/// Test 4: Collections are served with and without the trailing slash.
#[tokio::test]
async fn test_list_collections() {
    // Arrange
    let app = TestApp::new().await;

    // Act
    let (status, body) = app.get("/collections/").await;
    let (status_no_slash, body_no_slash) = app.get("/collections").await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(status_no_slash, StatusCode::OK);
    assert_eq!(body, body_no_slash);

    let collections = body.as_array().unwrap();
    assert_eq!(collections.len(), 1);
    assert_eq!(collections[0]["name"], "GTDB_refseq");

    let release = &collections[0]["releases"][0];
    assert_eq!(release["version"], "1.0.0");
    assert_eq!(release["latest"], true);
    assert_eq!(release["pangenome_count"], 2);
    assert_eq!(release["collection_name"], "GTDB_refseq");
    assert_eq!(release["taxonomy_source"]["name"], "GTDB");
    assert_eq!(release["date"], "2025-01-29T00:00:00");
}

/// Test 5: Collection filters narrow the list.
#[tokio::test]
async fn test_list_collections_filtered() {
    let app = TestApp::new().await;

    let (_, body) = app.get("/collections/?collection_name=Other").await;
    assert_eq!(body.as_array().unwrap().len(), 0);

    let (_, body) = app
        .get("/collections/?collection_id=1&only_latest_release=true")
        .await;
    assert_eq!(body[0]["releases"].as_array().unwrap().len(), 1);
}

/// Test 6: Unknown collections are 404 with a JSON error body.
#[tokio::test]
async fn test_get_collection_not_found() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/collections/42").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
    assert_eq!(body["message"], "Collection with id=42 not found");

    let (status, body) = app.get("/collections/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["description"], "Species pangenomes of GTDB");
}

/// Test 7: The mash sketch streams from the data directory.
#[tokio::test]
async fn test_download_mash_sketch() {
    let app = TestApp::new().await;

    let (status, headers, body) = app.get_raw("/collections/1/mash_sketch").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"sketch");
    let disposition = headers[header::CONTENT_DISPOSITION].to_str().unwrap();
    assert_eq!(disposition, "attachment; filename=\"sketch.msh\"");

    let (status, _, _) = app.get_raw("/collections/42/mash_sketch").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

/// Test 8: A sketch missing on disk is a 404.
#[tokio::test]
async fn test_download_mash_sketch_missing_file() {
    let app = TestApp::new().await;
    std::fs::remove_file(app.data_dir.path().join("mash/sketch.msh")).unwrap();

    let (status, body) = app.get("/collections/1/mash_sketch").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

/// Test 9: Genomes come with their source and taxonomy.
#[tokio::test]
async fn test_genomes() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/genomes/?genome_name=GCF_3").await;
    assert_eq!(status, StatusCode::OK);
    let genomes = body.as_array().unwrap();
    assert_eq!(genomes.len(), 1);
    assert_eq!(genomes[0]["genome_source"]["name"], "RefSeq");

    let taxa = genomes[0]["taxonomies"][0]["taxa"].as_array().unwrap();
    let names: Vec<&str> = taxa.iter().map(|t| t["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["d__Bacteria", "p__Bacillota", "s__Bacillus subtilis"]);

    let id = genomes[0]["id"].as_i64().unwrap();
    let (status, body) = app.get(&format!("/genomes/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "GCF_3");

    let (status, _) = app.get("/genomes/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

/// Test 10: Taxon search by substring, and validation of short names.
#[tokio::test]
async fn test_genomes_by_taxon() {
    let app = TestApp::new().await;

    let (status, body) = app
        .get("/genomes/?taxon_name=escherichia&substring_match=true")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, body) = app.get("/genomes/?taxon_name=es").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

/// Test 11: Pagination bounds are enforced.
#[tokio::test]
async fn test_pagination_limits() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/genomes/?limit=2&offset=1").await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["GCF_2", "GCF_3"]);

    let (status, _) = app.get("/pangenomes/?limit=101").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.get("/genomes/?offset=-1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

/// Test 12: Pangenomes carry metrics, release and a single taxonomy.
#[tokio::test]
async fn test_pangenomes() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/pangenomes/?genome_name=GCF_2").await;

    assert_eq!(status, StatusCode::OK);
    let pangenomes = body.as_array().unwrap();
    assert_eq!(pangenomes.len(), 1);
    let pangenome = &pangenomes[0];
    assert_eq!(pangenome["name"], "s__Escherichia_coli");
    assert_eq!(pangenome["genome_count"], 2);
    assert_eq!(pangenome["collection_release"]["collection"]["name"], "GTDB_refseq");
    assert_eq!(pangenome["taxonomy"]["taxonomy_source"]["name"], "GTDB");
    assert_eq!(pangenome["taxonomy"]["taxa"].as_array().unwrap().len(), 3);

    let (status, body) = app.get("/pangenomes/2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "s__Bacillus_subtilis");

    let (status, body) = app.get("/pangenomes/9").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Pangenome with id=9 not found");
}

/// Test 13: The count endpoint applies the same filters.
#[tokio::test]
async fn test_count_pangenomes() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/pangenomes/count/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, 2);

    let (_, body) = app
        .get("/pangenomes/count?taxon_name=p__Bacillota&only_latest_release=true")
        .await;
    assert_eq!(body, 1);

    let (_, body) = app.get("/pangenomes/count/?collection_name=Other").await;
    assert_eq!(body, 0);
}

/// Test 14: Pangenome files download as pangenome.h5; missing files are 404.
#[tokio::test]
async fn test_download_pangenome_file() {
    let app = TestApp::new().await;

    let (status, headers, body) = app.get_raw("/pangenomes/1/file").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"ecoli pangenome");
    assert_eq!(
        headers[header::CONTENT_DISPOSITION].to_str().unwrap(),
        "attachment; filename=\"pangenome.h5\""
    );
    assert_eq!(
        headers[header::CONTENT_TYPE].to_str().unwrap(),
        "application/octet-stream"
    );

    // Pangenome 2 has no file on disk.
    let (status, _) = app.get("/pangenomes/2/file").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.get("/pangenomes/9/file").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

/// Test 15: Genomes of a pangenome, filtered by name or metadata.
#[tokio::test]
async fn test_genomes_in_pangenome() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/pangenomes/1/genomes").await;
    assert_eq!(status, StatusCode::OK);
    let links = body.as_array().unwrap();
    assert_eq!(links.len(), 2);
    assert_eq!(links[0]["genome_name"], "GCF_1");
    assert_eq!(links[0]["genome_file_md5sum"], "md5_GCF_1");
    assert_eq!(links[0]["genome_file_name"], "GCF_1.fna.gz");

    let (_, body) = app.get("/pangenomes/1/genomes/?genome_name=GCF_2").await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (_, body) = app
        .get("/pangenomes/1/genomes?metadata_key=country&metadata_value=Chile")
        .await;
    let links = body.as_array().unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0]["genome_name"], "GCF_2");

    // An existing pangenome without matches is an empty list, not a 404.
    let (status, body) = app.get("/pangenomes/2/genomes?genome_name=GCF_1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 0);

    let (status, _) = app.get("/pangenomes/9/genomes").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

/// Test 16: One genome of a pangenome with its metadata.
#[tokio::test]
async fn test_genome_in_pangenome() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/pangenomes/1/genomes/2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["genome_name"], "GCF_2");
    assert_eq!(body["genome_metadata"][0]["key"], "country");
    assert_eq!(body["genome_metadata"][0]["value"], "Chile");

    // GCF_3 is not part of pangenome 1.
    let (status, _) = app.get("/pangenomes/1/genomes/3").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

/// Test 17: The OpenAPI document lists the catalog routes.
#[tokio::test]
async fn test_openapi_document() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/api-docs/openapi.json").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["info"]["title"], "PanGBank API");
    assert!(body["paths"]["/pangenomes/{id}/file"].is_object());
    assert!(body["paths"]["/collections/"].is_object());
}

/// Test 18: Malformed query and path parameters get the JSON error body.
#[tokio::test]
async fn test_malformed_parameters_are_bad_requests() {
    let app = TestApp::new().await;

    for uri in [
        "/genomes/?limit=abc",
        "/collections/?only_latest_release=maybe",
        "/pangenomes/count?substring_match=perhaps",
        "/pangenomes/one",
        "/pangenomes/1/genomes/GCF_1",
    ] {
        let (status, body) = app.get(uri).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["error"], "bad_request", "{uri}");
        assert!(body["message"].is_string(), "{uri}");
    }
}
