//! Router configuration and route composition.

use std::time::Duration;

use axum::http::{HeaderValue, Method};
use axum::{Router, routing::get};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::ServerConfig;
use crate::handlers::{collections, genomes, health, pangenomes, stats};
use crate::openapi::ApiDoc;
use crate::state::AppState;

/// Creates the main application router with all routes and middleware.
///
/// Every route answers with and without a trailing slash.
pub fn create_router(state: AppState, config: &ServerConfig) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/", get(health::health_check))
        .route("/stats", get(stats::get_stats))
        .route("/stats/", get(stats::get_stats))
        .route("/collections", get(collections::list_collections))
        .route("/collections/", get(collections::list_collections))
        .route("/collections/:id", get(collections::get_collection))
        .route("/collections/:id/", get(collections::get_collection))
        .route("/collections/:id/mash_sketch", get(collections::get_mash_sketch))
        .route("/collections/:id/mash_sketch/", get(collections::get_mash_sketch))
        .route("/genomes", get(genomes::list_genomes))
        .route("/genomes/", get(genomes::list_genomes))
        .route("/genomes/:id", get(genomes::get_genome))
        .route("/genomes/:id/", get(genomes::get_genome))
        .route("/pangenomes", get(pangenomes::list_pangenomes))
        .route("/pangenomes/", get(pangenomes::list_pangenomes))
        .route("/pangenomes/count", get(pangenomes::count_pangenomes))
        .route("/pangenomes/count/", get(pangenomes::count_pangenomes))
        .route("/pangenomes/:id", get(pangenomes::get_pangenome))
        .route("/pangenomes/:id/", get(pangenomes::get_pangenome))
        .route("/pangenomes/:id/file", get(pangenomes::get_pangenome_file))
        .route("/pangenomes/:id/file/", get(pangenomes::get_pangenome_file))
        .route(
            "/pangenomes/:id/genomes",
            get(pangenomes::list_genomes_in_pangenome),
        )
        .route(
            "/pangenomes/:id/genomes/",
            get(pangenomes::list_genomes_in_pangenome),
        )
        .route(
            "/pangenomes/:id/genomes/:genome_id",
            get(pangenomes::get_genome_in_pangenome),
        )
        .route(
            "/pangenomes/:id/genomes/:genome_id/",
            get(pangenomes::get_genome_in_pangenome),
        );

    let cors_layer = build_cors_layer(&config.cors_origins);

    api_routes
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Middleware layers (order matters: bottom layers run first)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

/// Build CORS layer from configuration.
///
/// If `origins` is "*", allows any origin.
/// Otherwise, parses comma-separated origins.
fn build_cors_layer(origins: &str) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
        ])
        .max_age(Duration::from_secs(3600));

    if origins == "*" {
        cors.allow_origin(tower_http::cors::Any)
    } else {
        let allowed: Vec<HeaderValue> = origins
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors.allow_origin(allowed)
    }
}
