//! PanGBank Server - REST API over the pangenome catalog
//!
//! This crate provides a read-only HTTP API over a PanGBank database:
//!
//! - **Collections**: Collections, their releases and mash sketches
//! - **Genomes**: Genomes with their sources and taxonomies
//! - **Pangenomes**: Pangenome search, counts, file downloads and member genomes
//!
//! # API Documentation
//!
//! When running the server, interactive API documentation is available
//! at `/swagger-ui`.

pub mod config;
pub mod dto;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod openapi;
pub mod router;
pub mod state;

pub use config::ServerConfig;
pub use error::ApiError;
pub use router::create_router;
pub use state::AppState;
