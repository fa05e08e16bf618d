//! HTTP request handlers for API endpoints.

pub mod collections;
pub mod download;
pub mod genomes;
pub mod health;
pub mod pangenomes;
pub mod stats;
