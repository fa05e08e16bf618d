//! PanGBank DB - SQLite persistence for the pangenome catalog
//!
//! This crate owns the schema (embedded `sqlx` migrations) and every query
//! run against the catalog database.
//!
//! # Overview
//!
//! The main components are:
//! - [`connect`] - Pool creation with foreign keys enforced and migrations applied
//! - [`CatalogRepository`] - Read queries behind the REST API
//! - [`ReleaseRepository`] - Collection release ingestion, listing and deletion
//! - [`MetadataRepository`] - Genome metadata sources

mod catalog_repository;
mod columns;
mod metadata_repository;
mod pool;
mod release_repository;

pub use catalog_repository::CatalogRepository;
pub use metadata_repository::{MetadataLoadSummary, MetadataRepository};
pub use pool::{MIGRATOR, connect, connect_in_memory, run_migrations};
pub use release_repository::{CollectionSummary, ReleaseRepository};
