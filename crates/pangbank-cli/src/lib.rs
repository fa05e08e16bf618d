//! PanGBank CLI - data management commands for the catalog database
//!
//! The `pangbank` binary ingests collection releases, lists and deletes
//! them, and manages genome metadata sources.

pub mod config;
pub mod output;

pub use config::{Command, Config, MetadataCommand, version_info};
