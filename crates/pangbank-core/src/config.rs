//! Configuration types and on-disk layout constants.
//!
//! Binaries parse their flags with `clap` (falling back to environment
//! variables); the defaults they share live here.

use std::path::{Path, PathBuf};

/// Default location of the SQLite database file.
pub const DEFAULT_DATABASE_PATH: &str = "database/database.db";

/// Default root directory holding pangenome files and mash sketches.
pub const DEFAULT_DATA_DIR: &str = "data/";

/// Database connection pool configuration.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
    pub max_connections: u32,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DATABASE_PATH),
            max_connections: 5,
        }
    }
}

impl DbConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections.max(1);
        self
    }
}

/// File names expected inside each pangenome directory of a release.
pub mod layout {
    pub const PANGENOME_FILE: &str = "pangenome.h5";
    pub const INFO_FILE: &str = "info.yaml";
    pub const GENOMES_MD5SUM_FILE: &str = "genomes_md5sum.tsv";
    pub const GENOMES_MD5SUM_GZ_FILE: &str = "genomes_md5sum.tsv.gz";
    pub const GENOMES_STATISTICS_FILE: &str = "genomes_statistics.tsv.gz";
    pub const METADATA_DIR: &str = "metadata";
    pub const METADATA_FILE_PREFIX: &str = "genomes_metadata_from_";
    /// File name offered to clients downloading a pangenome.
    pub const DOWNLOAD_NAME: &str = "pangenome.h5";
}

/// Resolves a path stored in the catalog against a data root.
///
/// Absolute paths are returned unchanged.
pub fn resolve_data_path(data_dir: &Path, stored: impl AsRef<Path>) -> PathBuf {
    let stored = stored.as_ref();
    if stored.is_absolute() {
        stored.to_path_buf()
    } else {
        data_dir.join(stored)
    }
}
