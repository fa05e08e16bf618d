use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::LazyLock;

use pangbank_core::{DEFAULT_DATABASE_PATH, DbConfig};

static VERSION_INFO: LazyLock<String> = LazyLock::new(|| {
    let version = env!("CARGO_PKG_VERSION");

    let mut commit = option_env!("VERGEN_GIT_SHA")
        .map(|s| s.chars().take(7).collect::<String>())
        .unwrap_or_else(|| "unknown".to_string());
    if option_env!("VERGEN_GIT_DIRTY") == Some("true") {
        commit.push_str("-dirty");
    }

    let built = option_env!("VERGEN_BUILD_DATE").unwrap_or("unknown"); // YYYY-MM-DD
    let target = option_env!("VERGEN_CARGO_TARGET_TRIPLE").unwrap_or("unknown");
    let rustc = option_env!("VERGEN_RUSTC_SEMVER").unwrap_or("unknown");

    format!("{version}\ncommit: {commit}\nbuilt: {built}\ntarget: {target}\nrustc: {rustc}")
});

pub fn version_info() -> &'static str {
    &VERSION_INFO
}

/// CLI configuration parsed from command line arguments and environment variables
#[derive(Parser, Debug)]
#[command(name = "pangbank")]
#[command(
    author,
    version = version_info(),
    about = "Manage the PanGBank pangenome catalog database"
)]
#[command(after_help = "Examples:
  pangbank add-collection-release release.json --pangbank-data-dir /data/pangbank
  pangbank list-collections
  pangbank delete-collection GTDB_refseq --release-version 1.0.0
  pangbank genome-metadata add biosample.json genomes_metadata.tsv.gz")]
pub struct Config {
    /// Path of the SQLite database file (created when missing)
    #[arg(long, global = true, env = "DATABASE_PATH", default_value = DEFAULT_DATABASE_PATH)]
    pub database_path: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

impl Config {
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path)
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a collection release described by a JSON file
    #[command(after_help = "Paths inside the JSON file are resolved against --pangbank-data-dir.
Re-running on an already ingested release only adds what is missing.")]
    AddCollectionRelease {
        /// Release descriptor (JSON)
        #[arg(value_name = "JSON")]
        collection_release_json: PathBuf,

        /// Root directory holding the release files
        #[arg(long, env = "PANGBANK_DATA_DIR", default_value = "./")]
        pangbank_data_dir: PathBuf,
    },
    /// List collections and their releases
    ListCollections,
    /// Delete a collection, or one of its releases
    #[command(after_help = "Examples:
  pangbank delete-collection GTDB_refseq                         # Whole collection
  pangbank delete-collection GTDB_refseq --release-version 1.0.0 # One release")]
    DeleteCollection {
        /// Collection name
        collection_name: String,

        /// Only delete this release
        #[arg(long, value_name = "VERSION")]
        release_version: Option<String>,
    },
    /// Manage genome metadata sources
    GenomeMetadata {
        #[command(subcommand)]
        command: MetadataCommand,
    },
}

/// Genome metadata subcommands
#[derive(Subcommand, Debug)]
pub enum MetadataCommand {
    /// Load a metadata table for the genomes found in pangenomes
    Add {
        /// Source description (JSON with name, version, description, url)
        #[arg(value_name = "SOURCE_JSON")]
        source_json: PathBuf,

        /// Tab-separated table with a `Genome` column, optionally gzipped
        #[arg(value_name = "TABLE")]
        metadata_table: PathBuf,
    },
    /// Delete a metadata source and its metadata
    Delete {
        /// Source name
        name: String,

        /// Only delete this version of the source
        #[arg(long)]
        version: Option<String>,
    },
}
