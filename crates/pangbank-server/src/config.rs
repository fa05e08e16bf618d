use clap::Parser;
use std::path::PathBuf;

use pangbank_core::{DEFAULT_DATA_DIR, DEFAULT_DATABASE_PATH, DbConfig};

/// Server configuration parsed from command line arguments and environment variables
#[derive(Parser, Debug, Clone)]
#[command(name = "pangbank-server")]
#[command(author, version, about = "REST API server for the PanGBank pangenome catalog")]
pub struct ServerConfig {
    /// Path of the SQLite database file
    #[arg(long, env = "DATABASE_PATH", default_value = DEFAULT_DATABASE_PATH)]
    pub database_path: PathBuf,

    /// Root directory of pangenome files and mash sketches
    #[arg(long, env = "DATA_DIR", default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Server port to listen on
    #[arg(short, long, env = "PORT", default_value = "8000")]
    pub port: u16,

    /// Server host to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Allowed CORS origins, comma separated ("*" allows any origin)
    #[arg(long, env = "CORS_ORIGINS", default_value = "*")]
    pub cors_origins: String,

    /// Maximum number of pooled database connections
    #[arg(long, env = "DB_MAX_CONNECTIONS", default_value = "5")]
    pub max_connections: u32,
}

impl ServerConfig {
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path).with_max_connections(self.max_connections)
    }
}
