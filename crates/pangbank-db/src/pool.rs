//! SQLite connection pool and embedded migrations.

use std::str::FromStr;

use pangbank_core::{AppError, DbConfig};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use tracing::{debug, info};

/// Embedded SQL migrations of the catalog schema.
pub const MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Opens (creating if needed) the SQLite database and applies pending migrations.
///
/// Foreign keys are enforced on every connection. The parent directory of
/// the database file is created when missing.
pub async fn connect(config: &DbConfig) -> Result<SqlitePool, AppError> {
    if let Some(parent) = config.path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            info!("Creating database directory {}", parent.display());
            std::fs::create_dir_all(parent)?;
        }
    }

    let options = SqliteConnectOptions::new()
        .filename(&config.path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await
        .map_err(AppError::DatabaseError)?;

    run_migrations(&pool).await?;
    debug!("Database ready at {}", config.path.display());
    Ok(pool)
}

/// Opens a private in-memory database with the schema applied.
///
/// The pool holds a single connection since every in-memory connection is
/// its own database.
pub async fn connect_in_memory() -> Result<SqlitePool, AppError> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .map_err(AppError::DatabaseError)?
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .map_err(AppError::DatabaseError)?;

    run_migrations(&pool).await?;
    Ok(pool)
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), AppError> {
    MIGRATOR.run(pool).await?;
    Ok(())
}
