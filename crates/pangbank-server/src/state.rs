use std::path::PathBuf;

use pangbank_core::CatalogService;
use pangbank_db::CatalogRepository;

/// Shared application state for all handlers.
///
/// Cloned per request by Axum; the repository holds the pool behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Read-only catalog service over the SQLite repository
    pub catalog: CatalogService<CatalogRepository>,
}

impl AppState {
    /// Creates the state; stored file paths resolve against `data_dir`.
    pub fn new(pool: sqlx::SqlitePool, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            catalog: CatalogService::new(CatalogRepository::new(pool), data_dir),
        }
    }
}
