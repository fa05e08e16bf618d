use std::path::PathBuf;

use thiserror::Error;

/// Application-wide error types.
///
/// This enum represents all possible errors that can occur while loading,
/// querying or deleting PanGBank data. It uses the `thiserror` crate for
/// ergonomic error handling and automatic conversion from underlying library
/// errors.
///
/// # Error Conversion
///
/// Most errors automatically convert from their source types using the `#[from]` attribute:
/// - `sqlx::Error` → `AppError::DatabaseError`
/// - `sqlx::migrate::MigrateError` → `AppError::MigrationError`
/// - `std::io::Error` → `AppError::IoError`
/// - `serde_json::Error` → `AppError::SerializationError`
///
/// # Examples
///
/// ```no_run
/// use pangbank_core::error::AppError;
///
/// fn example() -> Result<(), AppError> {
///     Err(AppError::CollectionNotFound("GTDB_refseq".to_string()))
/// }
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// Database operation failed.
    ///
    /// This error wraps all errors from SQLx database operations, including
    /// connection failures, query errors, and constraint violations.
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    /// Applying the embedded schema migrations failed.
    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    /// Filesystem access failed.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// The release descriptor JSON file does not exist.
    #[error("Descriptor file not found: {}", .0.display())]
    DescriptorNotFound(PathBuf),

    /// The release descriptor is not valid JSON or does not match the expected structure.
    #[error("Invalid descriptor: {0}")]
    InvalidDescriptor(String),

    /// Files referenced by a descriptor are absent from the data directory.
    #[error("Missing files: {}", format_paths(.0))]
    MissingFiles(Vec<PathBuf>),

    /// An input file (taxonomy, genome table, info.yaml...) is malformed.
    #[error("Invalid input in {}: {message}", path.display())]
    InvalidInput { path: PathBuf, message: String },

    /// A taxonomy source already in the database declares different ranks.
    #[error(
        "Discrepancy in ranks for taxonomy source {name} ({version}): existing ranks {existing:?} vs given ranks {given:?}"
    )]
    RankMismatch {
        name: String,
        version: String,
        existing: Vec<String>,
        given: Vec<String>,
    },

    /// A release already in the database was built with other tool versions.
    #[error("Version conflict: {0}")]
    VersionConflict(String),

    /// Collection not found in the database.
    #[error("Collection '{0}' not found in the database")]
    CollectionNotFound(String),

    /// Collection release not found in the database.
    #[error("Collection release '{collection}' (version: {version}) not found in the database")]
    ReleaseNotFound { collection: String, version: String },

    /// A genome metadata source with the same name and version is already loaded.
    #[error("Genome metadata source '{name}' version '{version}' already exists in the database")]
    MetadataSourceExists { name: String, version: String },

    /// Stored rows violate an invariant the catalog relies on.
    #[error("Data integrity error: {0}")]
    DataIntegrity(String),

    /// A query parameter is out of range or malformed.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Generic application error for cases not covered by specific variants.
    ///
    /// Use this sparingly - prefer creating specific error variants
    /// for better error handling and debugging.
    #[error("Error: {0}")]
    Generic(String),
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl AppError {
    /// Builds an [`AppError::InvalidInput`] for the given file.
    pub fn invalid_input(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        AppError::InvalidInput {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Returns a user-friendly error message suitable for CLI output.
    pub fn user_message(&self) -> String {
        match self {
            AppError::DatabaseError(e) => {
                if e.to_string().contains("unable to open database file") {
                    "Cannot open the SQLite database.\n   Check DATABASE_PATH and that its directory is writable.".to_string()
                } else {
                    format!("Database error: {}", e)
                }
            }
            AppError::DescriptorNotFound(path) => {
                format!("JSON file '{}' does not exist.", path.display())
            }
            AppError::InvalidDescriptor(msg) => {
                format!("JSON structure validation failed:\n   {}", msg)
            }
            AppError::MissingFiles(paths) => {
                let mut message = "The following files are missing:".to_string();
                for path in paths {
                    message.push_str(&format!("\n  - {}", path.display()));
                }
                message
            }
            AppError::ConfigError(msg) => {
                format!(
                    "Configuration error: {}\n   Check your environment variables and flags.",
                    msg
                )
            }
            _ => self.to_string(),
        }
    }

    /// Returns true if this error means the requested record does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AppError::CollectionNotFound(_) | AppError::ReleaseNotFound { .. }
        )
    }
}
