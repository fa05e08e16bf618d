//! Query filters shared by the REST API and the catalog service.

use serde::Deserialize;

use crate::error::AppError;

pub const DEFAULT_LIMIT: i64 = 20;
pub const MAX_LIMIT: i64 = 100;
pub const MIN_TAXON_NAME_LEN: usize = 3;

/// Offset/limit pagination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Pagination {
    /// Number of items to skip.
    #[serde(default)]
    pub offset: i64,
    /// Maximum number of items returned (1 to 100).
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Pagination {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.offset < 0 {
            return Err(AppError::ValidationError(
                "offset must be greater than or equal to 0".to_string(),
            ));
        }
        if self.limit < 1 || self.limit > MAX_LIMIT {
            return Err(AppError::ValidationError(format!(
                "limit must be between 1 and {}",
                MAX_LIMIT
            )));
        }
        Ok(())
    }
}

/// Filters of `GET /collections/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CollectionFilter {
    pub collection_id: Option<i64>,
    pub collection_name: Option<String>,
    /// Keep only the latest release of each collection.
    #[serde(default)]
    pub only_latest_release: bool,
}

/// Filters of `GET /genomes/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GenomeFilter {
    pub genome_name: Option<String>,
    /// At least three characters.
    pub taxon_name: Option<String>,
    /// Match taxon names case-insensitively as substrings.
    #[serde(default)]
    pub substring_match: bool,
}

impl GenomeFilter {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_taxon_name(self.taxon_name.as_deref())
    }
}

/// Filters of `GET /pangenomes/` and `GET /pangenomes/count/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PangenomeFilter {
    pub collection_id: Option<i64>,
    pub collection_name: Option<String>,
    #[serde(default)]
    pub only_latest_release: bool,
    pub genome_name: Option<String>,
    /// At least three characters.
    pub taxon_name: Option<String>,
    #[serde(default)]
    pub substring_match: bool,
}

impl PangenomeFilter {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_taxon_name(self.taxon_name.as_deref())
    }
}

/// Filters of `GET /pangenomes/{id}/genomes`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GenomeInPangenomeFilter {
    pub genome_name: Option<String>,
    /// Keep links carrying a metadata entry with this key.
    pub metadata_key: Option<String>,
    /// Keep links carrying a metadata entry with this value.
    pub metadata_value: Option<String>,
}

fn validate_taxon_name(taxon_name: Option<&str>) -> Result<(), AppError> {
    match taxon_name {
        Some(name) if name.chars().count() < MIN_TAXON_NAME_LEN => {
            Err(AppError::ValidationError(format!(
                "taxon_name must be at least {} characters long",
                MIN_TAXON_NAME_LEN
            )))
        }
        _ => Ok(()),
    }
}

/// SQL `LIKE` pattern for a case-insensitive substring search.
///
/// `%`, `_` and `\` are escaped; use with `ESCAPE '\'`.
pub fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
