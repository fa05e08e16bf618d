//! Request DTOs for API endpoints.
//!
//! Query strings are flat, so each endpoint gets its own struct that splits
//! into a core filter and a [`Pagination`].

use serde::Deserialize;
use utoipa::IntoParams;

use pangbank_core::filters::DEFAULT_LIMIT;
use pangbank_core::{
    CollectionFilter, GenomeFilter, GenomeInPangenomeFilter, Pagination, PangenomeFilter,
};

/// Query parameters of `GET /collections/`.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct CollectionsQuery {
    pub collection_id: Option<i64>,
    #[param(example = "GTDB_refseq")]
    pub collection_name: Option<String>,
    /// Keep only the latest release of each collection (default: false)
    #[serde(default)]
    pub only_latest_release: bool,
}

impl From<CollectionsQuery> for CollectionFilter {
    fn from(query: CollectionsQuery) -> Self {
        Self {
            collection_id: query.collection_id,
            collection_name: query.collection_name,
            only_latest_release: query.only_latest_release,
        }
    }
}

/// Query parameters of `GET /genomes/`.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct GenomesQuery {
    #[param(example = "GCF_000005845.2")]
    pub genome_name: Option<String>,
    /// Taxon name, at least 3 characters
    #[param(example = "s__Escherichia coli")]
    pub taxon_name: Option<String>,
    /// Match taxon names as case-insensitive substrings (default: false)
    #[serde(default)]
    pub substring_match: bool,
    /// Number of items to skip (default: 0)
    pub offset: Option<i64>,
    /// Maximum number of items (default: 20, max: 100)
    pub limit: Option<i64>,
}

impl GenomesQuery {
    pub fn into_parts(self) -> (GenomeFilter, Pagination) {
        let pagination = pagination(self.offset, self.limit);
        let filter = GenomeFilter {
            genome_name: self.genome_name,
            taxon_name: self.taxon_name,
            substring_match: self.substring_match,
        };
        (filter, pagination)
    }
}

/// Query parameters of `GET /pangenomes/` and `GET /pangenomes/count/`.
///
/// `offset` and `limit` are ignored by the count endpoint.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct PangenomesQuery {
    pub collection_id: Option<i64>,
    #[param(example = "GTDB_refseq")]
    pub collection_name: Option<String>,
    /// Keep only pangenomes of latest releases (default: false)
    #[serde(default)]
    pub only_latest_release: bool,
    /// Keep pangenomes containing this genome
    pub genome_name: Option<String>,
    /// Taxon name, at least 3 characters
    #[param(example = "g__Escherichia")]
    pub taxon_name: Option<String>,
    /// Match taxon names as case-insensitive substrings (default: false)
    #[serde(default)]
    pub substring_match: bool,
    /// Number of items to skip (default: 0)
    pub offset: Option<i64>,
    /// Maximum number of items (default: 20, max: 100)
    pub limit: Option<i64>,
}

impl PangenomesQuery {
    pub fn into_parts(self) -> (PangenomeFilter, Pagination) {
        let pagination = pagination(self.offset, self.limit);
        let filter = PangenomeFilter {
            collection_id: self.collection_id,
            collection_name: self.collection_name,
            only_latest_release: self.only_latest_release,
            genome_name: self.genome_name,
            taxon_name: self.taxon_name,
            substring_match: self.substring_match,
        };
        (filter, pagination)
    }
}

/// Query parameters of `GET /pangenomes/{id}/genomes`.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct GenomesInPangenomeQuery {
    pub genome_name: Option<String>,
    /// Keep genomes carrying a metadata entry with this key
    #[param(example = "country")]
    pub metadata_key: Option<String>,
    /// Keep genomes carrying a metadata entry with this value
    pub metadata_value: Option<String>,
    /// Number of items to skip (default: 0)
    pub offset: Option<i64>,
    /// Maximum number of items (default: 20, max: 100)
    pub limit: Option<i64>,
}

impl GenomesInPangenomeQuery {
    pub fn into_parts(self) -> (GenomeInPangenomeFilter, Pagination) {
        let pagination = pagination(self.offset, self.limit);
        let filter = GenomeInPangenomeFilter {
            genome_name: self.genome_name,
            metadata_key: self.metadata_key,
            metadata_value: self.metadata_value,
        };
        (filter, pagination)
    }
}

fn pagination(offset: Option<i64>, limit: Option<i64>) -> Pagination {
    Pagination {
        offset: offset.unwrap_or(0),
        limit: limit.unwrap_or(DEFAULT_LIMIT),
    }
}
