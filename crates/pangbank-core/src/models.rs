//! Domain models mirroring the catalog tables.
//!
//! Each struct maps one row of the SQLite schema (see the `pangbank-db`
//! migrations). Metric blocks are split into their own structs and flattened
//! both in SQL rows and in JSON so that the wire shape stays flat.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A named set of pangenome releases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Collection {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

/// Origin of the lineages attached to genomes (e.g. GTDB 24.1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TaxonomySource {
    pub id: i64,
    pub name: String,
    /// `;`-separated rank names, from the root down.
    pub ranks: String,
    pub version: Option<String>,
    pub description: Option<String>,
    pub source: Option<String>,
    pub url: Option<String>,
}

/// Origin of genome assemblies (e.g. RefSeq, GenBank).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct GenomeSource {
    pub id: i64,
    pub name: String,
    pub version: Option<String>,
    pub description: Option<String>,
    pub source: Option<String>,
    pub url: Option<String>,
}

/// One versioned release of a collection.
///
/// `pangenomes_directory` and `mash_sketch` are stored relative to the data
/// root the release was ingested from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CollectionRelease {
    pub id: i64,
    pub version: String,
    pub ppanggolin_version: String,
    pub pangbank_wf_version: String,
    pub release_note: String,
    pub mash_version: String,
    pub latest: bool,
    pub date: NaiveDateTime,
    pub collection_id: i64,
    pub taxonomy_source_id: i64,
    pub mash_sketch: String,
    pub mash_sketch_md5sum: String,
    pub pangenomes_directory: String,
}

/// A node of a taxonomy, identified by source, depth and name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Taxon {
    pub id: i64,
    pub name: String,
    pub rank: String,
    pub depth: i64,
    pub taxid: Option<i64>,
    pub taxonomy_source_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Genome {
    pub id: i64,
    pub name: String,
    pub genome_source_id: Option<i64>,
}

/// Summary statistics of a pangenome, read from its `info.yaml`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, sqlx::FromRow)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PangenomeMetrics {
    pub gene_count: i64,
    pub genome_count: i64,
    pub family_count: i64,
    pub edge_count: i64,

    pub persistent_family_count: i64,
    pub persistent_family_min_genome_frequency: f64,
    pub persistent_family_max_genome_frequency: f64,
    pub persistent_family_std_genome_frequency: f64,
    pub persistent_family_mean_genome_frequency: f64,

    pub shell_family_count: i64,
    pub shell_family_min_genome_frequency: f64,
    pub shell_family_max_genome_frequency: f64,
    pub shell_family_std_genome_frequency: f64,
    pub shell_family_mean_genome_frequency: f64,

    pub cloud_family_count: i64,
    pub cloud_family_min_genome_frequency: f64,
    pub cloud_family_max_genome_frequency: f64,
    pub cloud_family_std_genome_frequency: f64,
    pub cloud_family_mean_genome_frequency: f64,

    pub partition_count: i64,
    pub rgp_count: i64,
    pub spot_count: i64,

    pub module_count: i64,
    pub family_in_module_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Pangenome {
    pub id: i64,
    pub name: String,
    /// Path of the HDF5 file relative to the release's pangenome directory.
    pub file_name: String,
    pub file_md5sum: String,
    pub annotation_source: Option<String>,
    pub collection_release_id: i64,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub metrics: PangenomeMetrics,
}

/// Per-genome statistics within one pangenome (`genomes_statistics.tsv`).
///
/// Field names are the lower-cased TSV column names.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, sqlx::FromRow)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct GenomeInPangenomeMetrics {
    pub genome_name: String,
    pub contigs: i64,
    pub genes: i64,
    pub fragmented_genes: i64,
    pub families: i64,
    pub families_with_fragments: i64,
    pub families_in_multicopy: i64,
    pub soft_core_families: i64,
    pub soft_core_genes: i64,
    pub exact_core_families: i64,
    pub exact_core_genes: i64,
    pub persistent_genes: i64,
    pub persistent_fragmented_genes: i64,
    pub persistent_families: i64,
    pub persistent_families_with_fragments: i64,
    pub persistent_families_in_multicopy: i64,
    pub shell_genes: i64,
    pub shell_fragmented_genes: i64,
    pub shell_families: i64,
    pub shell_families_with_fragments: i64,
    pub shell_families_in_multicopy: i64,
    pub cloud_genes: i64,
    pub cloud_fragmented_genes: i64,
    pub cloud_families: i64,
    pub cloud_families_with_fragments: i64,
    pub cloud_families_in_multicopy: i64,
    pub completeness: f64,
    pub contamination: f64,
    pub fragmentation: f64,
    pub rgps: i64,
    pub spots: i64,
    pub modules: i64,
}

/// Membership of a genome in a pangenome, with its statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct GenomePangenomeLink {
    pub id: i64,
    pub genome_id: i64,
    pub pangenome_id: i64,
    pub genome_file_md5sum: String,
    pub genome_file_name: String,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub metrics: GenomeInPangenomeMetrics,
}

/// A key/value pair attached to a genome or to a genome-in-pangenome link.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::FromRow)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct MetadataEntry {
    pub key: String,
    pub value: String,
}

impl MetadataEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Provider of genome-level metadata (loaded with `genome-metadata add`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct GenomeMetadataSource {
    pub id: i64,
    pub name: String,
    pub version: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
}

/// Aggregate row counts of the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CatalogStats {
    pub collections: i64,
    pub releases: i64,
    pub pangenomes: i64,
    pub genomes: i64,
    pub taxonomy_sources: i64,
}
