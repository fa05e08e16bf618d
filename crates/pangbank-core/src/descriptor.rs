//! Collection release descriptor (the JSON file given to `add-collection-release`).
//!
//! Paths inside the descriptor are relative to a data directory. Loading a
//! descriptor resolves them, checks that every referenced file exists, and
//! hashes the mash sketch.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};

use crate::error::AppError;
use crate::files::md5_file;
use crate::taxonomy::parse_ranks;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CollectionInput {
    pub name: String,
    #[serde(default, alias = "collection_description")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReleaseInput {
    pub version: String,
    pub ppanggolin_version: String,
    pub pangbank_wf_version: String,
    pub release_note: String,
    #[serde(deserialize_with = "deserialize_release_date")]
    pub date: NaiveDateTime,
    pub mash_sketch: String,
    pub mash_version: String,
    pub pangenomes_directory: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TaxonomyInput {
    pub name: String,
    pub ranks: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    pub file: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GenomeSourceInput {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    /// List of genome names, one per line.
    pub file: PathBuf,
}

/// Everything needed to ingest one collection release.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReleaseDescriptor {
    pub collection: CollectionInput,
    pub release: ReleaseInput,
    pub taxonomy: TaxonomyInput,
    #[serde(default)]
    pub genome_sources: Vec<GenomeSourceInput>,
}

/// A descriptor whose paths have been resolved and checked.
#[derive(Debug, Clone)]
pub struct LoadedRelease {
    /// Descriptor with `taxonomy.file` and `genome_sources[].file` made absolute.
    pub descriptor: ReleaseDescriptor,
    pub pangenomes_dir: PathBuf,
    pub mash_sketch_file: PathBuf,
    pub mash_sketch_md5sum: String,
}

impl ReleaseDescriptor {
    /// Parses and validates a descriptor from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, AppError> {
        let descriptor: ReleaseDescriptor =
            serde_json::from_str(json).map_err(|e| AppError::InvalidDescriptor(e.to_string()))?;
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Reads a descriptor file and resolves its paths against `data_dir`.
    ///
    /// All missing files are reported at once through [`AppError::MissingFiles`].
    pub fn load(json_path: &Path, data_dir: &Path) -> Result<LoadedRelease, AppError> {
        if !json_path.is_file() {
            return Err(AppError::DescriptorNotFound(json_path.to_path_buf()));
        }
        let content = std::fs::read_to_string(json_path)?;
        let mut descriptor = Self::from_json_str(&content)?;

        descriptor.taxonomy.file = data_dir.join(&descriptor.taxonomy.file);
        for genome_source in &mut descriptor.genome_sources {
            genome_source.file = data_dir.join(&genome_source.file);
        }
        let pangenomes_dir = data_dir.join(&descriptor.release.pangenomes_directory);
        let mash_sketch_file = data_dir.join(&descriptor.release.mash_sketch);

        let mut expected = vec![
            descriptor.taxonomy.file.clone(),
            pangenomes_dir.clone(),
            mash_sketch_file.clone(),
        ];
        expected.extend(descriptor.genome_sources.iter().map(|gs| gs.file.clone()));

        let missing: Vec<PathBuf> = expected.into_iter().filter(|p| !p.exists()).collect();
        if !missing.is_empty() {
            return Err(AppError::MissingFiles(missing));
        }
        if !pangenomes_dir.is_dir() {
            return Err(AppError::InvalidDescriptor(format!(
                "pangenomes_directory {} is not a directory",
                pangenomes_dir.display()
            )));
        }

        let mash_sketch_md5sum = md5_file(&mash_sketch_file)?;

        Ok(LoadedRelease {
            descriptor,
            pangenomes_dir,
            mash_sketch_file,
            mash_sketch_md5sum,
        })
    }

    fn validate(&self) -> Result<(), AppError> {
        let invalid = |msg: &str| Err(AppError::InvalidDescriptor(msg.to_string()));

        if self.collection.name.trim().is_empty() {
            return invalid("collection.name must not be empty");
        }
        if self.release.version.trim().is_empty() {
            return invalid("release.version must not be empty");
        }
        if self.taxonomy.name.trim().is_empty() {
            return invalid("taxonomy.name must not be empty");
        }
        if parse_ranks(&self.taxonomy.ranks).is_empty() {
            return invalid("taxonomy.ranks must list at least one rank");
        }

        let mut seen = HashSet::new();
        for genome_source in &self.genome_sources {
            if !seen.insert(genome_source.name.as_str()) {
                return Err(AppError::InvalidDescriptor(format!(
                    "genome source '{}' is listed twice",
                    genome_source.name
                )));
            }
        }
        Ok(())
    }
}

/// Description of a genome metadata source (`genome-metadata add`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MetadataSourceInput {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl MetadataSourceInput {
    pub fn from_json_str(json: &str) -> Result<Self, AppError> {
        let input: MetadataSourceInput =
            serde_json::from_str(json).map_err(|e| AppError::InvalidDescriptor(e.to_string()))?;
        if input.name.trim().is_empty() {
            return Err(AppError::InvalidDescriptor(
                "metadata source name must not be empty".to_string(),
            ));
        }
        Ok(input)
    }

    pub fn load(json_path: &Path) -> Result<Self, AppError> {
        if !json_path.is_file() {
            return Err(AppError::DescriptorNotFound(json_path.to_path_buf()));
        }
        Self::from_json_str(&std::fs::read_to_string(json_path)?)
    }
}

/// Accepts `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM:SS[.f]` and RFC 3339 timestamps.
fn deserialize_release_date<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_release_date(&raw).map_err(serde::de::Error::custom)
}

pub fn parse_release_date(raw: &str) -> Result<NaiveDateTime, String> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| format!("invalid date '{}'", raw));
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(datetime);
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return Ok(datetime);
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.naive_utc())
        .map_err(|_| {
            format!(
                "invalid date '{}': expected YYYY-MM-DD or an ISO 8601 timestamp",
                raw
            )
        })
}
