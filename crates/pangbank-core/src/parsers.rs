//! Readers for the files shipped with a collection release.
//!
//! Every reader goes through [`open_input`], so plain and gzip-compressed
//! files are accepted alike. Errors name the offending file.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::config::layout::METADATA_FILE_PREFIX;
use crate::error::AppError;
use crate::files::{open_input, read_lines};
use crate::models::{GenomeInPangenomeMetrics, MetadataEntry, PangenomeMetrics};

// =============================================================================
// Taxonomy and genome lists
// =============================================================================

/// Parses a `genome<TAB>lineage` file into genome name -> lineage.
///
/// Lineages are `;`-separated and each taxon name is trimmed.
pub fn parse_taxonomy_file(path: &Path) -> Result<HashMap<String, Vec<String>>, AppError> {
    let mut genome_to_lineage = HashMap::new();

    for (index, line) in read_lines(path)?.into_iter().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        let [genome, lineage] = fields.as_slice() else {
            return Err(AppError::invalid_input(
                path,
                format!(
                    "line {}: expected 'genome<TAB>lineage', found {} tab-separated fields",
                    index + 1,
                    fields.len()
                ),
            ));
        };

        let lineage: Vec<String> = lineage
            .split(';')
            .map(|name| name.trim().to_string())
            .collect();
        genome_to_lineage.insert(genome.trim().to_string(), lineage);
    }

    Ok(genome_to_lineage)
}

/// Reads a genome list, one name per line.
pub fn parse_genome_list(path: &Path) -> Result<Vec<String>, AppError> {
    Ok(read_lines(path)?
        .into_iter()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect())
}

// =============================================================================
// Per-pangenome tables
// =============================================================================

/// Row of `genomes_md5sum.tsv`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GenomeFileInfo {
    pub name: String,
    pub md5_sum: String,
    pub file_name: String,
}

fn tsv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .comment(Some(b'#'))
        .from_reader(reader)
}

/// Parses the genome checksum table, keyed by genome name.
pub fn parse_genomes_md5sum(path: &Path) -> Result<HashMap<String, GenomeFileInfo>, AppError> {
    let mut reader = tsv_reader(open_input(path)?);
    let mut genome_to_info = HashMap::new();

    for (index, row) in reader.deserialize::<GenomeFileInfo>().enumerate() {
        let info =
            row.map_err(|e| AppError::invalid_input(path, format!("row {}: {}", index + 1, e)))?;
        genome_to_info.insert(info.name.clone(), info);
    }

    Ok(genome_to_info)
}

/// Parses the per-genome statistics of a pangenome.
///
/// Lines starting with `#` are comments and column names are matched
/// case-insensitively.
pub fn parse_genome_statistics(path: &Path) -> Result<Vec<GenomeInPangenomeMetrics>, AppError> {
    let mut reader = tsv_reader(open_input(path)?);

    let headers = reader
        .headers()
        .map_err(|e| AppError::invalid_input(path, format!("cannot read header: {}", e)))?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect::<csv::StringRecord>();
    reader.set_headers(headers.clone());

    let mut metrics = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| AppError::invalid_input(path, e.to_string()))?;
        let row: GenomeInPangenomeMetrics = record.deserialize(Some(&headers)).map_err(|e| {
            AppError::invalid_input(
                path,
                format!("error parsing row {:?}: {}", record.iter().collect::<Vec<_>>(), e),
            )
        })?;
        metrics.push(row);
    }

    Ok(metrics)
}

// =============================================================================
// info.yaml
// =============================================================================

#[derive(Debug, Deserialize)]
struct InfoFile {
    #[serde(rename = "Content")]
    content: InfoContent,
}

#[derive(Debug, Deserialize)]
struct InfoContent {
    #[serde(rename = "Genes")]
    genes: i64,
    #[serde(rename = "Genomes")]
    genomes: i64,
    #[serde(rename = "Families")]
    families: i64,
    #[serde(rename = "Edges")]
    edges: i64,
    #[serde(rename = "Persistent")]
    persistent: PartitionInfo,
    #[serde(rename = "Shell")]
    shell: PartitionInfo,
    #[serde(rename = "Cloud")]
    cloud: PartitionInfo,
    #[serde(rename = "Number_of_partitions")]
    number_of_partitions: i64,
    #[serde(rename = "RGP")]
    rgp: i64,
    #[serde(rename = "Spots")]
    spots: i64,
    #[serde(rename = "Modules")]
    modules: ModulesInfo,
}

#[derive(Debug, Deserialize)]
struct PartitionInfo {
    #[serde(rename = "Family_count")]
    family_count: i64,
    min_genomes_frequency: f64,
    max_genomes_frequency: f64,
    sd_genomes_frequency: f64,
    mean_genomes_frequency: f64,
}

#[derive(Debug, Deserialize)]
struct ModulesInfo {
    #[serde(rename = "Number_of_modules")]
    number_of_modules: i64,
    #[serde(rename = "Families_in_Modules")]
    families_in_modules: i64,
}

/// Reads the pangenome summary statistics from an `info.yaml` file.
pub fn parse_info_yaml(path: &Path) -> Result<PangenomeMetrics, AppError> {
    let reader = open_input(path)?;
    let info: InfoFile = serde_yaml::from_reader(reader)
        .map_err(|e| AppError::invalid_input(path, e.to_string()))?;
    let c = info.content;

    Ok(PangenomeMetrics {
        gene_count: c.genes,
        genome_count: c.genomes,
        family_count: c.families,
        edge_count: c.edges,

        persistent_family_count: c.persistent.family_count,
        persistent_family_min_genome_frequency: c.persistent.min_genomes_frequency,
        persistent_family_max_genome_frequency: c.persistent.max_genomes_frequency,
        persistent_family_std_genome_frequency: c.persistent.sd_genomes_frequency,
        persistent_family_mean_genome_frequency: c.persistent.mean_genomes_frequency,

        shell_family_count: c.shell.family_count,
        shell_family_min_genome_frequency: c.shell.min_genomes_frequency,
        shell_family_max_genome_frequency: c.shell.max_genomes_frequency,
        shell_family_std_genome_frequency: c.shell.sd_genomes_frequency,
        shell_family_mean_genome_frequency: c.shell.mean_genomes_frequency,

        cloud_family_count: c.cloud.family_count,
        cloud_family_min_genome_frequency: c.cloud.min_genomes_frequency,
        cloud_family_max_genome_frequency: c.cloud.max_genomes_frequency,
        cloud_family_std_genome_frequency: c.cloud.sd_genomes_frequency,
        cloud_family_mean_genome_frequency: c.cloud.mean_genomes_frequency,

        partition_count: c.number_of_partitions,
        rgp_count: c.rgp,
        spot_count: c.spots,

        module_count: c.modules.number_of_modules,
        family_in_module_count: c.modules.families_in_modules,
    })
}

// =============================================================================
// Metadata tables
// =============================================================================

/// Column holding the genome name in metadata tables.
pub const METADATA_GENOME_COLUMN: &str = "Genome";

/// Parses a metadata table into `(genome, entries)` pairs, in file order.
///
/// Every column other than `Genome` becomes one entry.
pub fn parse_metadata_table(path: &Path) -> Result<Vec<(String, Vec<MetadataEntry>)>, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .from_reader(open_input(path)?);

    let headers = reader
        .headers()
        .map_err(|e| AppError::invalid_input(path, format!("cannot read header: {}", e)))?
        .clone();
    let genome_index = headers
        .iter()
        .position(|h| h == METADATA_GENOME_COLUMN)
        .ok_or_else(|| {
            AppError::invalid_input(
                path,
                "missing 'Genome' column. Ensure the TSV contains a 'Genome' column.",
            )
        })?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| AppError::invalid_input(path, e.to_string()))?;
        let genome = record
            .get(genome_index)
            .map(str::to_string)
            .unwrap_or_default();

        let entries = headers
            .iter()
            .zip(record.iter())
            .enumerate()
            .filter(|(i, _)| *i != genome_index)
            .map(|(_, (key, value))| MetadataEntry::new(key, value))
            .collect();
        rows.push((genome, entries));
    }

    Ok(rows)
}

/// Extracts the source name from `genomes_metadata_from_<source>.tsv[.gz]`.
pub fn metadata_source_from_filename(path: &Path) -> Result<String, AppError> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();

    let invalid = || {
        AppError::invalid_input(
            path,
            format!(
                "invalid metadata file name '{}'. Expected format: '{}<source>.tsv' or '{}<source>.tsv.gz'",
                file_name, METADATA_FILE_PREFIX, METADATA_FILE_PREFIX
            ),
        )
    };

    let stem = file_name
        .strip_prefix(METADATA_FILE_PREFIX)
        .ok_or_else(invalid)?;
    let source = stem
        .strip_suffix(".tsv.gz")
        .or_else(|| stem.strip_suffix(".tsv"))
        .ok_or_else(invalid)?
        .trim();

    if source.is_empty() {
        return Err(AppError::invalid_input(
            path,
            format!(
                "metadata file name '{}' does not contain a valid source name",
                file_name
            ),
        ));
    }
    Ok(source.to_string())
}
