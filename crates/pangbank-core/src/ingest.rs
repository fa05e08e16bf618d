//! Pure logic of collection release ingestion.
//!
//! The database side lives in `pangbank-db`; this module holds the counters
//! reported at the end of an ingestion and the checks that do not need a
//! connection.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::layout;
use crate::descriptor::ReleaseInput;
use crate::error::AppError;
use crate::models::CollectionRelease;
use crate::taxonomy::normalized_ranks;

/// Whether a row was inserted or found already present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOutcome {
    Created,
    Reused,
}

/// Counters of one `add-collection-release` run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IngestSummary {
    pub genome_sources: usize,
    pub genomes_created: usize,
    pub genomes_reused: usize,
    pub taxa_created: usize,
    pub taxa_reused: usize,
    pub genome_taxon_links: usize,
    pub pangenomes_created: usize,
    pub pangenomes_skipped: usize,
    pub genome_links: usize,
    pub metadata_entries: usize,
}

impl IngestSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_genome(&mut self, outcome: RowOutcome) {
        match outcome {
            RowOutcome::Created => self.genomes_created += 1,
            RowOutcome::Reused => self.genomes_reused += 1,
        }
    }

    pub fn record_taxon(&mut self, outcome: RowOutcome) {
        match outcome {
            RowOutcome::Created => self.taxa_created += 1,
            RowOutcome::Reused => self.taxa_reused += 1,
        }
    }

    pub fn record_pangenome(&mut self, outcome: RowOutcome) {
        match outcome {
            RowOutcome::Created => self.pangenomes_created += 1,
            RowOutcome::Reused => self.pangenomes_skipped += 1,
        }
    }

    pub fn total_genomes(&self) -> usize {
        self.genomes_created + self.genomes_reused
    }
}

impl fmt::Display for IngestSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} genome source(s), {} genome(s) ({} new), {} taxa ({} new), {} genome-taxon link(s), \
             {} pangenome(s) added, {} already present, {} genome link(s), {} metadata entries",
            self.genome_sources,
            self.total_genomes(),
            self.genomes_created,
            self.taxa_created + self.taxa_reused,
            self.taxa_created,
            self.genome_taxon_links,
            self.pangenomes_created,
            self.pangenomes_skipped,
            self.genome_links,
            self.metadata_entries,
        )
    }
}

/// Fails with [`AppError::RankMismatch`] when a stored taxonomy source
/// declares other ranks than the descriptor.
pub fn check_ranks(
    name: &str,
    version: Option<&str>,
    existing_ranks: &str,
    given_ranks: &str,
) -> Result<(), AppError> {
    let existing = normalized_ranks(existing_ranks);
    let given = normalized_ranks(given_ranks);
    if existing != given {
        return Err(AppError::RankMismatch {
            name: name.to_string(),
            version: version.unwrap_or_default().to_string(),
            existing,
            given,
        });
    }
    Ok(())
}

/// Fails with [`AppError::VersionConflict`] when a stored release was built
/// with other tool versions than the descriptor.
pub fn check_release_versions(
    collection_name: &str,
    existing: &CollectionRelease,
    input: &ReleaseInput,
) -> Result<(), AppError> {
    if existing.ppanggolin_version != input.ppanggolin_version
        || existing.pangbank_wf_version != input.pangbank_wf_version
    {
        return Err(AppError::VersionConflict(format!(
            "collection {} release {}: ppanggolin_version {} vs {} in the database, \
             pangbank_wf_version {} vs {} in the database",
            collection_name,
            input.version,
            input.ppanggolin_version,
            existing.ppanggolin_version,
            input.pangbank_wf_version,
            existing.pangbank_wf_version,
        )));
    }
    Ok(())
}

/// Distinct taxon names found at each depth of the lineages.
///
/// The result has one set per rank. A lineage deeper than `ranks` is
/// rejected.
pub fn taxa_per_depth(
    genome_to_lineage: &HashMap<String, Vec<String>>,
    ranks: &[String],
    taxonomy_file: &Path,
) -> Result<Vec<BTreeSet<String>>, AppError> {
    let mut per_depth: Vec<BTreeSet<String>> = vec![BTreeSet::new(); ranks.len()];

    for (genome, lineage) in genome_to_lineage {
        if lineage.len() > ranks.len() {
            return Err(AppError::invalid_input(
                taxonomy_file,
                format!(
                    "lineage of genome {} has {} levels but the taxonomy declares {} ranks",
                    genome,
                    lineage.len(),
                    ranks.len()
                ),
            ));
        }
        for (depth, name) in lineage.iter().enumerate() {
            per_depth[depth].insert(name.clone());
        }
    }

    Ok(per_depth)
}

/// Pangenome sub-directories of a release, sorted by name.
pub fn pangenome_subdirs(pangenomes_dir: &Path) -> Result<Vec<PathBuf>, AppError> {
    let mut dirs = Vec::new();
    for entry in std::fs::read_dir(pangenomes_dir)? {
        let path = entry?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Name stored in `pangenome.file_name`: `<subdir>/pangenome.h5`.
pub fn pangenome_file_name(pangenome_dir: &Path) -> String {
    let subdir = pangenome_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{}/{}", subdir, layout::PANGENOME_FILE)
}

/// The genome checksum table of a pangenome, gzipped variant first.
pub fn genomes_md5sum_path(pangenome_dir: &Path) -> PathBuf {
    let gz = pangenome_dir.join(layout::GENOMES_MD5SUM_GZ_FILE);
    if gz.exists() {
        gz
    } else {
        pangenome_dir.join(layout::GENOMES_MD5SUM_FILE)
    }
}

/// `metadata/genomes_metadata_from_*.tsv*` files of a pangenome, sorted.
pub fn pangenome_metadata_files(pangenome_dir: &Path) -> Result<Vec<PathBuf>, AppError> {
    let metadata_dir = pangenome_dir.join(layout::METADATA_DIR);
    if !metadata_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(&metadata_dir)? {
        let path = entry?.path();
        let matches = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(layout::METADATA_FILE_PREFIX) && n.contains(".tsv"));
        if matches && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
