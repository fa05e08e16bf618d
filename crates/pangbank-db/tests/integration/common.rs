//! Test utilities for integration tests.
//!
//! Provides a fresh SQLite database per test and builders for the directory
//! layout of a collection release.

use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use pangbank_core::{DbConfig, LoadedRelease, ReleaseDescriptor};
use pangbank_db::{ReleaseRepository, connect};
use sqlx::SqlitePool;
use tempfile::TempDir;

/// Creates a database file in a fresh temporary directory.
///
/// The database lives in a sub-directory that does not exist yet, so every
/// test also covers parent directory creation. Keep the `TempDir` alive for
/// the test duration.
pub async fn setup_test_db() -> (SqlitePool, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = DbConfig::new(dir.path().join("database").join("database.db"));
    let pool = connect(&config).await.expect("Failed to open database");
    (pool, dir)
}

pub fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

pub fn write_gz(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let file = std::fs::File::create(path).unwrap();
    let mut encoder = GzEncoder::new(file, Compression::default());
    encoder.write_all(content.as_bytes()).unwrap();
    encoder.finish().unwrap();
}

const STATS_HEADER: &str = "Genome_name\tContigs\tGenes\tFragmented_genes\tFamilies\tFamilies_with_fragments\tFamilies_in_multicopy\tSoft_core_families\tSoft_core_genes\tExact_core_families\tExact_core_genes\tPersistent_genes\tPersistent_fragmented_genes\tPersistent_families\tPersistent_families_with_fragments\tPersistent_families_in_multicopy\tShell_genes\tShell_fragmented_genes\tShell_families\tShell_families_with_fragments\tShell_families_in_multicopy\tCloud_genes\tCloud_fragmented_genes\tCloud_families\tCloud_families_with_fragments\tCloud_families_in_multicopy\tCompleteness\tContamination\tFragmentation\tRGPs\tSpots\tModules";

fn stats_row(genome: &str) -> String {
    format!(
        "{}\t1\t100\t0\t90\t0\t2\t80\t85\t70\t72\t80\t0\t75\t0\t1\t15\t0\t10\t0\t1\t5\t0\t5\t0\t0\t98.5\t0.5\t0.0\t3\t2\t1",
        genome
    )
}

const INFO_YAML: &str = r#"Content:
  Genes: 300
  Genomes: 2
  Families: 120
  Edges: 150
  Persistent:
    Family_count: 80
    min_genomes_frequency: 1.0
    max_genomes_frequency: 1.0
    sd_genomes_frequency: 0.0
    mean_genomes_frequency: 1.0
  Shell:
    Family_count: 0
    min_genomes_frequency: 0.0
    max_genomes_frequency: 0.0
    sd_genomes_frequency: 0.0
    mean_genomes_frequency: 0.0
  Cloud:
    Family_count: 40
    min_genomes_frequency: 0.5
    max_genomes_frequency: 0.5
    sd_genomes_frequency: 0.0
    mean_genomes_frequency: 0.5
  Number_of_partitions: 2
  RGP: 4
  Spots: 1
  Modules:
    Number_of_modules: 1
    Families_in_Modules: 3
"#;

/// Knobs of a generated release directory.
pub struct FixtureOptions {
    pub collection: String,
    pub version: String,
    pub ppanggolin_version: String,
    pub ranks: String,
    /// Adds a statistics row for a genome listed by no genome source.
    pub unknown_genome_in_statistics: bool,
}

impl Default for FixtureOptions {
    fn default() -> Self {
        Self {
            collection: "GTDB_refseq".to_string(),
            version: "1.0.0".to_string(),
            ppanggolin_version: "2.2.0".to_string(),
            ranks: "Domain; Phylum; Species".to_string(),
            unknown_genome_in_statistics: false,
        }
    }
}

/// A release data directory with its descriptor.
///
/// Layout:
/// - 4 genomes in `RefSeq.list`; `GCF_4` has no lineage
/// - `s__Escherichia_coli` with GCF_1, GCF_2 and a BioSample metadata table
/// - `s__Bacillus_subtilis` with GCF_3
pub struct ReleaseFixture {
    pub dir: TempDir,
    pub descriptor_path: PathBuf,
}

impl ReleaseFixture {
    pub fn new(options: &FixtureOptions) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let root = dir.path();

        write_gz(
            &root.join("taxonomy.tsv.gz"),
            "GCF_1\td__Bacteria;p__Pseudomonadota;s__Escherichia coli\n\
             GCF_2\td__Bacteria;p__Pseudomonadota;s__Escherichia coli\n\
             GCF_3\td__Bacteria;p__Bacillota;s__Bacillus subtilis\n",
        );
        write_file(&root.join("RefSeq.list"), "GCF_1\nGCF_2\nGCF_3\nGCF_4\n");
        write_file(&root.join("mash_sketch/families_persistent_all.msh"), "sketch");

        let ecoli = root.join("pangenomes/s__Escherichia_coli");
        write_file(&ecoli.join("pangenome.h5"), "ecoli pangenome");
        write_file(&ecoli.join("info.yaml"), INFO_YAML);
        write_file(
            &ecoli.join("genomes_md5sum.tsv"),
            "name\tmd5_sum\tfile_name\n\
             GCF_1\tmd5_1\tGCF_1.fna.gz\n\
             GCF_2\tmd5_2\tGCF_2.fna.gz\n\
             GCF_X\tmd5_x\tGCF_X.fna.gz\n",
        );
        let mut statistics = format!(
            "#soft_core=0.95\n{}\n{}\n{}\n",
            STATS_HEADER,
            stats_row("GCF_1"),
            stats_row("GCF_2")
        );
        if options.unknown_genome_in_statistics {
            statistics.push_str(&stats_row("GCF_X"));
            statistics.push('\n');
        }
        write_gz(&ecoli.join("genomes_statistics.tsv.gz"), &statistics);
        write_file(
            &ecoli.join("metadata/genomes_metadata_from_BioSample.tsv"),
            "Genome\tcountry\nGCF_1\tFrance\nGCF_2\tChile\nGCF_3\tSpain\n",
        );

        let bsub = root.join("pangenomes/s__Bacillus_subtilis");
        write_file(&bsub.join("pangenome.h5"), "bsub pangenome");
        write_file(&bsub.join("info.yaml"), INFO_YAML);
        write_gz(
            &bsub.join("genomes_md5sum.tsv.gz"),
            "name\tmd5_sum\tfile_name\nGCF_3\tmd5_3\tGCF_3.fna.gz\n",
        );
        write_gz(
            &bsub.join("genomes_statistics.tsv.gz"),
            &format!("{}\n{}\n", STATS_HEADER, stats_row("GCF_3")),
        );

        let descriptor = serde_json::json!({
            "collection": {"name": options.collection, "description": "Species pangenomes of GTDB"},
            "release": {
                "version": options.version,
                "ppanggolin_version": options.ppanggolin_version,
                "pangbank_wf_version": "0.0.3",
                "pangenomes_directory": "pangenomes",
                "release_note": "Test release",
                "date": "2025-01-29",
                "mash_sketch": "mash_sketch/families_persistent_all.msh",
                "mash_version": "2.3"
            },
            "taxonomy": {"name": "GTDB", "version": "24.1", "ranks": options.ranks, "file": "taxonomy.tsv.gz"},
            "genome_sources": [{"name": "RefSeq", "file": "RefSeq.list"}]
        });
        let descriptor_path = root.join("input.json");
        write_file(&descriptor_path, &descriptor.to_string());

        Self {
            dir,
            descriptor_path,
        }
    }

    pub fn load(&self) -> LoadedRelease {
        ReleaseDescriptor::load(&self.descriptor_path, self.dir.path())
            .expect("Fixture descriptor should load")
    }
}

/// Ingests a default release and returns its fixture.
pub async fn ingest_default_release(pool: &SqlitePool) -> ReleaseFixture {
    let fixture = ReleaseFixture::new(&FixtureOptions::default());
    ReleaseRepository::new(pool.clone())
        .ingest(&fixture.load())
        .await
        .expect("ingest should succeed");
    fixture
}

pub async fn count_rows(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await
        .unwrap()
}
