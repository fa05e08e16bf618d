//! Column lists for SELECT queries.
//!
//! These must remain const literals: they are spliced into SQL with
//! `format!()` / `QueryBuilder::push`, which bypasses bind-parameter safety.
//! Each list is prefixed with the table alias used throughout the crate.

pub const COLLECTION_COLUMNS: &str = "c.id, c.name, c.description";

pub const TAXONOMY_SOURCE_COLUMNS: &str =
    "ts.id, ts.name, ts.ranks, ts.version, ts.description, ts.source, ts.url";

pub const GENOME_SOURCE_COLUMNS: &str =
    "gs.id, gs.name, gs.version, gs.description, gs.source, gs.url";

pub const RELEASE_COLUMNS: &str = "r.id, r.version, r.ppanggolin_version, r.pangbank_wf_version, \
    r.release_note, r.mash_version, r.latest, r.date, r.collection_id, r.taxonomy_source_id, \
    r.mash_sketch, r.mash_sketch_md5sum, r.pangenomes_directory";

pub const TAXON_COLUMNS: &str = "t.id, t.name, t.rank, t.depth, t.taxid, t.taxonomy_source_id";

pub const GENOME_COLUMNS: &str = "g.id, g.name, g.genome_source_id";

pub const PANGENOME_COLUMNS: &str = "p.id, p.name, p.file_name, p.file_md5sum, \
    p.annotation_source, p.collection_release_id, \
    p.gene_count, p.genome_count, p.family_count, p.edge_count, \
    p.persistent_family_count, p.persistent_family_min_genome_frequency, \
    p.persistent_family_max_genome_frequency, p.persistent_family_std_genome_frequency, \
    p.persistent_family_mean_genome_frequency, \
    p.shell_family_count, p.shell_family_min_genome_frequency, \
    p.shell_family_max_genome_frequency, p.shell_family_std_genome_frequency, \
    p.shell_family_mean_genome_frequency, \
    p.cloud_family_count, p.cloud_family_min_genome_frequency, \
    p.cloud_family_max_genome_frequency, p.cloud_family_std_genome_frequency, \
    p.cloud_family_mean_genome_frequency, \
    p.partition_count, p.rgp_count, p.spot_count, p.module_count, p.family_in_module_count";

pub const GENOME_LINK_COLUMNS: &str = "l.id, l.genome_id, l.pangenome_id, \
    l.genome_file_md5sum, l.genome_file_name, \
    l.genome_name, l.contigs, l.genes, l.fragmented_genes, l.families, \
    l.families_with_fragments, l.families_in_multicopy, l.soft_core_families, l.soft_core_genes, \
    l.exact_core_families, l.exact_core_genes, \
    l.persistent_genes, l.persistent_fragmented_genes, l.persistent_families, \
    l.persistent_families_with_fragments, l.persistent_families_in_multicopy, \
    l.shell_genes, l.shell_fragmented_genes, l.shell_families, \
    l.shell_families_with_fragments, l.shell_families_in_multicopy, \
    l.cloud_genes, l.cloud_fragmented_genes, l.cloud_families, \
    l.cloud_families_with_fragments, l.cloud_families_in_multicopy, \
    l.completeness, l.contamination, l.fragmentation, l.rgps, l.spots, l.modules";

pub const METADATA_SOURCE_COLUMNS: &str = "ms.id, ms.name, ms.version, ms.description, ms.url";
