//! Terminal rendering of catalog listings.

use pangbank_core::IngestSummary;
use pangbank_db::{CollectionSummary, MetadataLoadSummary};

const NO_COLLECTIONS: &str = "No collections found in the database.";

/// Renders one table per collection: release, pangenome count and note.
///
/// The latest release is flagged in the Release column and the collection
/// description is printed under its table.
pub fn format_collections(collections: &[CollectionSummary]) -> String {
    if collections.is_empty() {
        return format!("{}\n", NO_COLLECTIONS);
    }

    let mut out = String::new();
    for (i, summary) in collections.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&format!("Collection {}\n", summary.collection.name));

        let rows: Vec<Vec<String>> = summary
            .releases
            .iter()
            .map(|r| {
                let version = if r.release.latest {
                    format!("{} (latest)", r.release.version)
                } else {
                    r.release.version.clone()
                };
                vec![
                    version,
                    r.pangenome_count.to_string(),
                    r.release.release_note.clone(),
                ]
            })
            .collect();
        out.push_str(&render_table(&["Release", "Pangenomes", "Note"], &rows));

        if let Some(description) = &summary.collection.description {
            out.push_str(description);
            out.push('\n');
        }
    }
    out
}

/// Left-aligned table with a header rule; columns sized to their widest cell.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    push_row(&mut out, &header, &widths);

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join("-+-"));
    out.push('\n');

    for row in rows {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let padded: Vec<String> = widths
        .iter()
        .enumerate()
        .map(|(i, width)| {
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            let fill = width.saturating_sub(cell.chars().count());
            format!("{}{}", cell, " ".repeat(fill))
        })
        .collect();
    out.push_str(padded.join(" | ").trim_end());
    out.push('\n');
}

/// Lines summarizing an ingestion, for the log.
pub fn ingest_summary_lines(
    collection: &str,
    version: &str,
    summary: &IngestSummary,
) -> Vec<String> {
    vec![
        format!("Collection release {} {} ingested", collection, version),
        format!("  Genome sources:       {}", summary.genome_sources),
        format!(
            "  Genomes:              {} ({} new)",
            summary.total_genomes(),
            summary.genomes_created
        ),
        format!(
            "  Taxa:                 {} ({} new)",
            summary.taxa_created + summary.taxa_reused,
            summary.taxa_created
        ),
        format!("  Genome-taxon links:   {}", summary.genome_taxon_links),
        format!(
            "  Pangenomes:           {} added, {} already present",
            summary.pangenomes_created, summary.pangenomes_skipped
        ),
        format!("  Genome links:         {}", summary.genome_links),
        format!("  Metadata entries:     {}", summary.metadata_entries),
    ]
}

pub fn metadata_summary_lines(name: &str, summary: &MetadataLoadSummary) -> Vec<String> {
    vec![
        format!("Genome metadata source {} loaded", name),
        format!("  Genomes described:    {}", summary.genomes_described),
        format!("  Unknown genomes:      {}", summary.unknown_genomes),
        format!("  Metadata entries:     {}", summary.entries),
    ]
}
