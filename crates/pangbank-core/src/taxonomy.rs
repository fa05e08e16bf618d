//! Taxonomy helpers: rank strings, lineages and grouping of taxa per source.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::models::{Taxon, TaxonomySource};

/// Splits a `;`-separated rank string into trimmed, non-empty rank names.
pub fn parse_ranks(ranks: &str) -> Vec<String> {
    ranks
        .split(';')
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .collect()
}

/// Title-cases a rank name (`domain` and `DOMAIN` both become `Domain`).
pub fn normalize_rank(rank: &str) -> String {
    let lower = rank.trim().to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Rank list used to compare two taxonomy sources.
pub fn normalized_ranks(ranks: &str) -> Vec<String> {
    parse_ranks(ranks).iter().map(|r| normalize_rank(r)).collect()
}

/// Returns the taxa shared by every lineage, as `(depth, name)` pairs.
///
/// An empty input has no common taxa.
pub fn common_taxa<'a, I>(lineages: I) -> Vec<(usize, String)>
where
    I: IntoIterator<Item = &'a [String]>,
{
    let mut iter = lineages.into_iter();
    let Some(first) = iter.next() else {
        return Vec::new();
    };

    let mut common: HashSet<(usize, &str)> = first
        .iter()
        .enumerate()
        .map(|(depth, name)| (depth, name.as_str()))
        .collect();

    for lineage in iter {
        let current: HashSet<(usize, &str)> = lineage
            .iter()
            .enumerate()
            .map(|(depth, name)| (depth, name.as_str()))
            .collect();
        common.retain(|entry| current.contains(entry));
        if common.is_empty() {
            break;
        }
    }

    let mut result: Vec<(usize, String)> = common
        .into_iter()
        .map(|(depth, name)| (depth, name.to_string()))
        .collect();
    result.sort();
    result
}

/// Taxa of one taxonomy source, ordered by depth.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Taxonomy {
    pub taxonomy_source: TaxonomySource,
    pub taxa: Vec<Taxon>,
}

/// Groups taxa per taxonomy source.
///
/// Taxa whose source is not in `sources` are dropped. Groups are returned in
/// source id order and taxa inside a group in depth order.
pub fn group_taxa_into_taxonomies(taxa: Vec<Taxon>, sources: &[TaxonomySource]) -> Vec<Taxonomy> {
    let mut grouped: BTreeMap<i64, Vec<Taxon>> = BTreeMap::new();
    for taxon in taxa {
        grouped.entry(taxon.taxonomy_source_id).or_default().push(taxon);
    }

    grouped
        .into_iter()
        .filter_map(|(source_id, mut taxa)| {
            let source = sources.iter().find(|s| s.id == source_id)?;
            taxa.sort_by_key(|t| t.depth);
            Some(Taxonomy {
                taxonomy_source: source.clone(),
                taxa,
            })
        })
        .collect()
}
