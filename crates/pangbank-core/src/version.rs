//! Ordering of release version strings.
//!
//! Versions are split on `.`, `-`, `+` and `_`. Purely numeric parts compare
//! numerically, other parts lexically, and a numeric part sorts after a
//! textual one (`1.0.0` > `1.0.0-rc1` style pre-release tags are not
//! special-cased beyond that). When one version is a prefix of the other the
//! shorter one is smaller.

use std::cmp::Ordering;

#[derive(Debug, PartialEq, Eq)]
enum Part<'a> {
    Num(u64),
    Text(&'a str),
}

impl Ord for Part<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Part::Num(a), Part::Num(b)) => a.cmp(b),
            (Part::Text(a), Part::Text(b)) => a.cmp(b),
            (Part::Num(_), Part::Text(_)) => Ordering::Greater,
            (Part::Text(_), Part::Num(_)) => Ordering::Less,
        }
    }
}

impl PartialOrd for Part<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn parts(version: &str) -> Vec<Part<'_>> {
    version
        .trim()
        .trim_start_matches(['v', 'V'])
        .split(['.', '-', '+', '_'])
        .filter(|p| !p.is_empty())
        .map(|p| match p.parse::<u64>() {
            Ok(n) => Part::Num(n),
            Err(_) => Part::Text(p),
        })
        .collect()
}

/// Compares two release versions.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    parts(a).cmp(&parts(b))
}
