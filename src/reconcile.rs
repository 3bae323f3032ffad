//! Set-difference reconciliation between the live listing and a persisted
//! catalog, plus the encounter-order dedup used by fresh crawls.

use std::collections::BTreeSet;

/// Links present in the live listing but absent from the catalog.
///
/// Pure set difference: the same inputs always yield the same result, and
/// once the result has been merged into `known`, a re-run yields nothing.
/// No ordering is promised downstream; items are resolved independently.
pub fn diff(live: &BTreeSet<String>, known: &BTreeSet<String>) -> BTreeSet<String> {
    live.difference(known).cloned().collect()
}

/// Drop repeated links, keeping the first occurrence in place. The scanner
/// does not deduplicate; a fresh crawl does it here before resolving.
pub fn dedup_in_order(links: Vec<String>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    links
        .into_iter()
        .filter(|link| seen.insert(link.clone()))
        .collect()
}
