use std::collections::HashSet;
use std::hash::Hash;

/// Fold freshly scraped records into the existing history.
///
/// With no history the fresh records are the dataset as-is. Otherwise fresh
/// records go first, followed by the history, and exact duplicates are
/// dropped keeping the earliest occurrence.
pub fn merge<R: Eq + Hash>(fresh: Vec<R>, existing: Option<Vec<R>>) -> Vec<R> {
    match existing {
        None => fresh,
        Some(existing) => dedup_keep_first(fresh.into_iter().chain(existing).collect()),
    }
}

/// Drop exact duplicates, keeping the first occurrence in place.
pub fn dedup_keep_first<R: Eq + Hash>(records: Vec<R>) -> Vec<R> {
    let keep: Vec<bool> = {
        let mut seen = HashSet::with_capacity(records.len());
        records.iter().map(|r| seen.insert(r)).collect()
    };

    records
        .into_iter()
        .zip(keep)
        .filter_map(|(record, keep)| keep.then_some(record))
        .collect()
}
