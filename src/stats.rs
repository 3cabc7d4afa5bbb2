//! Store statistics: per-collection counts and a serialized-size estimate.

use crate::store::{Collection, Store, StoreError};

/// Human-readable storage statistics.
#[derive(Debug, Clone)]
pub struct StoreStats {
    /// `(collection, record count)` in collection order.
    pub counts: Vec<(Collection, usize)>,
    pub total_records: usize,
    /// Size of the serialized snapshot, in KiB, rounded to two decimals.
    pub size_kb: f64,
}

/// Compute statistics for the current store contents.
pub fn collect_stats(store: &Store) -> Result<StoreStats, StoreError> {
    let counts: Vec<(Collection, usize)> = Collection::ALL
        .into_iter()
        .map(|c| (c, store.select(c).len()))
        .collect();
    let total_records = counts.iter().map(|(_, n)| n).sum();

    let serialized = serde_json::to_string(store.snapshot())
        .map_err(|e| StoreError::Persistence(e.to_string()))?;
    let size_kb = (serialized.len() as f64 / 1024.0 * 100.0).round() / 100.0;

    Ok(StoreStats {
        counts,
        total_records,
        size_kb,
    })
}
