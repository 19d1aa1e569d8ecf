//! Protein identity cleanup: drop unnamed rows, keep first duplicate.

use crate::data::IntensityFrame;
use crate::filter::projection::ProjectedTable;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Statistics of identity cleanup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdentityCleanup {
    /// Rows dropped for lacking an identity.
    pub n_missing_identity: usize,
    /// Identities that appeared more than once (each listed once).
    pub duplicated: Vec<String>,
    /// Later duplicate rows dropped.
    pub n_duplicates_dropped: usize,
}

/// Drop rows without identity and deduplicate by identity.
///
/// The first occurrence in file order wins; later rows with the same
/// identity are discarded, never merged or averaged.
pub fn clean_identities(table: ProjectedTable) -> (IntensityFrame, IdentityCleanup) {
    let mut stats = IdentityCleanup::default();
    let mut seen: HashSet<String> = HashSet::new();
    let mut protein_ids = Vec::new();
    let mut values = Vec::new();

    for (identity, row) in table.identities.into_iter().zip(table.values) {
        let Some(id) = identity else {
            stats.n_missing_identity += 1;
            continue;
        };
        if seen.contains(&id) {
            if !stats.duplicated.contains(&id) {
                stats.duplicated.push(id);
            }
            stats.n_duplicates_dropped += 1;
            continue;
        }
        seen.insert(id.clone());
        protein_ids.push(id);
        values.push(row);
    }

    let frame = IntensityFrame {
        protein_ids,
        sample_ids: table.sample_ids,
        values,
    };
    (frame, stats)
}
