//! Working intensity frame used between preprocessing steps.

use serde::{Deserialize, Serialize};

/// Protein × sample intensities that may still contain missing values.
///
/// Produced by identity cleanup; rows are keyed by unique protein identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntensityFrame {
    /// Unique protein identities (row keys).
    pub protein_ids: Vec<String>,
    /// Sample identifiers (column keys).
    pub sample_ids: Vec<String>,
    /// Row-major values; `None` marks a missing value.
    pub values: Vec<Vec<Option<f64>>>,
}

impl IntensityFrame {
    /// Number of proteins.
    pub fn n_proteins(&self) -> usize {
        self.protein_ids.len()
    }

    /// Number of samples.
    pub fn n_samples(&self) -> usize {
        self.sample_ids.len()
    }

    /// Observed values of one sample column.
    pub fn observed_in_column(&self, col: usize) -> Vec<f64> {
        self.values.iter().filter_map(|row| row[col]).collect()
    }

    /// Total number of missing entries.
    pub fn n_missing(&self) -> usize {
        self.values
            .iter()
            .map(|row| row.iter().filter(|v| v.is_none()).count())
            .sum()
    }
}
