//! Missing value profiling for raw intensity tables.

use crate::data::RawIntensityTable;
use crate::normalize::median;
use serde::{Deserialize, Serialize};

/// Profile of missing and zero intensities in a raw table.
///
/// Zeros count as missing, matching how preprocessing treats them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissingnessProfile {
    /// Number of protein rows.
    pub n_proteins: usize,
    /// Number of samples.
    pub n_samples: usize,
    /// Total number of entries (rows × samples).
    pub total_entries: usize,
    /// Entries with no stored value.
    pub absent_entries: usize,
    /// Entries stored as exactly zero.
    pub zero_entries: usize,
    /// Overall missing proportion (absent + zero).
    pub missing_fraction: f64,
    /// Missing proportion per sample.
    pub sample_missing: Vec<f64>,
    /// Missing proportion per protein row.
    pub protein_missing: Vec<f64>,
    /// Median missing proportion across proteins.
    pub median_protein_missing: f64,
    /// Rows observed in every sample.
    pub n_complete: usize,
    /// Rows observed in no sample.
    pub n_empty: usize,
    /// Rows flagged as reverse hit or contaminant.
    pub n_flagged: usize,
}

impl MissingnessProfile {
    /// Check if more than half of all entries are missing.
    pub fn is_highly_missing(&self) -> bool {
        self.missing_fraction > 0.5
    }
}

impl std::fmt::Display for MissingnessProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Missingness Profile")?;
        writeln!(f, "  Proteins:          {}", self.n_proteins)?;
        writeln!(f, "  Samples:           {}", self.n_samples)?;
        writeln!(f, "  Absent entries:    {}", self.absent_entries)?;
        writeln!(f, "  Zero entries:      {}", self.zero_entries)?;
        writeln!(f, "  Overall missing:   {:.2}%", self.missing_fraction * 100.0)?;
        writeln!(f, "  Median per protein: {:.2}%", self.median_protein_missing * 100.0)?;
        writeln!(f, "  Complete rows:     {}", self.n_complete)?;
        writeln!(f, "  Empty rows:        {}", self.n_empty)?;
        writeln!(f, "  Flagged rows:      {}", self.n_flagged)?;
        Ok(())
    }
}

/// Profile missing values of a raw intensity table (all rows, before filtering).
pub fn profile_missingness(table: &RawIntensityTable) -> MissingnessProfile {
    let n_proteins = table.n_rows();
    let n_samples = table.n_samples();
    let total_entries = n_proteins * n_samples;

    let mut absent_entries = 0;
    let mut zero_entries = 0;
    let mut sample_counts = vec![0usize; n_samples];
    let mut protein_missing = Vec::with_capacity(n_proteins);
    let mut n_complete = 0;
    let mut n_empty = 0;

    for row in table.rows() {
        let mut row_missing = 0;
        for (j, value) in row.intensities.iter().enumerate() {
            let missing = match value {
                None => {
                    absent_entries += 1;
                    true
                }
                Some(v) if *v == 0.0 => {
                    zero_entries += 1;
                    true
                }
                Some(_) => false,
            };
            if missing {
                row_missing += 1;
                sample_counts[j] += 1;
            }
        }
        if row_missing == 0 {
            n_complete += 1;
        }
        if row_missing == n_samples {
            n_empty += 1;
        }
        protein_missing.push(fraction(row_missing, n_samples));
    }

    MissingnessProfile {
        n_proteins,
        n_samples,
        total_entries,
        absent_entries,
        zero_entries,
        missing_fraction: fraction(absent_entries + zero_entries, total_entries),
        sample_missing: sample_counts
            .iter()
            .map(|&c| fraction(c, n_proteins))
            .collect(),
        median_protein_missing: median(&protein_missing).unwrap_or(0.0),
        protein_missing,
        n_complete,
        n_empty,
        n_flagged: table.rows().iter().filter(|r| r.is_flagged()).count(),
    }
}

fn fraction(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}
