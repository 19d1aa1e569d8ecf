//! Reverse-hit and contaminant filtering.

use crate::data::RawIntensityTable;
use serde::{Deserialize, Serialize};

/// Outcome of annotation filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationFilterResult {
    /// Indices of retained rows, in file order.
    pub kept: Vec<usize>,
    /// Rows flagged as reverse hits.
    pub n_reverse: usize,
    /// Rows flagged as potential contaminants.
    pub n_contaminant: usize,
    /// Rows removed (a row carrying both flags counts once).
    pub n_removed: usize,
}

impl std::fmt::Display for AnnotationFilterResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Annotation Filter")?;
        writeln!(f, "  Reverse hits:   {}", self.n_reverse)?;
        writeln!(f, "  Contaminants:   {}", self.n_contaminant)?;
        writeln!(f, "  Removed:        {}", self.n_removed)?;
        writeln!(f, "  Kept:           {}", self.kept.len())?;
        Ok(())
    }
}

/// Drop every row flagged as a reverse hit or a potential contaminant.
pub fn filter_annotations(table: &RawIntensityTable) -> AnnotationFilterResult {
    let rows = table.rows();
    let kept: Vec<usize> = rows
        .iter()
        .enumerate()
        .filter(|(_, row)| !row.is_flagged())
        .map(|(i, _)| i)
        .collect();

    AnnotationFilterResult {
        n_reverse: rows.iter().filter(|r| r.reverse).count(),
        n_contaminant: rows.iter().filter(|r| r.contaminant).count(),
        n_removed: rows.len() - kept.len(),
        kept,
    }
}
