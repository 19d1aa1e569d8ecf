//! Result types for differential abundance analysis.

use crate::error::{DaaError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Direction of a significant change, as drawn on a volcano plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Regulation {
    /// Significant with log2 fold change above the threshold.
    Up,
    /// Significant with log2 fold change below the negative threshold.
    Down,
    /// Everything else, including undefined tests.
    NotSignificant,
}

impl Regulation {
    /// Classify a result by adjusted p-value and fold-change magnitude.
    ///
    /// Both comparisons are strict. NaN adjusted p-values never classify as
    /// significant.
    pub fn classify(result: &ProteinResult, alpha: f64, fc_threshold: f64) -> Self {
        if !(result.adj_p_value < alpha) {
            return Self::NotSignificant;
        }
        if result.log2_fold_change > fc_threshold {
            Self::Up
        } else if result.log2_fold_change < -fc_threshold {
            Self::Down
        } else {
            Self::NotSignificant
        }
    }

    /// Get the descriptive name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::NotSignificant => "not_significant",
        }
    }
}

/// Result for a single protein.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProteinResult {
    /// Protein identity.
    pub protein_id: String,
    /// Mean(treatment) minus mean(control) on the log2 scale.
    pub log2_fold_change: f64,
    /// Welch t statistic (NaN when undefined).
    pub statistic: f64,
    /// Welch-Satterthwaite degrees of freedom (NaN when undefined).
    pub df: f64,
    /// Raw two-sided p-value (NaN when undefined).
    pub p_value: f64,
    /// Adjusted p-value (NaN when the raw p-value is undefined).
    pub adj_p_value: f64,
}

impl ProteinResult {
    /// Whether the test produced a p-value for this protein.
    pub fn is_defined(&self) -> bool {
        !self.p_value.is_nan()
    }

    /// The raw and adjusted p-values, or `UndefinedStatistic`.
    pub fn require_defined(&self) -> Result<(f64, f64)> {
        if self.is_defined() {
            Ok((self.p_value, self.adj_p_value))
        } else {
            Err(DaaError::UndefinedStatistic(self.protein_id.clone()))
        }
    }
}

/// Per-protein results, in clean matrix row order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsTable {
    /// Individual results.
    pub results: Vec<ProteinResult>,
    /// Number of proteins with a defined p-value (BH `m`).
    pub n_tested: usize,
}

impl ResultsTable {
    /// Create a results table.
    pub fn new(results: Vec<ProteinResult>) -> Self {
        let n_tested = results.iter().filter(|r| r.is_defined()).count();
        Self { results, n_tested }
    }

    /// Number of results.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Iterate over results.
    pub fn iter(&self) -> impl Iterator<Item = &ProteinResult> {
        self.results.iter()
    }

    /// Result for a protein.
    pub fn get(&self, protein_id: &str) -> Option<&ProteinResult> {
        self.results.iter().find(|r| r.protein_id == protein_id)
    }

    /// Protein identities in table order.
    pub fn protein_ids(&self) -> Vec<&str> {
        self.results.iter().map(|r| r.protein_id.as_str()).collect()
    }

    /// Effect sizes sorted descending, for pre-ranked enrichment tools.
    ///
    /// Ties keep table order.
    pub fn ranked_by_fold_change(&self) -> Vec<(String, f64)> {
        let mut ranked: Vec<(String, f64)> = self
            .results
            .iter()
            .map(|r| (r.protein_id.clone(), r.log2_fold_change))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }

    /// Results sorted by adjusted p-value; undefined rows last.
    pub fn sorted_by_adj_pvalue(&self) -> Vec<&ProteinResult> {
        let mut sorted: Vec<_> = self.results.iter().collect();
        sorted.sort_by(|a, b| match (a.adj_p_value.is_nan(), b.adj_p_value.is_nan()) {
            (false, false) => a.adj_p_value.total_cmp(&b.adj_p_value),
            (a_nan, b_nan) => a_nan.cmp(&b_nan),
        });
        sorted
    }

    /// Regulation call for every row, in table order.
    pub fn classify(&self, alpha: f64, fc_threshold: f64) -> Vec<Regulation> {
        self.results
            .iter()
            .map(|r| Regulation::classify(r, alpha, fc_threshold))
            .collect()
    }

    /// Count results by regulation call.
    pub fn summary(&self, alpha: f64, fc_threshold: f64) -> ResultSummary {
        let calls = self.classify(alpha, fc_threshold);
        ResultSummary {
            total: self.len(),
            tested: self.n_tested,
            undefined: self.len() - self.n_tested,
            up: calls.iter().filter(|c| **c == Regulation::Up).count(),
            down: calls.iter().filter(|c| **c == Regulation::Down).count(),
            alpha,
            fc_threshold,
        }
    }

    /// Write results to a TSV file. Undefined values are written as `NA`.
    pub fn to_tsv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        writeln!(
            writer,
            "protein_id\tlog2_fold_change\tstatistic\tdf\tp_value\tadj_p_value"
        )?;

        for r in &self.results {
            writeln!(
                writer,
                "{}\t{:.6}\t{}\t{}\t{}\t{}",
                r.protein_id,
                r.log2_fold_change,
                fmt_or_na(r.statistic, |v| format!("{:.4}", v)),
                fmt_or_na(r.df, |v| format!("{:.2}", v)),
                fmt_or_na(r.p_value, |v| format!("{:.4e}", v)),
                fmt_or_na(r.adj_p_value, |v| format!("{:.4e}", v)),
            )?;
        }

        writer.flush()?;
        Ok(())
    }
}

fn fmt_or_na(value: f64, f: impl Fn(f64) -> String) -> String {
    if value.is_nan() {
        "NA".to_string()
    } else {
        f(value)
    }
}

/// Summary counts for a results table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultSummary {
    pub total: usize,
    pub tested: usize,
    pub undefined: usize,
    pub up: usize,
    pub down: usize,
    pub alpha: f64,
    pub fc_threshold: f64,
}

impl std::fmt::Display for ResultSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Proteins in table:  {}", self.total)?;
        writeln!(f, "Tested:             {}", self.tested)?;
        writeln!(f, "Undefined tests:    {}", self.undefined)?;
        writeln!(
            f,
            "Up (q < {}, log2FC > {}):    {}",
            self.alpha, self.fc_threshold, self.up
        )?;
        writeln!(
            f,
            "Down (q < {}, log2FC < -{}): {}",
            self.alpha, self.fc_threshold, self.down
        )?;
        Ok(())
    }
}
