//! Principal component analysis of samples in a clean matrix.

use crate::data::CleanMatrix;
use crate::error::{DaaError, Result};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Sample coordinates on the leading principal components.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PcaResult {
    /// Sample identifiers (rows of `scores`).
    pub sample_ids: Vec<String>,
    /// Scores: one vector of length `n_components` per sample.
    pub scores: Vec<Vec<f64>>,
    /// Fraction of total variance explained by each component.
    pub explained_variance_ratio: Vec<f64>,
}

impl PcaResult {
    /// Number of components.
    pub fn n_components(&self) -> usize {
        self.explained_variance_ratio.len()
    }

    /// Scores of one sample.
    pub fn sample_scores(&self, sample_id: &str) -> Option<&[f64]> {
        let idx = self.sample_ids.iter().position(|s| s == sample_id)?;
        Some(&self.scores[idx])
    }

    /// Write scores as TSV (`sample_id`, `PC1`, `PC2`, ...).
    pub fn to_tsv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        write!(writer, "sample_id")?;
        for (k, ratio) in self.explained_variance_ratio.iter().enumerate() {
            write!(writer, "\tPC{} ({:.1}%)", k + 1, ratio * 100.0)?;
        }
        writeln!(writer)?;

        for (sample_id, scores) in self.sample_ids.iter().zip(&self.scores) {
            write!(writer, "{}", sample_id)?;
            for s in scores {
                write!(writer, "\t{:.6}", s)?;
            }
            writeln!(writer)?;
        }

        writer.flush()?;
        Ok(())
    }
}

/// Project samples onto the first `n_components` principal components.
///
/// Samples are observations and proteins are variables. Each protein is
/// centered and scaled to unit population variance; proteins with zero
/// variance contribute nothing. Component signs are fixed so that the
/// score with the largest magnitude is positive.
///
/// # Errors
/// `InvalidParameter` if fewer than two samples are present or
/// `n_components` is zero or exceeds `min(n_samples, n_proteins)`.
pub fn pca(matrix: &CleanMatrix, n_components: usize) -> Result<PcaResult> {
    let n_samples = matrix.n_samples();
    let n_proteins = matrix.n_proteins();

    if n_samples < 2 {
        return Err(DaaError::InvalidParameter(
            "PCA requires at least two samples".to_string(),
        ));
    }
    let max_components = n_samples.min(n_proteins);
    if n_components == 0 || n_components > max_components {
        return Err(DaaError::InvalidParameter(format!(
            "n_components must be between 1 and {}, got {}",
            max_components, n_components
        )));
    }

    // samples × proteins, standardized per protein
    let mut x: DMatrix<f64> = matrix.matrix().transpose();
    for mut column in x.column_iter_mut() {
        let mean = column.mean();
        let var = column.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n_samples as f64;
        let sd = var.sqrt();
        for v in column.iter_mut() {
            *v = if sd > 0.0 { (*v - mean) / sd } else { 0.0 };
        }
    }

    let svd = x.svd(true, false);
    let u = svd
        .u
        .ok_or_else(|| DaaError::Numerical("SVD did not produce left singular vectors".to_string()))?;
    let singular = svd.singular_values;

    let mut order: Vec<usize> = (0..singular.len()).collect();
    order.sort_by(|&a, &b| singular[b].total_cmp(&singular[a]));

    let total: f64 = singular.iter().map(|s| s * s).sum();
    let mut scores = vec![vec![0.0; n_components]; n_samples];
    let mut explained_variance_ratio = Vec::with_capacity(n_components);

    for (k, &idx) in order.iter().take(n_components).enumerate() {
        let s = singular[idx];
        let col = u.column(idx);
        let pivot = col
            .iter()
            .copied()
            .max_by(|a, b| a.abs().total_cmp(&b.abs()))
            .unwrap_or(0.0);
        let sign = if pivot < 0.0 { -1.0 } else { 1.0 };

        for i in 0..n_samples {
            scores[i][k] = sign * col[i] * s;
        }
        explained_variance_ratio.push(if total > 0.0 { s * s / total } else { 0.0 });
    }

    Ok(PcaResult {
        sample_ids: matrix.sample_ids().to_vec(),
        scores,
        explained_variance_ratio,
    })
}
