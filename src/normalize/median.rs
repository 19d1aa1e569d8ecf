//! Median normalization of log2 intensities.

use crate::data::IntensityFrame;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Per-sample medians and the shift applied to each sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedianNormalization {
    /// Sample identifiers.
    pub sample_ids: Vec<String>,
    /// Median of observed values per sample; `None` for an all-missing sample.
    pub sample_medians: Vec<Option<f64>>,
    /// Median of the defined per-sample medians.
    pub grand_median: Option<f64>,
    /// Amount subtracted from each sample (`sample median - grand median`).
    pub shifts: Vec<f64>,
}

/// Align sample medians to the median of sample medians.
///
/// For sample j: x_ij' = x_ij - (median_j - median(median_1..median_n)).
/// Missing values are ignored when computing medians and stay missing.
/// A sample without any observed value has no median; it does not take
/// part in the grand median and is not shifted.
///
/// Relative ordering of proteins within a sample is unchanged.
pub fn normalize_median(frame: &mut IntensityFrame) -> MedianNormalization {
    let n_samples = frame.n_samples();

    let sample_medians: Vec<Option<f64>> = (0..n_samples)
        .into_par_iter()
        .map(|j| median(&frame.observed_in_column(j)))
        .collect();

    let defined: Vec<f64> = sample_medians.iter().flatten().copied().collect();
    let grand_median = median(&defined);

    let shifts: Vec<f64> = sample_medians
        .iter()
        .map(|m| match (m, grand_median) {
            (Some(m), Some(g)) => m - g,
            _ => 0.0,
        })
        .collect();

    for (j, sample_id) in frame.sample_ids.iter().enumerate() {
        if sample_medians[j].is_none() {
            log::warn!("sample '{}' has no observed intensities; left unshifted", sample_id);
        }
    }

    for row in frame.values.iter_mut() {
        for (cell, shift) in row.iter_mut().zip(&shifts) {
            if let Some(v) = cell {
                *v -= shift;
            }
        }
    }

    MedianNormalization {
        sample_ids: frame.sample_ids.clone(),
        sample_medians,
        grand_median,
        shifts,
    }
}

/// Median of a slice; mean of the two middle values for even lengths.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let n = sorted.len();
    if n % 2 == 0 {
        Some((sorted[n / 2 - 1] + sorted[n / 2]) / 2.0)
    } else {
        Some(sorted[n / 2])
    }
}
