//! Row-mean imputation of missing intensities.

use crate::data::{CleanMatrix, IntensityFrame};
use crate::error::Result;
use nalgebra::DMatrix;

/// Remove proteins without a single observed value.
///
/// The mean of an empty row is undefined, so such rows cannot be imputed;
/// they are dropped before normalization and their identities returned.
pub fn drop_unobserved_rows(frame: &mut IntensityFrame) -> Vec<String> {
    let mut dropped = Vec::new();
    let mut protein_ids = Vec::with_capacity(frame.n_proteins());
    let mut values = Vec::with_capacity(frame.n_proteins());

    for (id, row) in frame.protein_ids.drain(..).zip(frame.values.drain(..)) {
        if row.iter().all(Option::is_none) {
            dropped.push(id);
        } else {
            protein_ids.push(id);
            values.push(row);
        }
    }

    frame.protein_ids = protein_ids;
    frame.values = values;
    dropped
}

/// Replace each missing value with the mean of the observed values in its row.
///
/// Imputation borrows information across samples of one protein, never
/// across proteins. Every row must have at least one observed value (see
/// [`drop_unobserved_rows`]).
///
/// # Returns
/// The clean matrix and the number of imputed entries.
pub fn impute_row_mean(frame: IntensityFrame) -> Result<(CleanMatrix, usize)> {
    let n_proteins = frame.n_proteins();
    let n_samples = frame.n_samples();
    let mut data = DMatrix::zeros(n_proteins, n_samples);
    let mut n_imputed = 0;

    for (i, row) in frame.values.iter().enumerate() {
        let observed: Vec<f64> = row.iter().flatten().copied().collect();
        let fill = if observed.is_empty() {
            f64::NAN
        } else {
            observed.iter().sum::<f64>() / observed.len() as f64
        };
        for (j, cell) in row.iter().enumerate() {
            data[(i, j)] = match cell {
                Some(v) => *v,
                None => {
                    n_imputed += 1;
                    fill
                }
            };
        }
    }

    // Non-finite fills are rejected here, naming the offending protein.
    let matrix = CleanMatrix::new(data, frame.protein_ids, frame.sample_ids)?;
    Ok((matrix, n_imputed))
}
