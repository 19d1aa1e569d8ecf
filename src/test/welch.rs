//! Welch's unequal-variance two-sample t-test.

use crate::data::{CleanMatrix, GroupAssignment};
use crate::error::{DaaError, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Welch test outcome for one pair of samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WelchOutcome {
    /// Mean(treatment) - mean(control).
    pub mean_difference: f64,
    /// t statistic; infinite when both groups are constant but differ.
    pub statistic: f64,
    /// Welch-Satterthwaite degrees of freedom.
    pub df: f64,
    /// Two-sided p-value; NaN when the test is undefined.
    pub p_value: f64,
}

impl WelchOutcome {
    fn undefined(mean_difference: f64) -> Self {
        Self {
            mean_difference,
            statistic: f64::NAN,
            df: f64::NAN,
            p_value: f64::NAN,
        }
    }

    /// Whether a p-value was produced.
    pub fn is_defined(&self) -> bool {
        !self.p_value.is_nan()
    }
}

/// Per-protein Welch results in clean matrix row order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelchResult {
    /// Protein identities.
    pub protein_ids: Vec<String>,
    /// Outcomes aligned with `protein_ids`.
    pub outcomes: Vec<WelchOutcome>,
}

impl WelchResult {
    /// Raw p-values in row order.
    pub fn p_values(&self) -> Vec<f64> {
        self.outcomes.iter().map(|o| o.p_value).collect()
    }

    /// Number of rows whose test is undefined.
    pub fn n_undefined(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_defined()).count()
    }
}

/// Whether every value equals the first one.
fn is_constant(values: &[f64]) -> bool {
    values.iter().all(|v| *v == values[0])
}

/// Mean and sample variance (n - 1 denominator).
///
/// A constant slice returns its value and exactly zero variance; summing
/// and dividing would otherwise leave rounding residue in both.
fn mean_var(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    if values.len() > 1 && is_constant(values) {
        return (values[0], 0.0);
    }
    let mean = values.iter().sum::<f64>() / n;
    let var = if values.len() > 1 {
        values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0)
    } else {
        f64::NAN
    };
    (mean, var)
}

/// Welch's t-test of `treatment` against `control`.
///
/// t = (mean_t - mean_c) / sqrt(var_t/n_t + var_c/n_c), with
/// df = (var_t/n_t + var_c/n_c)^2 / ((var_t/n_t)^2/(n_t-1) + (var_c/n_c)^2/(n_c-1)).
///
/// Degenerate inputs:
/// - a group with fewer than two values: undefined (no sample variance);
/// - both groups constant with equal means: undefined (0/0);
/// - both groups constant with different means: t is infinite and p = 0.
pub fn welch_t_test(treatment: &[f64], control: &[f64]) -> WelchOutcome {
    if treatment.is_empty() || control.is_empty() {
        return WelchOutcome::undefined(f64::NAN);
    }

    let (mean_t, var_t) = mean_var(treatment);
    let (mean_c, var_c) = mean_var(control);
    let diff = mean_t - mean_c;

    if var_t.is_nan() || var_c.is_nan() {
        return WelchOutcome::undefined(diff);
    }

    let se_t = var_t / treatment.len() as f64;
    let se_c = var_c / control.len() as f64;
    let se2 = se_t + se_c;

    // Exactly zero only when both groups are constant (see `mean_var`).
    if se2 == 0.0 {
        if diff == 0.0 {
            return WelchOutcome::undefined(diff);
        }
        return WelchOutcome {
            mean_difference: diff,
            statistic: diff.signum() * f64::INFINITY,
            df: f64::NAN,
            p_value: 0.0,
        };
    }

    let statistic = diff / se2.sqrt();
    let df = se2.powi(2)
        / (se_t.powi(2) / (treatment.len() as f64 - 1.0)
            + se_c.powi(2) / (control.len() as f64 - 1.0));

    let p_value = match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => (2.0 * dist.sf(statistic.abs())).min(1.0),
        Err(_) => f64::NAN,
    };

    WelchOutcome {
        mean_difference: diff,
        statistic,
        df,
        p_value,
    }
}

/// Run the Welch test independently for every protein.
///
/// Results are collected by row index, so the parallel path returns exactly
/// what the sequential path would.
///
/// # Errors
/// `SchemaMismatch` if a group member is not a column of the matrix.
pub fn test_welch(
    matrix: &CleanMatrix,
    groups: &GroupAssignment,
    parallel: bool,
) -> Result<WelchResult> {
    let control_cols = column_indices(matrix, groups.control())?;
    let treatment_cols = column_indices(matrix, groups.treatment())?;

    let test_row = |row: usize| {
        let t: Vec<f64> = treatment_cols.iter().map(|&c| matrix.get(row, c)).collect();
        let c: Vec<f64> = control_cols.iter().map(|&c| matrix.get(row, c)).collect();
        welch_t_test(&t, &c)
    };

    let outcomes: Vec<WelchOutcome> = if parallel {
        (0..matrix.n_proteins()).into_par_iter().map(test_row).collect()
    } else {
        (0..matrix.n_proteins()).map(test_row).collect()
    };

    Ok(WelchResult {
        protein_ids: matrix.protein_ids().to_vec(),
        outcomes,
    })
}

fn column_indices(matrix: &CleanMatrix, samples: &[String]) -> Result<Vec<usize>> {
    samples
        .iter()
        .map(|s| {
            matrix.sample_index(s).ok_or_else(|| {
                DaaError::SchemaMismatch(format!("Sample '{}' is not a column of the clean matrix", s))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_known_values() {
        // Welch's t for [19.8, 20.4, 19.6, 17.8, 18.5] vs [28.2, 26.6, 20.1, 23.3, 25.2]
        let a = [19.8, 20.4, 19.6, 17.8, 18.5];
        let b = [28.2, 26.6, 20.1, 23.3, 25.2];
        let out = welch_t_test(&a, &b);

        // mean_a = 19.22, var_a = 1.102; mean_b = 24.68, var_b = 9.807
        assert_relative_eq!(out.mean_difference, -5.46, epsilon = 1e-10);
        let se = (1.102_f64 / 5.0 + 9.807 / 5.0).sqrt();
        assert_relative_eq!(out.statistic, -5.46 / se, epsilon = 1e-6);
        let df = (1.102_f64 / 5.0 + 9.807 / 5.0).powi(2)
            / ((1.102_f64 / 5.0).powi(2) / 4.0 + (9.807_f64 / 5.0).powi(2) / 4.0);
        assert_relative_eq!(out.df, df, epsilon = 1e-6);
        assert_relative_eq!(out.p_value, 0.014634, epsilon = 1e-4);
    }

    #[test]
    fn test_symmetric() {
        let a = [1.0, 2.0, 3.0];
        let b = [2.0, 4.0, 7.0, 9.0];
        let ab = welch_t_test(&a, &b);
        let ba = welch_t_test(&b, &a);
        assert_relative_eq!(ab.statistic, -ba.statistic, epsilon = 1e-12);
        assert_relative_eq!(ab.p_value, ba.p_value, epsilon = 1e-12);
    }

    #[test]
    fn test_identical_groups_p_one() {
        let out = welch_t_test(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]);
        assert_relative_eq!(out.statistic, 0.0);
        assert_relative_eq!(out.p_value, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_variance_equal_means_undefined() {
        let out = welch_t_test(&[5.0, 5.0], &[5.0, 5.0]);
        assert!(!out.is_defined());
        assert!(out.statistic.is_nan());
        assert_eq!(out.mean_difference, 0.0);
    }

    #[test]
    fn test_zero_variance_different_means() {
        let out = welch_t_test(&[6.0, 6.0], &[5.0, 5.0]);
        assert!(out.is_defined());
        assert_eq!(out.p_value, 0.0);
        assert_eq!(out.statistic, f64::INFINITY);
    }

    #[test]
    fn test_constant_groups_with_inexact_mean_undefined() {
        // Six copies of this value do not sum and divide back to it exactly.
        let x = 540301.3849002429_f64.log2();
        let out = welch_t_test(&[x; 6], &[x; 6]);
        assert!(!out.is_defined());
        assert_eq!(out.mean_difference, 0.0);

        for n in 3..=8 {
            for k in 0..50 {
                let v = 15.0 + k as f64 * 0.137 + 1.0 / 3.0;
                let values = vec![v; n];
                assert!(!welch_t_test(&values, &values).is_defined());
            }
        }
    }

    #[test]
    fn test_constant_groups_with_inexact_mean_differ() {
        let x = 540301.3849002429_f64.log2();
        let out = welch_t_test(&[x + 1.0; 5], &[x; 3]);
        assert_eq!(out.p_value, 0.0);
        assert_eq!(out.statistic, f64::INFINITY);
    }

    #[test]
    fn test_single_observation_undefined() {
        let out = welch_t_test(&[1.0], &[2.0, 3.0]);
        assert!(!out.is_defined());
        assert_relative_eq!(out.mean_difference, -1.5);
    }

    #[test]
    fn test_p_value_shrinks_with_effect() {
        let control = [10.0, 10.5, 9.5, 10.2];
        let small = welch_t_test(&[10.5, 11.0, 10.0, 10.7], &control);
        let large = welch_t_test(&[14.0, 14.5, 13.5, 14.2], &control);
        assert!(large.p_value < small.p_value);
    }
}
