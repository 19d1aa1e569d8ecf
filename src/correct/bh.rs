//! Benjamini-Hochberg style false discovery rate correction.
//!
//! This is the per-rank form: q(i) = min(p(i) * m / i, 1) over the rows
//! ranked by ascending p-value. There is no cumulative-minimum pass from
//! the largest rank downward, so q-values are not forced to be monotone in p.

use crate::data::{ProteinResult, ResultsTable};
use crate::test::WelchResult;
use serde::{Deserialize, Serialize};

/// Result of BH correction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BhCorrected {
    /// Feature IDs in original order.
    pub feature_ids: Vec<String>,
    /// Original p-values.
    pub p_values: Vec<f64>,
    /// Adjusted p-values (q-values); NaN where the p-value is NaN.
    pub q_values: Vec<f64>,
    /// Number of defined p-values (m).
    pub n_tests: usize,
}

impl BhCorrected {
    /// Get q-value for a specific feature.
    pub fn get_qvalue(&self, feature_id: &str) -> Option<f64> {
        let idx = self.feature_ids.iter().position(|f| f == feature_id)?;
        self.q_values.get(idx).copied()
    }

    /// Count significant results at a threshold.
    pub fn n_significant(&self, alpha: f64) -> usize {
        self.q_values.iter().filter(|&&q| q < alpha).count()
    }
}

/// Apply the per-rank Benjamini-Hochberg adjustment.
///
/// NaN p-values are left out of the ranking and of `m`; their q-value is
/// NaN. Ties are ranked in input order. Output keeps input order.
///
/// # Arguments
/// * `p_values` - Raw p-values
/// * `feature_ids` - Feature identifiers (same order as p_values)
pub fn correct_bh(p_values: &[f64], feature_ids: &[String]) -> BhCorrected {
    let mut ranked: Vec<usize> = (0..p_values.len())
        .filter(|&i| !p_values[i].is_nan())
        .collect();
    // stable: equal p-values keep input order
    ranked.sort_by(|&a, &b| p_values[a].total_cmp(&p_values[b]));

    let m = ranked.len();
    let m_f64 = m as f64;

    let mut q_values = vec![f64::NAN; p_values.len()];
    for (i, &orig_idx) in ranked.iter().enumerate() {
        let rank = (i + 1) as f64;
        q_values[orig_idx] = (p_values[orig_idx] * m_f64 / rank).min(1.0);
    }

    BhCorrected {
        feature_ids: feature_ids.to_vec(),
        p_values: p_values.to_vec(),
        q_values,
        n_tests: m,
    }
}

/// Apply BH correction to Welch test results.
pub fn correct_bh_welch(welch: &WelchResult) -> BhCorrected {
    correct_bh(&welch.p_values(), &welch.protein_ids)
}

/// Combine Welch outcomes and q-values into a results table.
pub fn create_results(welch: &WelchResult, bh: &BhCorrected) -> ResultsTable {
    let results: Vec<ProteinResult> = welch
        .protein_ids
        .iter()
        .zip(&welch.outcomes)
        .enumerate()
        .map(|(i, (id, o))| ProteinResult {
            protein_id: id.clone(),
            log2_fold_change: o.mean_difference,
            statistic: o.statistic,
            df: o.df,
            p_value: o.p_value,
            adj_p_value: bh.q_values.get(i).copied().unwrap_or(f64::NAN),
        })
        .collect();

    ResultsTable::new(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ids(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("feat_{}", i)).collect()
    }

    #[test]
    fn test_bh_basic() {
        let p_values = vec![0.01, 0.04, 0.03, 0.005];
        let corrected = correct_bh(&p_values, &ids(4));

        assert_eq!(corrected.n_tests, 4);
        assert_eq!(corrected.p_values, p_values);
        assert_eq!(corrected.feature_ids, ids(4));
    }

    #[test]
    fn test_bh_known_values() {
        // Ranks: 0.005 -> 1, 0.01 -> 2, 0.03 -> 3, 0.04 -> 4
        let p_values = vec![0.04, 0.01, 0.03, 0.005];
        let corrected = correct_bh(&p_values, &ids(4));

        assert_relative_eq!(corrected.q_values[3], 0.02, epsilon = 1e-12);
        assert_relative_eq!(corrected.q_values[1], 0.02, epsilon = 1e-12);
        assert_relative_eq!(corrected.q_values[2], 0.04, epsilon = 1e-12);
        assert_relative_eq!(corrected.q_values[0], 0.04, epsilon = 1e-12);
    }

    #[test]
    fn test_bh_not_monotone() {
        // Rank 1: 0.02 * 3 / 1 = 0.06; rank 2: 0.025 * 3 / 2 = 0.0375;
        // rank 3: 0.03 * 3 / 3 = 0.03. A running minimum would give 0.03 everywhere.
        let p_values = vec![0.02, 0.025, 0.03];
        let corrected = correct_bh(&p_values, &ids(3));

        assert_relative_eq!(corrected.q_values[0], 0.06, epsilon = 1e-12);
        assert_relative_eq!(corrected.q_values[1], 0.0375, epsilon = 1e-12);
        assert_relative_eq!(corrected.q_values[2], 0.03, epsilon = 1e-12);
        assert!(corrected.q_values[0] > corrected.q_values[2]);
    }

    #[test]
    fn test_bh_capped() {
        let p_values = vec![0.5, 0.6, 0.7, 0.8, 0.9];
        let corrected = correct_bh(&p_values, &ids(5));

        // 0.5 * 5 / 1 = 2.5 -> capped
        assert_eq!(corrected.q_values[0], 1.0);
        for (q, p) in corrected.q_values.iter().zip(&p_values) {
            assert!(*q <= 1.0);
            assert!(*q >= *p);
        }
    }

    #[test]
    fn test_bh_nan_excluded() {
        let p_values = vec![0.01, f64::NAN, 0.04];
        let corrected = correct_bh(&p_values, &ids(3));

        assert_eq!(corrected.n_tests, 2);
        assert!(corrected.q_values[1].is_nan());
        // m = 2: 0.01 * 2 / 1, 0.04 * 2 / 2
        assert_relative_eq!(corrected.q_values[0], 0.02, epsilon = 1e-12);
        assert_relative_eq!(corrected.q_values[2], 0.04, epsilon = 1e-12);
    }

    #[test]
    fn test_bh_ties_ranked_in_input_order() {
        let p_values = vec![0.03, 0.01, 0.03];
        let corrected = correct_bh(&p_values, &ids(3));

        // 0.01 -> rank 1; first 0.03 -> rank 2; second 0.03 -> rank 3
        assert_relative_eq!(corrected.q_values[1], 0.03, epsilon = 1e-12);
        assert_relative_eq!(corrected.q_values[0], 0.045, epsilon = 1e-12);
        assert_relative_eq!(corrected.q_values[2], 0.03, epsilon = 1e-12);
    }

    #[test]
    fn test_bh_empty() {
        let corrected = correct_bh(&[], &[]);
        assert_eq!(corrected.n_tests, 0);
        assert!(corrected.q_values.is_empty());
    }

    #[test]
    fn test_bh_all_undefined() {
        let corrected = correct_bh(&[f64::NAN, f64::NAN], &ids(2));
        assert_eq!(corrected.n_tests, 0);
        assert!(corrected.q_values.iter().all(|q| q.is_nan()));
    }

    #[test]
    fn test_bh_single() {
        let corrected = correct_bh(&[0.05], &ids(1));
        assert_eq!(corrected.n_tests, 1);
        assert_relative_eq!(corrected.q_values[0], 0.05, epsilon = 1e-12);
        assert_eq!(corrected.get_qvalue("feat_0"), Some(0.05));
        assert_eq!(corrected.n_significant(0.1), 1);
    }
}
