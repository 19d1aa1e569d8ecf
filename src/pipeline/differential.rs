//! Differential testing engine: clean matrix to results table.

use crate::correct::{correct_bh_welch, create_results};
use crate::data::{CleanMatrix, GroupAssignment, ResultsTable};
use crate::error::Result;
use crate::progress::{ProgressSink, Silent, Stage};
use crate::test::test_welch;
use serde::{Deserialize, Serialize};

/// Testing options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestConfig {
    /// Run the per-protein tests on the rayon thread pool.
    pub parallel: bool,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self { parallel: true }
    }
}

/// Compare treatment against control for every protein with default options.
///
/// # Errors
/// `SchemaMismatch` if a group member is not a column of the matrix.
pub fn test_differential(matrix: &CleanMatrix, groups: &GroupAssignment) -> Result<ResultsTable> {
    test_differential_with(matrix, groups, &TestConfig::default(), &Silent)
}

/// Compare treatment against control for every protein.
///
/// Each row gets log2 fold change (mean treatment - mean control), a Welch
/// t-test p-value and a per-rank BH adjusted p-value. Rows whose test is
/// undefined stay in the table with NaN p-values. The table follows the
/// matrix row order.
pub fn test_differential_with(
    matrix: &CleanMatrix,
    groups: &GroupAssignment,
    config: &TestConfig,
    progress: &dyn ProgressSink,
) -> Result<ResultsTable> {
    let welch = test_welch(matrix, groups, config.parallel)?;
    let n_undefined = welch.n_undefined();
    if n_undefined > 0 {
        log::debug!("{} protein(s) with undefined test statistic", n_undefined);
    }
    progress.stage_done(
        Stage::WelchTest,
        &format!(
            "{} proteins tested, {} undefined",
            welch.outcomes.len(),
            n_undefined
        ),
    );

    let bh = correct_bh_welch(&welch);
    progress.stage_done(
        Stage::CorrectBh,
        &format!("{} p-values adjusted, {} with q < 0.05", bh.n_tests, bh.n_significant(0.05)),
    );

    Ok(create_results(&welch, &bh))
}
