//! Preprocessing engine: raw intensity table to clean matrix.

use crate::data::{CleanMatrix, RawIntensityTable, SampleMetadata};
use crate::error::Result;
use crate::filter::{
    clean_identities, filter_annotations, project_columns, resolve_columns, IdentityCleanup,
};
use crate::impute::{drop_unobserved_rows, impute_row_mean};
use crate::normalize::{normalize_median, MedianNormalization};
use crate::progress::{ProgressSink, Silent, Stage};
use crate::zero::{log2_transform, Log2Stats};
use serde::{Deserialize, Serialize};

/// Preprocessing options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Ignore intensity columns that have no metadata entry instead of failing.
    pub allow_unmapped_samples: bool,
}

/// What preprocessing removed and computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanReport {
    /// Rows in the raw table.
    pub n_input_rows: usize,
    /// Rows flagged as reverse hits.
    pub n_reverse: usize,
    /// Rows flagged as contaminants.
    pub n_contaminant: usize,
    /// Rows removed by annotation filtering.
    pub n_flagged_removed: usize,
    /// Intensity columns ignored for lack of metadata.
    pub ignored_samples: Vec<String>,
    /// Identity cleanup statistics.
    pub identities: IdentityCleanup,
    /// Zero and missing counts after log2.
    pub log2: Log2Stats,
    /// Proteins with no observed value, dropped before normalization.
    pub dropped_all_missing: Vec<String>,
    /// Median normalization shifts.
    pub normalization: MedianNormalization,
    /// Entries filled by row-mean imputation.
    pub n_imputed: usize,
    /// Proteins in the clean matrix.
    pub n_output_proteins: usize,
}

impl std::fmt::Display for CleanReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Preprocessing Report")?;
        writeln!(f, "  Input rows:            {}", self.n_input_rows)?;
        writeln!(f, "  Reverse hits:          {}", self.n_reverse)?;
        writeln!(f, "  Contaminants:          {}", self.n_contaminant)?;
        writeln!(f, "  Flagged rows removed:  {}", self.n_flagged_removed)?;
        writeln!(f, "  Missing identity:      {}", self.identities.n_missing_identity)?;
        writeln!(f, "  Duplicates dropped:    {}", self.identities.n_duplicates_dropped)?;
        writeln!(f, "  Zeros as missing:      {}", self.log2.n_zero)?;
        writeln!(f, "  All-missing dropped:   {}", self.dropped_all_missing.len())?;
        if let Some(g) = self.normalization.grand_median {
            writeln!(f, "  Grand median (log2):   {:.4}", g)?;
        }
        writeln!(f, "  Values imputed:        {}", self.n_imputed)?;
        writeln!(f, "  Output proteins:       {}", self.n_output_proteins)?;
        Ok(())
    }
}

/// Clean matrix together with its preprocessing report.
#[derive(Debug, Clone)]
pub struct CleanOutput {
    pub matrix: CleanMatrix,
    pub report: CleanReport,
}

/// Turn a raw intensity table into a clean matrix with default options.
///
/// # Errors
/// * `MissingIdentityColumn` if the table has no protein identity field.
/// * `SchemaMismatch` if metadata and intensity columns disagree.
pub fn clean(raw: &RawIntensityTable, metadata: &SampleMetadata) -> Result<CleanMatrix> {
    clean_with(raw, metadata, &PreprocessConfig::default(), &Silent).map(|out| out.matrix)
}

/// Turn a raw intensity table into a clean matrix.
///
/// Steps, in order:
/// 1. drop reverse hits and contaminants
/// 2. project onto identity + metadata samples (metadata order)
/// 3. drop rows without identity, keep the first row per identity
/// 4. zeros to missing, log2
/// 5. drop proteins with no observed value
/// 6. median normalization
/// 7. row-mean imputation
///
/// Schema checks run before any row is processed.
pub fn clean_with(
    raw: &RawIntensityTable,
    metadata: &SampleMetadata,
    config: &PreprocessConfig,
    progress: &dyn ProgressSink,
) -> Result<CleanOutput> {
    let selection = resolve_columns(raw, metadata, config.allow_unmapped_samples)?;

    let annotations = filter_annotations(raw);
    progress.stage_done(
        Stage::FilterAnnotations,
        &format!(
            "removed {} of {} rows ({} reverse, {} contaminant)",
            annotations.n_removed,
            raw.n_rows(),
            annotations.n_reverse,
            annotations.n_contaminant
        ),
    );

    let projected = project_columns(raw, &selection, &annotations.kept);
    progress.stage_done(
        Stage::ProjectColumns,
        &format!("{} samples selected", selection.sample_ids.len()),
    );

    let (mut frame, identities) = clean_identities(projected);
    progress.stage_done(
        Stage::CleanIdentities,
        &format!(
            "{} proteins ({} without identity, {} duplicates dropped)",
            frame.n_proteins(),
            identities.n_missing_identity,
            identities.n_duplicates_dropped
        ),
    );

    let log2 = log2_transform(&mut frame);
    progress.stage_done(
        Stage::Log2Transform,
        &format!("{} zeros treated as missing, {} missing", log2.n_zero, log2.n_missing),
    );

    let dropped_all_missing = drop_unobserved_rows(&mut frame);
    if !dropped_all_missing.is_empty() {
        log::warn!(
            "dropped {} protein(s) without any observed intensity",
            dropped_all_missing.len()
        );
    }

    let normalization = normalize_median(&mut frame);
    progress.stage_done(
        Stage::MedianNormalize,
        &match normalization.grand_median {
            Some(g) => format!("grand median {:.4}", g),
            None => "no observed values".to_string(),
        },
    );

    let (matrix, n_imputed) = impute_row_mean(frame)?;
    progress.stage_done(
        Stage::Impute,
        &format!("{} values imputed", n_imputed),
    );

    log::debug!(
        "clean matrix: {} proteins x {} samples",
        matrix.n_proteins(),
        matrix.n_samples()
    );

    let report = CleanReport {
        n_input_rows: raw.n_rows(),
        n_reverse: annotations.n_reverse,
        n_contaminant: annotations.n_contaminant,
        n_flagged_removed: annotations.n_removed,
        ignored_samples: selection.ignored,
        identities,
        log2,
        dropped_all_missing,
        normalization,
        n_imputed,
        n_output_proteins: matrix.n_proteins(),
    };

    Ok(CleanOutput { matrix, report })
}
