//! Proteomics Differential Abundance Library
//!
//! This library turns label-free protein intensity tables (MaxQuant style)
//! into a clean log2 matrix and compares two sample groups per protein.
//!
//! # Overview
//!
//! The library is organized into composable modules:
//!
//! - **data**: Core data structures (RawIntensityTable, SampleMetadata, CleanMatrix, ResultsTable)
//! - **profile**: Missingness profiling and PCA of samples
//! - **filter**: Annotation filtering, column projection, identity cleanup
//! - **zero**: Zeros to missing and log2 transform
//! - **normalize**: Median normalization
//! - **impute**: Row-mean imputation
//! - **test**: Welch's t-test
//! - **correct**: Multiple testing correction (Benjamini-Hochberg)
//! - **pipeline**: Preprocessing engine, differential engine and the analysis runner
//!
//! # Example
//!
//! ```no_run
//! use proteo_daa::prelude::*;
//!
//! let layout = TableLayout::default();
//! let raw = RawIntensityTable::from_tsv("proteinGroups.txt", &layout).unwrap();
//! let metadata = SampleMetadata::from_path("samples.tsv").unwrap();
//!
//! let output = Pipeline::new()
//!     .layout(layout)
//!     .compare("control", "treatment")
//!     .run(&raw, &metadata)
//!     .unwrap();
//!
//! output.results.to_tsv("results.tsv").unwrap();
//! ```

pub mod correct;
pub mod data;
pub mod error;
pub mod filter;
pub mod impute;
pub mod normalize;
pub mod pipeline;
pub mod profile;
pub mod progress;
pub mod test;
pub mod zero;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::correct::{correct_bh, correct_bh_welch, create_results, BhCorrected};
    pub use crate::data::{
        CleanMatrix, GroupAssignment, IntensityFrame, ProteinResult, RawIntensityTable,
        RawProteinRow, Regulation, ResultSummary, ResultsTable, SampleMetadata, TableLayout,
    };
    pub use crate::error::{DaaError, Result};
    pub use crate::filter::{
        clean_identities, filter_annotations, project_columns, resolve_columns,
        AnnotationFilterResult, IdentityCleanup,
    };
    pub use crate::impute::{drop_unobserved_rows, impute_row_mean};
    pub use crate::normalize::{normalize_median, MedianNormalization};
    pub use crate::pipeline::{
        clean, clean_with, test_differential, test_differential_with, AnalysisConfig,
        AnalysisOutput, CleanOutput, CleanReport, Pipeline, PreprocessConfig, TestConfig,
    };
    pub use crate::profile::{pca, profile_missingness, MissingnessProfile, PcaResult};
    pub use crate::progress::{LogProgress, ProgressSink, Recorder, Silent, Stage};
    pub use crate::test::{test_welch, welch_t_test, WelchOutcome, WelchResult};
    pub use crate::zero::{log2_transform, Log2Stats};
}
