//! Data structures for proteomics differential abundance analysis.

mod clean_matrix;
mod frame;
mod groups;
mod metadata;
mod raw_table;
mod result;

pub use clean_matrix::CleanMatrix;
pub use frame::IntensityFrame;
pub use groups::GroupAssignment;
pub use metadata::SampleMetadata;
pub use raw_table::{RawIntensityTable, RawProteinRow, TableLayout};
pub use result::{ProteinResult, Regulation, ResultSummary, ResultsTable};
