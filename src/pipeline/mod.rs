//! Pipeline composition: preprocessing engine, testing engine and runner.

mod clean;
mod differential;
mod runner;

pub use clean::{clean, clean_with, CleanOutput, CleanReport, PreprocessConfig};
pub use differential::{test_differential, test_differential_with, TestConfig};
pub use runner::{AnalysisConfig, AnalysisOutput, Pipeline};
