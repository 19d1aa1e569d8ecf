//! Multiple testing correction.

pub mod bh;

pub use bh::{correct_bh, correct_bh_welch, create_results, BhCorrected};
