//! Normalization of log2 intensities.
//!
//! - **Median**: align per-sample medians to the median of sample medians

pub mod median;

pub use median::{median, normalize_median, MedianNormalization};
