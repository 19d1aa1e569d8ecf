//! Zero handling and log transformation.

pub mod log2;

pub use log2::{log2_transform, Log2Stats};
