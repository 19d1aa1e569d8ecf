//! Data profiling: missingness of raw tables and sample structure of clean matrices.

mod missingness;
mod pca;

pub use missingness::{profile_missingness, MissingnessProfile};
pub use pca::{pca, PcaResult};
