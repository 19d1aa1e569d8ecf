//! Missing value imputation.

pub mod row_mean;

pub use row_mean::{drop_unobserved_rows, impute_row_mean};
