//! Statistical hypothesis testing for differential abundance.

pub mod welch;

pub use welch::{test_welch, welch_t_test, WelchOutcome, WelchResult};
