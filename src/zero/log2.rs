//! Zero-as-missing handling and log2 transformation.

use crate::data::IntensityFrame;
use serde::{Deserialize, Serialize};

/// Counts gathered while transforming.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Log2Stats {
    /// Exact zeros converted to missing.
    pub n_zero: usize,
    /// Missing entries after the transform (including converted zeros).
    pub n_missing: usize,
    /// Values transformed.
    pub n_transformed: usize,
}

/// Treat stored zeros as "not detected" and log2-transform the rest.
///
/// A zero intensity is indistinguishable from an absent one afterwards.
/// Missing values stay missing.
pub fn log2_transform(frame: &mut IntensityFrame) -> Log2Stats {
    let mut stats = Log2Stats::default();

    for row in frame.values.iter_mut() {
        for cell in row.iter_mut() {
            *cell = match *cell {
                Some(v) if v == 0.0 => {
                    stats.n_zero += 1;
                    None
                }
                Some(v) => {
                    stats.n_transformed += 1;
                    Some(v.log2())
                }
                None => None,
            };
            if cell.is_none() {
                stats.n_missing += 1;
            }
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_zero_becomes_missing() {
        let mut frame = IntensityFrame {
            protein_ids: vec!["A".into(), "B".into()],
            sample_ids: vec!["S1".into(), "S2".into(), "S3".into()],
            values: vec![
                vec![Some(8.0), Some(0.0), None],
                vec![Some(1.0), Some(1024.0), Some(3.0)],
            ],
        };

        let stats = log2_transform(&mut frame);

        assert_eq!(frame.values[0][1], None);
        assert_eq!(frame.values[0][2], None);
        assert_relative_eq!(frame.values[0][0].unwrap(), 3.0);
        assert_relative_eq!(frame.values[1][0].unwrap(), 0.0);
        assert_relative_eq!(frame.values[1][1].unwrap(), 10.0);
        assert_relative_eq!(frame.values[1][2].unwrap(), 3.0_f64.log2());
        assert_eq!(stats.n_zero, 1);
        assert_eq!(stats.n_missing, 2);
        assert_eq!(stats.n_transformed, 4);
    }
}
