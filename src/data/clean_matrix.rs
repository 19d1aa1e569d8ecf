//! Clean intensity matrix: the contract between preprocessing and testing.

use crate::error::{DaaError, Result};
use nalgebra::DMatrix;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Log2-scale, normalized, fully imputed intensities.
///
/// Rows are unique protein identities, columns are sample identifiers.
/// Every value is finite; the constructor refuses anything else.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanMatrix {
    /// Dense matrix (proteins × samples).
    data: DMatrix<f64>,
    /// Protein identities (row keys).
    protein_ids: Vec<String>,
    /// Sample identifiers (column keys).
    sample_ids: Vec<String>,
}

impl CleanMatrix {
    /// Create a clean matrix, validating shape, identity uniqueness and finiteness.
    pub fn new(data: DMatrix<f64>, protein_ids: Vec<String>, sample_ids: Vec<String>) -> Result<Self> {
        let (nrows, ncols) = data.shape();
        if nrows != protein_ids.len() {
            return Err(DaaError::DimensionMismatch {
                expected: nrows,
                actual: protein_ids.len(),
            });
        }
        if ncols != sample_ids.len() {
            return Err(DaaError::DimensionMismatch {
                expected: ncols,
                actual: sample_ids.len(),
            });
        }

        let mut seen = HashSet::with_capacity(nrows);
        for id in &protein_ids {
            if !seen.insert(id.as_str()) {
                return Err(DaaError::DuplicateProtein(id.clone()));
            }
        }

        if let Some(idx) = data.iter().position(|v| !v.is_finite()) {
            // column-major storage
            let (row, col) = (idx % nrows, idx / nrows);
            return Err(DaaError::Numerical(format!(
                "Non-finite value for protein '{}' in sample '{}'",
                protein_ids[row], sample_ids[col]
            )));
        }

        Ok(Self {
            data,
            protein_ids,
            sample_ids,
        })
    }

    /// Build from row vectors (one per protein, aligned with `sample_ids`).
    pub fn from_rows(
        rows: &[Vec<f64>],
        protein_ids: Vec<String>,
        sample_ids: Vec<String>,
    ) -> Result<Self> {
        let ncols = sample_ids.len();
        if let Some(bad) = rows.iter().find(|r| r.len() != ncols) {
            return Err(DaaError::DimensionMismatch {
                expected: ncols,
                actual: bad.len(),
            });
        }
        let data = DMatrix::from_fn(rows.len(), ncols, |i, j| rows[i][j]);
        Self::new(data, protein_ids, sample_ids)
    }

    /// Value at (protein row, sample column).
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[(row, col)]
    }

    /// Value for a protein in a sample, by identifiers.
    pub fn value(&self, protein_id: &str, sample_id: &str) -> Option<f64> {
        let row = self.protein_index(protein_id)?;
        let col = self.sample_index(sample_id)?;
        Some(self.get(row, col))
    }

    /// Number of proteins (rows).
    #[inline]
    pub fn n_proteins(&self) -> usize {
        self.data.nrows()
    }

    /// Number of samples (columns).
    #[inline]
    pub fn n_samples(&self) -> usize {
        self.data.ncols()
    }

    /// Check if the matrix has no proteins.
    pub fn is_empty(&self) -> bool {
        self.protein_ids.is_empty()
    }

    /// Protein identities.
    #[inline]
    pub fn protein_ids(&self) -> &[String] {
        &self.protein_ids
    }

    /// Sample identifiers.
    #[inline]
    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    /// Row index of a protein.
    pub fn protein_index(&self, protein_id: &str) -> Option<usize> {
        self.protein_ids.iter().position(|p| p == protein_id)
    }

    /// Column index of a sample.
    pub fn sample_index(&self, sample_id: &str) -> Option<usize> {
        self.sample_ids.iter().position(|s| s == sample_id)
    }

    /// A protein's values across all samples.
    pub fn row(&self, row: usize) -> Vec<f64> {
        self.data.row(row).iter().copied().collect()
    }

    /// Reference to the underlying matrix.
    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.data
    }

    /// Write the matrix as TSV (`protein_id` then one column per sample).
    pub fn to_tsv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        write!(writer, "protein_id")?;
        for sample_id in &self.sample_ids {
            write!(writer, "\t{}", sample_id)?;
        }
        writeln!(writer)?;

        for (row, protein_id) in self.protein_ids.iter().enumerate() {
            write!(writer, "{}", protein_id)?;
            for col in 0..self.n_samples() {
                write!(writer, "\t{:.6}", self.get(row, col))?;
            }
            writeln!(writer)?;
        }

        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::NamedTempFile;

    fn ids(prefix: &str, n: usize) -> Vec<String> {
        (0..n).map(|i| format!("{}{}", prefix, i)).collect()
    }

    fn create_test_matrix() -> CleanMatrix {
        let rows = vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]];
        CleanMatrix::from_rows(&rows, ids("P", 2), ids("S", 3)).unwrap()
    }

    #[test]
    fn test_dimensions() {
        let mat = create_test_matrix();
        assert_eq!(mat.n_proteins(), 2);
        assert_eq!(mat.n_samples(), 3);
        assert_eq!(mat.get(1, 2), 6.0);
        assert_eq!(mat.value("P0", "S1"), Some(2.0));
        assert_eq!(mat.value("P9", "S1"), None);
        assert_eq!(mat.row(1), vec![4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_duplicate_identity_rejected() {
        let rows = vec![vec![1.0], vec![2.0]];
        let err = CleanMatrix::from_rows(&rows, vec!["A".into(), "A".into()], ids("S", 1))
            .unwrap_err();
        assert!(matches!(err, DaaError::DuplicateProtein(id) if id == "A"));
    }

    #[test]
    fn test_non_finite_rejected() {
        let rows = vec![vec![1.0, 2.0], vec![f64::NAN, 3.0]];
        let err = CleanMatrix::from_rows(&rows, ids("P", 2), ids("S", 2)).unwrap_err();
        match err {
            DaaError::Numerical(msg) => {
                assert!(msg.contains("P1"));
                assert!(msg.contains("S0"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let rows = vec![vec![1.0, 2.0], vec![3.0]];
        assert!(CleanMatrix::from_rows(&rows, ids("P", 2), ids("S", 2)).is_err());
    }

    #[test]
    fn test_to_tsv() {
        let mat = create_test_matrix();
        let file = NamedTempFile::new().unwrap();
        mat.to_tsv(file.path()).unwrap();

        let mut contents = String::new();
        File::open(file.path())
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "protein_id\tS0\tS1\tS2");
        assert_eq!(lines[1], "P0\t1.000000\t2.000000\t3.000000");
        assert_eq!(lines.len(), 3);
    }
}
