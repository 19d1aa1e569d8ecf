//! Sample metadata: the sample to condition mapping.

use crate::error::{DaaError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct SampleRecord {
    sample: String,
    condition: String,
}

/// Mapping from sample identifier to condition label.
///
/// Samples keep the order in which they were added; that order is the
/// column order of every matrix derived from this metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SampleMetadata {
    sample_ids: Vec<String>,
    conditions: HashMap<String, String>,
}

impl SampleMetadata {
    /// Create empty metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build metadata from `(sample, condition)` pairs.
    pub fn from_pairs<I, S, C>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, C)>,
        S: Into<String>,
        C: Into<String>,
    {
        let mut meta = Self::new();
        for (sample, condition) in pairs {
            meta.insert(sample, condition)?;
        }
        Ok(meta)
    }

    /// Add a sample. Each sample may carry exactly one condition label.
    pub fn insert(&mut self, sample: impl Into<String>, condition: impl Into<String>) -> Result<()> {
        let sample = sample.into();
        if self.conditions.contains_key(&sample) {
            return Err(DaaError::SchemaMismatch(format!(
                "Sample '{}' listed more than once in metadata",
                sample
            )));
        }
        self.sample_ids.push(sample.clone());
        self.conditions.insert(sample, condition.into());
        Ok(())
    }

    /// Load metadata from a delimited file with `sample` and `condition` columns.
    ///
    /// `.tsv` and `.txt` files are read tab-separated, anything else as CSV.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let delimiter = match path.extension().and_then(|e| e.to_str()) {
            Some("tsv") | Some("txt") => b'\t',
            _ => b',',
        };
        let file = File::open(path)?;
        Self::from_reader(file, delimiter)
    }

    /// Parse metadata from a reader with the given delimiter.
    pub fn from_reader<R: Read>(reader: R, delimiter: u8) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut meta = Self::new();
        for record in rdr.deserialize() {
            let record: SampleRecord = record?;
            meta.insert(record.sample, record.condition)?;
        }

        if meta.is_empty() {
            return Err(DaaError::EmptyData("No samples in metadata".to_string()));
        }
        Ok(meta)
    }

    /// Sample IDs in order.
    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    /// Number of samples.
    pub fn n_samples(&self) -> usize {
        self.sample_ids.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.sample_ids.is_empty()
    }

    /// Condition label of a sample.
    pub fn condition(&self, sample_id: &str) -> Option<&str> {
        self.conditions.get(sample_id).map(String::as_str)
    }

    /// Check if a sample exists.
    pub fn has_sample(&self, sample_id: &str) -> bool {
        self.conditions.contains_key(sample_id)
    }

    /// Distinct condition labels in first-seen order.
    pub fn conditions(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for sid in &self.sample_ids {
            let c = self.conditions[sid].as_str();
            if !seen.contains(&c) {
                seen.push(c);
            }
        }
        seen
    }

    /// Samples carrying a condition label, in metadata order.
    pub fn samples_in(&self, condition: &str) -> Vec<String> {
        self.sample_ids
            .iter()
            .filter(|sid| self.conditions[*sid] == condition)
            .cloned()
            .collect()
    }
}
