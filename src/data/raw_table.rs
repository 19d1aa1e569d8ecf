//! Raw protein intensity tables as exported by MaxQuant-style search engines.

use crate::error::{DaaError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Column naming of a wide protein intensity table.
///
/// Defaults match a MaxQuant `proteinGroups.txt` export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableLayout {
    /// Column holding the protein identity (row key).
    pub identity_column: String,
    /// Column flagging reverse (decoy) database hits.
    pub reverse_column: String,
    /// Column flagging potential contaminants.
    pub contaminant_column: String,
    /// Prefix of per-sample intensity columns (`<prefix><sample>`).
    pub intensity_prefix: String,
    /// Cell value marking a flagged row.
    pub flag_value: String,
}

impl Default for TableLayout {
    fn default() -> Self {
        Self {
            identity_column: "Gene names".to_string(),
            reverse_column: "Reverse".to_string(),
            contaminant_column: "Potential contaminant".to_string(),
            intensity_prefix: "Intensity ".to_string(),
            flag_value: "+".to_string(),
        }
    }
}

impl TableLayout {
    /// Sample identifier encoded by a header field, if it is an intensity column.
    pub fn sample_of<'a>(&self, header: &'a str) -> Option<&'a str> {
        header
            .strip_prefix(self.intensity_prefix.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// A single protein row of the raw table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawProteinRow {
    /// Protein identity; `None` when the identity cell is empty.
    pub identity: Option<String>,
    /// Row is a reverse database hit.
    pub reverse: bool,
    /// Row is a potential contaminant.
    pub contaminant: bool,
    /// Intensities aligned with the table's sample identifiers (`None` = absent).
    pub intensities: Vec<Option<f64>>,
}

impl RawProteinRow {
    /// Create an unflagged row.
    pub fn new(identity: Option<&str>, intensities: Vec<Option<f64>>) -> Self {
        Self {
            identity: identity.map(String::from),
            reverse: false,
            contaminant: false,
            intensities,
        }
    }

    /// Mark the row as a reverse hit.
    pub fn with_reverse(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }

    /// Mark the row as a potential contaminant.
    pub fn with_contaminant(mut self, contaminant: bool) -> Self {
        self.contaminant = contaminant;
        self
    }

    /// Whether either annotation flag is set.
    pub fn is_flagged(&self) -> bool {
        self.reverse || self.contaminant
    }
}

/// Wide intensity table: proteins × samples plus annotation flags.
///
/// Rows keep file order. Identities may repeat or be absent; cleanup of
/// those happens during preprocessing, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawIntensityTable {
    /// Name of the identity column, as configured by the layout.
    identity_column: String,
    /// Whether the source actually had the identity column.
    has_identity: bool,
    /// Sample identifiers that have an intensity column, in column order.
    sample_ids: Vec<String>,
    /// Protein rows in file order.
    rows: Vec<RawProteinRow>,
}

impl RawIntensityTable {
    /// Create a table with an identity column.
    pub fn new(sample_ids: Vec<String>, rows: Vec<RawProteinRow>) -> Result<Self> {
        Self::build(TableLayout::default().identity_column, true, sample_ids, rows)
    }

    /// Create a table whose source lacked the identity column.
    pub fn without_identity(sample_ids: Vec<String>, rows: Vec<RawProteinRow>) -> Result<Self> {
        Self::build(TableLayout::default().identity_column, false, sample_ids, rows)
    }

    fn build(
        identity_column: String,
        has_identity: bool,
        sample_ids: Vec<String>,
        rows: Vec<RawProteinRow>,
    ) -> Result<Self> {
        for (row_idx, row) in rows.iter().enumerate() {
            if row.intensities.len() != sample_ids.len() {
                return Err(DaaError::DimensionMismatch {
                    expected: sample_ids.len(),
                    actual: row.intensities.len(),
                });
            }
            for (col_idx, value) in row.intensities.iter().enumerate() {
                if let Some(v) = value {
                    if !v.is_finite() || *v < 0.0 {
                        return Err(DaaError::InvalidIntensity {
                            value: v.to_string(),
                            row: row_idx,
                            column: sample_ids[col_idx].clone(),
                        });
                    }
                }
            }
        }
        Ok(Self {
            identity_column,
            has_identity,
            sample_ids,
            rows,
        })
    }

    /// Load a tab-separated table using the given layout.
    pub fn from_tsv<P: AsRef<Path>>(path: P, layout: &TableLayout) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file, layout)
    }

    /// Parse a tab-separated table from any reader.
    ///
    /// Columns that are neither the identity, an annotation, nor an intensity
    /// column are ignored. Missing annotation columns mean no row is flagged.
    pub fn from_reader<R: Read>(reader: R, layout: &TableLayout) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .flexible(true)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let position = |name: &str| headers.iter().position(|h| h.trim() == name);

        let identity_idx = position(&layout.identity_column);
        let reverse_idx = position(&layout.reverse_column);
        let contaminant_idx = position(&layout.contaminant_column);

        let mut sample_ids = Vec::new();
        let mut sample_cols = Vec::new();
        for (idx, header) in headers.iter().enumerate() {
            if let Some(sample) = layout.sample_of(header) {
                if sample_ids.iter().any(|s| s == sample) {
                    return Err(DaaError::SchemaMismatch(format!(
                        "Intensity column for sample '{}' appears more than once",
                        sample
                    )));
                }
                sample_ids.push(sample.to_string());
                sample_cols.push(idx);
            }
        }

        if identity_idx.is_none() {
            log::warn!(
                "identity column '{}' not present in table header",
                layout.identity_column
            );
        }

        let mut rows = Vec::new();
        for (row_idx, record) in rdr.records().enumerate() {
            let record = record?;
            let field = |idx: Option<usize>| idx.and_then(|i| record.get(i)).map(str::trim);

            let identity = field(identity_idx)
                .filter(|s| !s.is_empty())
                .map(String::from);
            let reverse = field(reverse_idx) == Some(layout.flag_value.as_str());
            let contaminant = field(contaminant_idx) == Some(layout.flag_value.as_str());

            let mut intensities = Vec::with_capacity(sample_cols.len());
            for (&col, sample) in sample_cols.iter().zip(&sample_ids) {
                let raw = record.get(col).unwrap_or("").trim();
                intensities.push(parse_intensity(raw).ok_or_else(|| {
                    DaaError::InvalidIntensity {
                        value: raw.to_string(),
                        row: row_idx,
                        column: sample.clone(),
                    }
                })?);
            }

            rows.push(RawProteinRow {
                identity,
                reverse,
                contaminant,
                intensities,
            });
        }

        log::debug!(
            "loaded raw table: {} rows, {} sample columns",
            rows.len(),
            sample_ids.len()
        );

        Self::build(
            layout.identity_column.clone(),
            identity_idx.is_some(),
            sample_ids,
            rows,
        )
    }

    /// Name of the identity column, whether or not the source had it.
    pub fn identity_column(&self) -> &str {
        &self.identity_column
    }

    /// Whether the table carries a protein identity field.
    pub fn has_identity(&self) -> bool {
        self.has_identity
    }

    /// Sample identifiers with an intensity column.
    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    /// Column index of a sample's intensities.
    pub fn sample_index(&self, sample_id: &str) -> Option<usize> {
        self.sample_ids.iter().position(|s| s == sample_id)
    }

    /// Rows in file order.
    pub fn rows(&self) -> &[RawProteinRow] {
        &self.rows
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Number of sample columns.
    pub fn n_samples(&self) -> usize {
        self.sample_ids.len()
    }
}

/// Parse an intensity cell. `Some(None)` is an absent value, `None` a parse failure.
fn parse_intensity(raw: &str) -> Option<Option<f64>> {
    match raw {
        "" | "NaN" | "nan" | "NA" | "na" => Some(None),
        _ => raw.parse::<f64>().ok().map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_tsv() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "Protein IDs\tGene names\tIntensity\tIntensity S1\tIntensity S2\tReverse\tPotential contaminant"
        )
        .unwrap();
        writeln!(file, "P1\tALB\t300\t100\t200\t\t").unwrap();
        writeln!(file, "P2\t\t10\t5\t5\t\t").unwrap();
        writeln!(file, "P3\tKRT1\t50\t0\tNaN\t\t+").unwrap();
        writeln!(file, "REV__P4\tXYZ\t10\t10\t\t+\t").unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_maxquant_layout() {
        let file = create_test_tsv();
        let table = RawIntensityTable::from_tsv(file.path(), &TableLayout::default()).unwrap();

        assert_eq!(table.n_rows(), 4);
        assert_eq!(table.sample_ids(), &["S1", "S2"]);
        assert_eq!(table.identity_column(), "Gene names");
        assert!(table.has_identity());
    }

    #[test]
    fn test_parse_cells() {
        let file = create_test_tsv();
        let table = RawIntensityTable::from_tsv(file.path(), &TableLayout::default()).unwrap();
        let rows = table.rows();

        assert_eq!(rows[0].identity.as_deref(), Some("ALB"));
        assert_eq!(rows[0].intensities, vec![Some(100.0), Some(200.0)]);
        assert_eq!(rows[1].identity, None);
        assert_eq!(rows[2].intensities, vec![Some(0.0), None]);
        assert!(rows[2].contaminant);
        assert!(!rows[2].reverse);
        assert!(rows[3].reverse);
        assert_eq!(rows[3].intensities, vec![Some(10.0), None]);
    }

    #[test]
    fn test_missing_identity_column() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Protein IDs\tIntensity S1").unwrap();
        writeln!(file, "P1\t100").unwrap();
        file.flush().unwrap();

        let table = RawIntensityTable::from_tsv(file.path(), &TableLayout::default()).unwrap();
        assert!(!table.has_identity());
        assert_eq!(table.rows()[0].identity, None);
    }

    #[test]
    fn test_invalid_intensity() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Gene names\tIntensity S1").unwrap();
        writeln!(file, "ALB\tabc").unwrap();
        file.flush().unwrap();

        let err = RawIntensityTable::from_tsv(file.path(), &TableLayout::default()).unwrap_err();
        assert!(matches!(err, DaaError::InvalidIntensity { .. }));
    }

    #[test]
    fn test_negative_intensity_rejected() {
        let rows = vec![RawProteinRow::new(Some("A"), vec![Some(-1.0)])];
        let err = RawIntensityTable::new(vec!["S1".into()], rows).unwrap_err();
        assert!(matches!(err, DaaError::InvalidIntensity { .. }));
    }

    #[test]
    fn test_row_width_checked() {
        let rows = vec![RawProteinRow::new(Some("A"), vec![Some(1.0)])];
        let err = RawIntensityTable::new(vec!["S1".into(), "S2".into()], rows).unwrap_err();
        assert!(matches!(
            err,
            DaaError::DimensionMismatch {
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn test_custom_layout() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "id\tLFQ intensity A\tLFQ intensity B\tdecoy").unwrap();
        writeln!(file, "X\t1\t2\tyes").unwrap();
        file.flush().unwrap();

        let layout = TableLayout {
            identity_column: "id".into(),
            reverse_column: "decoy".into(),
            intensity_prefix: "LFQ intensity ".into(),
            flag_value: "yes".into(),
            ..Default::default()
        };
        let table = RawIntensityTable::from_tsv(file.path(), &layout).unwrap();
        assert_eq!(table.sample_ids(), &["A", "B"]);
        assert!(table.rows()[0].reverse);
    }

    #[test]
    fn test_custom_identity_name_kept_when_absent() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Gene names	Intensity S1").unwrap();
        writeln!(file, "ALB	100").unwrap();
        file.flush().unwrap();

        let layout = TableLayout {
            identity_column: "id".into(),
            ..Default::default()
        };
        let table = RawIntensityTable::from_tsv(file.path(), &layout).unwrap();
        assert!(!table.has_identity());
        assert_eq!(table.identity_column(), "id");
    }

    #[test]
    fn test_duplicate_sample_column() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Gene names	Intensity S1	Intensity S2	Intensity S1").unwrap();
        writeln!(file, "ALB	100	200	300").unwrap();
        file.flush().unwrap();

        let err = RawIntensityTable::from_tsv(file.path(), &TableLayout::default()).unwrap_err();
        assert!(matches!(err, DaaError::SchemaMismatch(msg) if msg.contains("S1")));
    }
}
