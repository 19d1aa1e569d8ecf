//! Projection of the raw table onto the metadata samples.

use crate::data::{RawIntensityTable, SampleMetadata};
use crate::error::{DaaError, Result};

/// Intensity columns selected for the metadata samples.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSelection {
    /// Metadata sample identifiers, in metadata order.
    pub sample_ids: Vec<String>,
    /// Raw table column index of each selected sample.
    pub columns: Vec<usize>,
    /// Intensity columns with no metadata entry (only when allowed).
    pub ignored: Vec<String>,
}

/// Rows restricted to the identity field and the selected samples.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedTable {
    pub sample_ids: Vec<String>,
    pub identities: Vec<Option<String>>,
    pub values: Vec<Vec<Option<f64>>>,
}

/// Resolve every metadata sample to an intensity column.
///
/// Runs before any row is touched, so schema problems surface without
/// partial work.
///
/// # Errors
/// * `MissingIdentityColumn` if the table has no identity field.
/// * `SchemaMismatch` if a metadata sample has no intensity column, or an
///   intensity column has no metadata entry and `allow_unmapped` is false.
pub fn resolve_columns(
    table: &RawIntensityTable,
    metadata: &SampleMetadata,
    allow_unmapped: bool,
) -> Result<ColumnSelection> {
    if !table.has_identity() {
        return Err(DaaError::MissingIdentityColumn(
            table.identity_column().to_string(),
        ));
    }
    if metadata.is_empty() {
        return Err(DaaError::SchemaMismatch(
            "Metadata lists no samples".to_string(),
        ));
    }

    let mut columns = Vec::with_capacity(metadata.n_samples());
    for sample in metadata.sample_ids() {
        let idx = table.sample_index(sample).ok_or_else(|| {
            DaaError::SchemaMismatch(format!(
                "Sample '{}' in metadata has no intensity column",
                sample
            ))
        })?;
        columns.push(idx);
    }

    let unmapped: Vec<String> = table
        .sample_ids()
        .iter()
        .filter(|s| !metadata.has_sample(s))
        .cloned()
        .collect();
    if !unmapped.is_empty() {
        if !allow_unmapped {
            return Err(DaaError::SchemaMismatch(format!(
                "Intensity columns without a condition label: {}",
                unmapped.join(", ")
            )));
        }
        log::warn!(
            "ignoring {} intensity column(s) without metadata: {}",
            unmapped.len(),
            unmapped.join(", ")
        );
    }

    Ok(ColumnSelection {
        sample_ids: metadata.sample_ids().to_vec(),
        columns,
        ignored: unmapped,
    })
}

/// Keep identity and the selected intensity columns of the given rows.
pub fn project_columns(
    table: &RawIntensityTable,
    selection: &ColumnSelection,
    rows: &[usize],
) -> ProjectedTable {
    let all_rows = table.rows();
    let mut identities = Vec::with_capacity(rows.len());
    let mut values = Vec::with_capacity(rows.len());

    for &r in rows {
        let row = &all_rows[r];
        identities.push(row.identity.clone());
        values.push(selection.columns.iter().map(|&c| row.intensities[c]).collect());
    }

    ProjectedTable {
        sample_ids: selection.sample_ids.clone(),
        identities,
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::RawProteinRow;

    fn create_table() -> RawIntensityTable {
        let rows = vec![
            RawProteinRow::new(Some("A"), vec![Some(1.0), Some(2.0), Some(3.0)]),
            RawProteinRow::new(None, vec![Some(4.0), None, Some(6.0)]),
        ];
        RawIntensityTable::new(vec!["S1".into(), "S2".into(), "S3".into()], rows).unwrap()
    }

    #[test]
    fn test_projection_follows_metadata_order() {
        let table = create_table();
        let meta =
            SampleMetadata::from_pairs([("S3", "a"), ("S1", "b"), ("S2", "b")]).unwrap();

        let sel = resolve_columns(&table, &meta, false).unwrap();
        assert_eq!(sel.columns, vec![2, 0, 1]);

        let projected = project_columns(&table, &sel, &[0, 1]);
        assert_eq!(projected.sample_ids, vec!["S3", "S1", "S2"]);
        assert_eq!(projected.values[0], vec![Some(3.0), Some(1.0), Some(2.0)]);
        assert_eq!(projected.values[1], vec![Some(6.0), Some(4.0), None]);
        assert_eq!(projected.identities[1], None);
    }

    #[test]
    fn test_missing_sample_column() {
        let table = create_table();
        let meta = SampleMetadata::from_pairs([
            ("S1", "a"),
            ("S2", "a"),
            ("S3", "b"),
            ("S9", "b"),
        ])
        .unwrap();
        let err = resolve_columns(&table, &meta, false).unwrap_err();
        assert!(matches!(err, DaaError::SchemaMismatch(msg) if msg.contains("S9")));
    }

    #[test]
    fn test_unmapped_column() {
        let table = create_table();
        let meta = SampleMetadata::from_pairs([("S1", "a"), ("S2", "b")]).unwrap();

        let err = resolve_columns(&table, &meta, false).unwrap_err();
        assert!(matches!(err, DaaError::SchemaMismatch(msg) if msg.contains("S3")));

        let sel = resolve_columns(&table, &meta, true).unwrap();
        assert_eq!(sel.ignored, vec!["S3"]);
        assert_eq!(sel.columns, vec![0, 1]);
    }

    #[test]
    fn test_missing_identity() {
        let table = RawIntensityTable::without_identity(
            vec!["S1".into()],
            vec![RawProteinRow::new(None, vec![Some(1.0)])],
        )
        .unwrap();
        let meta = SampleMetadata::from_pairs([("S1", "a")]).unwrap();
        let err = resolve_columns(&table, &meta, false).unwrap_err();
        assert!(matches!(err, DaaError::MissingIdentityColumn(name) if name == "Gene names"));
    }
}
