//! Coerce raw tables into the string cell model used for matching.

use rowmatch_model::{CellValue, Dataset, Table};
use tracing::debug;

/// Convert every cell to its string form; missing values become `""`.
///
/// Column order is preserved and rows are fitted to the header width.
/// Normalizing an already-normalized dataset is a no-op.
pub fn normalize(table: &Table) -> Dataset {
    let rows = table
        .rows
        .iter()
        .map(|row| row.iter().map(normalize_cell).collect())
        .collect();
    Dataset::new(table.columns.clone(), rows).with_source_lines(table.source_lines.clone())
}

/// Normalize the incoming and reference tables of a run.
pub fn normalize_pair(incoming: &Table, reference: &Table) -> (Dataset, Dataset) {
    let incoming = normalize(incoming);
    let reference = normalize(reference);
    debug!(
        incoming_rows = incoming.len(),
        incoming_columns = incoming.columns().len(),
        reference_rows = reference.len(),
        reference_columns = reference.columns().len(),
        "normalized datasets"
    );
    (incoming, reference)
}

pub fn normalize_cell(cell: &CellValue) -> String {
    cell.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerces_scalar_cells() {
        let mut table = Table::new(vec!["a".into(), "b".into(), "c".into(), "d".into(), "e".into()]);
        table.push_row(vec![
            CellValue::Integer(42),
            CellValue::Float(2.5),
            CellValue::Bool(true),
            CellValue::Missing,
            CellValue::Float(f64::NAN),
        ]);
        let dataset = normalize(&table);
        assert_eq!(dataset.rows()[0], vec!["42", "2.5", "true", "", ""]);
    }

    #[test]
    fn whole_floats_drop_the_fraction() {
        assert_eq!(normalize_cell(&CellValue::Float(7.0)), "7");
    }

    #[test]
    fn pads_ragged_rows() {
        let mut table = Table::new(vec!["a".into(), "b".into()]);
        table.push_row(vec![CellValue::text("x")]);
        let dataset = normalize(&table);
        assert_eq!(dataset.rows()[0], vec!["x", ""]);
    }
}
