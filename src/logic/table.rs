//! Tabular Request Decoder
//!
//! Turns the caller's `{data, columns}` payload into a [`DataTable`]: rows of
//! optional floats keyed by column names, in the caller's column order. The
//! decoder only validates shape; column completeness against the model is
//! the preprocessor's call.

use crate::logic::sanitize::clean_cell;

/// Decode errors for the tabular payload.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TableError {
    #[error("row {row} has {actual} values but {expected} columns were given")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },
}

/// A decoded tabular payload.
///
/// Cells are `Option<f64>`; `None` is the missing marker. Inbound
/// sanitization happens at construction, so a stored cell is always finite.
#[derive(Debug, Clone)]
pub struct DataTable {
    columns: Vec<String>,
    rows: Vec<Vec<Option<f64>>>,
}

impl DataTable {
    /// Build a table from raw rows and column names.
    ///
    /// Rejects ragged rows; collapses non-finite cells to the missing marker.
    pub fn from_parts(
        rows: Vec<Vec<Option<f64>>>,
        columns: Vec<String>,
    ) -> Result<Self, TableError> {
        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(TableError::RaggedRow {
                    row: i,
                    expected: columns.len(),
                    actual: row.len(),
                });
            }
        }

        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(clean_cell).collect())
            .collect();

        Ok(Self { columns, rows })
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Position of a named column, if the caller supplied it.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell accessor; `None` is the missing marker.
    pub fn value(&self, row: usize, column: usize) -> Option<f64> {
        self.rows[row][column]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_decode_well_formed_payload() {
        let table = DataTable::from_parts(
            vec![vec![Some(1.0), None], vec![Some(3.0), Some(4.0)]],
            columns(&["a", "b"]),
        )
        .unwrap();

        assert_eq!(table.n_rows(), 2);
        assert_eq!(table.n_columns(), 2);
        assert_eq!(table.value(0, 0), Some(1.0));
        assert_eq!(table.value(0, 1), None);
        assert_eq!(table.column_index("b"), Some(1));
        assert_eq!(table.column_index("c"), None);
    }

    #[test]
    fn test_ragged_row_is_rejected() {
        let err = DataTable::from_parts(
            vec![vec![Some(1.0), Some(2.0)], vec![Some(3.0)]],
            columns(&["a", "b"]),
        )
        .unwrap_err();

        assert_eq!(
            err,
            TableError::RaggedRow {
                row: 1,
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn test_infinity_decodes_to_missing_marker() {
        let table = DataTable::from_parts(
            vec![vec![Some(f64::INFINITY), Some(f64::NAN), Some(2.0)]],
            columns(&["a", "b", "c"]),
        )
        .unwrap();

        assert_eq!(table.value(0, 0), None);
        assert_eq!(table.value(0, 1), None);
        assert_eq!(table.value(0, 2), Some(2.0));
    }

    #[test]
    fn test_empty_table_is_valid() {
        let table = DataTable::from_parts(vec![], columns(&["a"])).unwrap();
        assert_eq!(table.n_rows(), 0);
    }
}
